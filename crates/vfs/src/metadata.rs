//! File and directory metadata.
//!
//! Object stores have no directories, so directory metadata is always
//! synthesized: size 0, modification time at the Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bucketfs_common::{base_name, DIR_MODE, FILE_MODE};

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    File,
    Directory,
}

impl FileKind {
    /// Fixed permission bits for this kind.
    pub fn mode(self) -> u32 {
        match self {
            FileKind::File => FILE_MODE,
            FileKind::Directory => DIR_MODE,
        }
    }

    pub fn is_dir(self) -> bool {
        self == FileKind::Directory
    }
}

/// Immutable description of a file or directory.
///
/// Constructed only through [`Metadata::file`] and [`Metadata::directory`],
/// which keep `name` a base name and directory sizes at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    size: u64,
    mod_time: SystemTime,
    kind: FileKind,
}

impl Metadata {
    /// Metadata for a file.
    ///
    /// # Arguments
    /// * `key` - Object key or base name; only the last segment is kept
    /// * `size` - Object size in bytes
    /// * `mod_time` - Last modification time
    pub fn file(key: &str, size: u64, mod_time: SystemTime) -> Self {
        Self {
            name: base_name(key),
            size,
            mod_time,
            kind: FileKind::File,
        }
    }

    /// Synthetic metadata for a directory.
    ///
    /// # Arguments
    /// * `key` - Directory path, common prefix, or marker key
    pub fn directory(key: &str) -> Self {
        Self {
            name: base_name(key),
            size: 0,
            mod_time: UNIX_EPOCH,
            kind: FileKind::Directory,
        }
    }

    /// Base name, without any delimiter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes; always 0 for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Permission bits (0o664 for files, 0o775 for directories).
    pub fn mode(&self) -> u32 {
        self.kind.mode()
    }
}

/// Convert store timestamps (Unix epoch seconds) into a `SystemTime`.
///
/// Missing timestamps map to the epoch.
pub(crate) fn mod_time_from_epoch_secs(secs: Option<i64>) -> SystemTime {
    match secs {
        Some(s) if s >= 0 => UNIX_EPOCH + Duration::from_secs(s as u64),
        Some(s) => UNIX_EPOCH - Duration::from_secs(s.unsigned_abs()),
        None => UNIX_EPOCH,
    }
}

/// An entry produced while listing a directory.
///
/// Listing pages already carry everything needed, so resolving an entry to
/// its [`Metadata`] never touches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    info: Metadata,
}

impl DirEntry {
    pub(crate) fn new(info: Metadata) -> Self {
        Self { info }
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn kind(&self) -> FileKind {
        self.info.kind()
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }

    /// Full metadata for the entry.
    pub fn info(&self) -> &Metadata {
        &self.info
    }

    pub fn into_info(self) -> Metadata {
        self.info
    }
}
