//! Error types for the VFS crate.

use std::fmt;
use std::io;

use bucketfs_storage::StorageError;
use thiserror::Error;

use crate::metadata::DirEntry;

/// Filesystem operation an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Stat,
    Open,
    Read,
    Seek,
    ReadDir,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Op::Stat => "stat",
            Op::Open => "open",
            Op::Read => "read",
            Op::Seek => "seek",
            Op::ReadDir => "readdir",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during VFS operations.
///
/// Every variant names the operation and the path involved. Reaching the end
/// of a file or listing is not an error; see [`crate::ReadOutcome`] and
/// [`crate::FileHandle::read_dir`].
#[derive(Debug, Error)]
pub enum FsError {
    /// No object and no key under the path.
    #[error("{op} {path}: file does not exist")]
    NotExist { op: Op, path: String },

    /// Argument would put the handle in an invalid position.
    #[error("{op} {path}: invalid argument: {reason}")]
    InvalidArgument {
        op: Op,
        path: String,
        reason: String,
    },

    /// Handle was already closed.
    #[error("{op} {path}: file already closed")]
    Closed { op: Op, path: String },

    /// The object store failed the request.
    #[error("{op} {path}: {source}")]
    Transport {
        op: Op,
        path: String,
        #[source]
        source: StorageError,
    },
}

impl FsError {
    pub(crate) fn transport(op: Op, path: &str, source: StorageError) -> Self {
        FsError::Transport {
            op,
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn closed(op: Op, path: &str) -> Self {
        FsError::Closed {
            op,
            path: path.to_string(),
        }
    }

    /// Operation the error is attributed to.
    pub fn op(&self) -> Op {
        match self {
            FsError::NotExist { op, .. }
            | FsError::InvalidArgument { op, .. }
            | FsError::Closed { op, .. }
            | FsError::Transport { op, .. } => *op,
        }
    }

    /// Path the failing operation was applied to.
    pub fn path(&self) -> &str {
        match self {
            FsError::NotExist { path, .. }
            | FsError::InvalidArgument { path, .. }
            | FsError::Closed { path, .. }
            | FsError::Transport { path, .. } => path,
        }
    }

    /// Re-attribute the error to another operation, e.g. a stat performed
    /// on behalf of open.
    pub fn with_op(mut self, new_op: Op) -> Self {
        match &mut self {
            FsError::NotExist { op, .. }
            | FsError::InvalidArgument { op, .. }
            | FsError::Closed { op, .. }
            | FsError::Transport { op, .. } => *op = new_op,
        }
        self
    }

    /// Check if this error means the path does not exist.
    pub fn is_not_exist(&self) -> bool {
        matches!(self, FsError::NotExist { .. })
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind: io::ErrorKind = match &err {
            FsError::NotExist { .. } => io::ErrorKind::NotFound,
            FsError::InvalidArgument { .. } => io::ErrorKind::InvalidInput,
            FsError::Closed { .. } => io::ErrorKind::Other,
            FsError::Transport { source, .. } => match source {
                StorageError::NotFound { .. } => io::ErrorKind::NotFound,
                StorageError::AccessDenied { .. } => io::ErrorKind::PermissionDenied,
                _ => io::ErrorKind::Other,
            },
        };
        io::Error::new(kind, err)
    }
}

/// A directory read that failed part-way.
///
/// `entries` holds everything listed before the failure so progress is not
/// discarded.
#[derive(Debug, Error)]
#[error("{error} ({} entries listed before the failure)", .entries.len())]
pub struct ReadDirError {
    /// Entries listed before the failure.
    pub entries: Vec<DirEntry>,
    /// The failure itself.
    #[source]
    pub error: FsError,
}

impl ReadDirError {
    pub(crate) fn new(error: FsError) -> Self {
        Self {
            entries: Vec::new(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_tagged_with_op_and_path() {
        let err: FsError = FsError::NotExist {
            op: Op::Stat,
            path: "missing.txt".into(),
        };
        assert_eq!(err.to_string(), "stat missing.txt: file does not exist");
    }

    #[test]
    fn test_with_op_retags() {
        let err: FsError = FsError::closed(Op::Read, "a.txt").with_op(Op::Seek);
        assert_eq!(err.op(), Op::Seek);
        assert_eq!(err.path(), "a.txt");
    }

    #[test]
    fn test_io_error_kinds() {
        let not_exist: io::Error = FsError::NotExist {
            op: Op::Open,
            path: "x".into(),
        }
        .into();
        let invalid: io::Error = FsError::InvalidArgument {
            op: Op::Seek,
            path: "x".into(),
            reason: "negative position".into(),
        }
        .into();
        let denied: io::Error = FsError::transport(
            Op::Read,
            "x",
            StorageError::AccessDenied {
                bucket: "b".into(),
                key: "x".into(),
                message: "nope".into(),
            },
        )
        .into();

        assert_eq!(not_exist.kind(), io::ErrorKind::NotFound);
        assert_eq!(invalid.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(denied.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_read_dir_error_mentions_progress() {
        let err: ReadDirError = ReadDirError::new(FsError::closed(Op::ReadDir, "dir"));
        assert_eq!(
            err.to_string(),
            "readdir dir: file already closed (0 entries listed before the failure)"
        );
    }
}
