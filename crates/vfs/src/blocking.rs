//! Synchronous `std::io` view of a [`FileHandle`].
//!
//! For hosts that want `Read + Seek` (e.g. parsers and decoders that take a
//! `std::io::Read`). Each call blocks the current thread on the async handle,
//! so it must not be used from inside an async task.

use std::io::{self, Read, Seek, SeekFrom};

use tokio::runtime::Handle;

use crate::error::FsError;
use crate::fs::BucketFs;
use crate::handle::{FileHandle, ReadOutcome, Whence};

/// Blocking `Read + Seek` adapter over a [`FileHandle`].
#[derive(Debug)]
pub struct BlockingFile {
    handle: FileHandle,
    runtime: Handle,
}

impl BlockingFile {
    /// Wrap an open handle; `runtime` drives its async operations.
    pub fn new(handle: FileHandle, runtime: Handle) -> Self {
        Self { handle, runtime }
    }

    /// Open `path` on `fs` and wrap the resulting handle.
    ///
    /// # Arguments
    /// * `fs` - Filesystem to open from
    /// * `path` - Key to open
    /// * `runtime` - Runtime that drives the open and every later call
    pub fn open(fs: &BucketFs, path: &str, runtime: Handle) -> Result<Self, FsError> {
        let handle: FileHandle = runtime.block_on(fs.open(path))?;
        Ok(Self::new(handle, runtime))
    }

    pub fn get_ref(&self) -> &FileHandle {
        &self.handle
    }

    pub fn get_mut(&mut self) -> &mut FileHandle {
        &mut self.handle
    }

    pub fn into_inner(self) -> FileHandle {
        self.handle
    }
}

impl Read for BlockingFile {
    /// `Ok(0)` only at end of file (or for an empty `buf`). A range that runs
    /// dry early is replaced by a fresh one within the same call.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let runtime: &Handle = &self.runtime;
        let handle: &mut FileHandle = &mut self.handle;

        let mut outcome: ReadOutcome = runtime.block_on(handle.read(buf))?;
        if outcome.bytes_read == 0 && !outcome.at_end && !buf.is_empty() {
            outcome = runtime.block_on(handle.read(buf))?;
        }
        Ok(outcome.bytes_read)
    }
}

impl Seek for BlockingFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence): (Option<i64>, Whence) = match pos {
            SeekFrom::Start(n) => (i64::try_from(n).ok(), Whence::Start),
            SeekFrom::Current(n) => (Some(n), Whence::Current),
            // std counts forward from the end; the handle counts back
            SeekFrom::End(n) => (n.checked_neg(), Whence::End),
        };

        let offset: i64 = offset.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("seek position {:?} out of range", pos))
        })?;

        Ok(self.handle.seek(offset, whence)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.handle.offset())
    }
}
