//! Stateful file handles.
//!
//! A handle caches the metadata fetched at open, tracks a read offset, and
//! keeps at most one [`RangeStream`] open while the caller reads a
//! contiguous region. Handle state:
//!
//! ```text
//! open ──► Ready ──read──► Streaming ──seek / stream exhausted──► Ready
//!            │                 │
//!            └──────close──────┴──────────────────────────────► Closed
//! ```
//!
//! Handles are not shared: every operation takes `&mut self`.

use std::mem;

use bucketfs_common::base_name;
use bucketfs_storage::StorageError;
use tracing::{debug, trace};

use crate::bucket::Bucket;
use crate::error::{FsError, Op, ReadDirError};
use crate::lister::{DirectoryLister, ListCursor};
use crate::metadata::{DirEntry, Metadata};
use crate::options::VfsOptions;
use crate::range::RangeStream;

/// Reference point for [`FileHandle::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Offset from the start of the file.
    Start,
    /// Offset from the current position.
    Current,
    /// `size - offset`: a positive offset moves back from the end.
    End,
}

/// Result of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes written into the caller's buffer.
    pub bytes_read: usize,
    /// The offset has reached the end of the file. Set together with the
    /// final bytes, not only on an empty read.
    pub at_end: bool,
}

#[derive(Debug)]
enum HandleState {
    Ready,
    Streaming(RangeStream),
    Closed,
}

/// Open file or directory in a bucket.
#[derive(Debug)]
pub struct FileHandle {
    bucket: Bucket,
    path: String,
    metadata: Metadata,
    offset: u64,
    state: HandleState,
    lister: DirectoryLister,
    cursor: ListCursor,
    read_ahead: u64,
}

impl FileHandle {
    pub(crate) fn new(
        bucket: Bucket,
        path: &str,
        metadata: Metadata,
        lister: DirectoryLister,
        options: &VfsOptions,
    ) -> Self {
        Self {
            bucket,
            path: path.to_string(),
            metadata,
            offset: 0,
            state: HandleState::Ready,
            lister,
            cursor: ListCursor::new(),
            read_ahead: options.read_ahead.bytes,
        }
    }

    /// Full key the handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Base name of the opened path.
    pub fn name(&self) -> String {
        base_name(&self.path)
    }

    /// Metadata fetched when the handle was opened.
    pub fn stat(&self) -> &Metadata {
        &self.metadata
    }

    /// Current read offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, HandleState::Closed)
    }

    /// Whether a range stream is currently open.
    pub fn is_streaming(&self) -> bool {
        matches!(self.state, HandleState::Streaming(_))
    }

    /// Read up to `buf.len()` bytes at the current offset.
    ///
    /// Opens a range stream if none is open. When the open stream runs dry
    /// before the end of the file, it is released and the call returns what
    /// it read (possibly nothing); the next call fetches a fresh range.
    ///
    /// # Errors
    /// `Closed` after [`FileHandle::close`]; `Transport` if the range cannot
    /// be opened or read. A failed read releases the stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, FsError> {
        let size: u64 = self.metadata.size();

        let mut stream: RangeStream = match mem::replace(&mut self.state, HandleState::Ready) {
            HandleState::Closed => {
                self.state = HandleState::Closed;
                return Err(FsError::closed(Op::Read, &self.path));
            }
            HandleState::Streaming(stream) => stream,
            HandleState::Ready if buf.is_empty() => {
                return Ok(ReadOutcome {
                    bytes_read: 0,
                    at_end: self.offset >= size,
                });
            }
            HandleState::Ready => {
                let opened: Option<RangeStream> = RangeStream::open(
                    &self.bucket,
                    &self.path,
                    self.offset,
                    buf.len() as u64,
                    self.read_ahead,
                    size,
                )
                .await
                .map_err(|e| FsError::transport(Op::Read, &self.path, e))?;

                match opened {
                    Some(stream) => stream,
                    None => {
                        return Ok(ReadOutcome {
                            bytes_read: 0,
                            at_end: true,
                        })
                    }
                }
            }
        };

        let n: usize = match stream.read(buf).await {
            Ok(n) => n,
            Err(e) => {
                stream.close();
                return Err(FsError::transport(Op::Read, &self.path, StorageError::from(e)));
            }
        };

        self.offset += n as u64;
        let at_end: bool = self.offset >= size;

        if (n == 0 && !buf.is_empty()) || at_end {
            trace!(path = %self.path, offset = self.offset, "range stream exhausted");
            stream.close();
        } else {
            self.state = HandleState::Streaming(stream);
        }

        Ok(ReadOutcome {
            bytes_read: n,
            at_end,
        })
    }

    /// Read at `offset`: a [`Whence::Start`] seek followed by a read.
    ///
    /// Moves the handle's offset like any other seek.
    pub async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, FsError> {
        let start: i64 = i64::try_from(offset).map_err(|_| FsError::InvalidArgument {
            op: Op::Seek,
            path: self.path.clone(),
            reason: format!("offset {} out of range", offset),
        })?;
        self.seek(start, Whence::Start).map_err(|e| e.with_op(Op::Read))?;
        self.read(buf).await
    }

    /// Move the read offset.
    ///
    /// The target is `offset` for [`Whence::Start`], `current + offset` for
    /// [`Whence::Current`] and `size - offset` for [`Whence::End`]. Targets
    /// past the end are allowed; reads there report end of file. Moving the
    /// offset releases the open stream.
    ///
    /// # Errors
    /// `InvalidArgument` if the target is negative (the offset is left
    /// unchanged); `Closed` after [`FileHandle::close`].
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, FsError> {
        if self.is_closed() {
            return Err(FsError::closed(Op::Seek, &self.path));
        }

        let size: i64 = i64::try_from(self.metadata.size()).unwrap_or(i64::MAX);
        let current: i64 = i64::try_from(self.offset).unwrap_or(i64::MAX);

        let target: Option<i64> = match whence {
            Whence::Start => Some(offset),
            Whence::Current => current.checked_add(offset),
            Whence::End => size.checked_sub(offset),
        };

        let target: u64 = match target {
            Some(t) if t >= 0 => t as u64,
            _ => {
                return Err(FsError::InvalidArgument {
                    op: Op::Seek,
                    path: self.path.clone(),
                    reason: format!("seek to {} from {:?} gives a negative position", offset, whence),
                })
            }
        };

        if target != self.offset {
            if let HandleState::Streaming(stream) = mem::replace(&mut self.state, HandleState::Ready) {
                stream.close();
            }
            self.offset = target;
        }

        Ok(target)
    }

    /// List the directory's children.
    ///
    /// With `n > 0`, returns at most `n` entries per call and picks up where
    /// the previous call stopped; a call never returns an empty page while
    /// entries remain. With `n == 0`, returns every remaining entry at once.
    ///
    /// # Returns
    /// `None` once the listing has been fully consumed, on every later call.
    ///
    /// # Errors
    /// A [`ReadDirError`] carrying the error and, for `n == 0`, the entries
    /// listed before the failure.
    pub async fn read_dir(&mut self, n: usize) -> Result<Option<Vec<DirEntry>>, ReadDirError> {
        if self.is_closed() {
            return Err(ReadDirError::new(FsError::closed(Op::ReadDir, &self.path)));
        }
        if self.cursor.is_exhausted() {
            return Ok(None);
        }

        if n == 0 {
            debug!(path = %self.path, "listing whole directory");
            return match self.lister.list_all(&self.path, &mut self.cursor).await {
                Ok(entries) => Ok(Some(entries)),
                Err(partial) => Err(ReadDirError {
                    entries: partial.entries,
                    error: FsError::transport(Op::ReadDir, &self.path, partial.error),
                }),
            };
        }

        self.lister
            .next_page(&self.path, &mut self.cursor, n)
            .await
            .map_err(|e| ReadDirError::new(FsError::transport(Op::ReadDir, &self.path, e)))
    }

    /// Close the handle and release any open stream.
    ///
    /// Closing an already closed handle does nothing.
    pub fn close(&mut self) {
        match mem::replace(&mut self.state, HandleState::Closed) {
            HandleState::Streaming(stream) => stream.close(),
            HandleState::Ready => debug!(path = %self.path, "closed handle"),
            HandleState::Closed => {}
        }
    }
}
