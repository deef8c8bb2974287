//! Single byte-range downloads with read-ahead.

use std::fmt;
use std::io;

use bucketfs_storage::{ObjectBody, StorageError};
use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::bucket::Bucket;

/// Inclusive last byte of a range fetch starting at `from`.
///
/// The fetch covers the caller's request plus `read_ahead`, cut off at the
/// last byte of the object. Callers guarantee `from < total_size`.
pub(crate) fn fetch_end(from: u64, requested: u64, read_ahead: u64, total_size: u64) -> u64 {
    let length: u64 = requested.saturating_add(read_ahead).max(1);
    let end: u64 = from.saturating_add(length - 1);
    end.min(total_size.saturating_sub(1))
}

/// An open ranged GetObject stream over `[start, end]`.
///
/// Owned by exactly one file handle; dropping it (or calling
/// [`RangeStream::close`]) releases the connection.
pub struct RangeStream {
    key: String,
    start: u64,
    end: u64,
    body: ObjectBody,
}

impl RangeStream {
    /// Open a range covering `requested` bytes at `from` plus read-ahead.
    ///
    /// # Arguments
    /// * `bucket` - Bucket binding
    /// * `key` - Object key
    /// * `from` - First byte to fetch
    /// * `requested` - Bytes the caller asked for
    /// * `read_ahead` - Extra bytes to fetch beyond the request
    /// * `total_size` - Object size from the handle's metadata
    ///
    /// # Returns
    /// `None` when `from` is at or past the end of the object; no request is
    /// issued in that case.
    pub async fn open(
        bucket: &Bucket,
        key: &str,
        from: u64,
        requested: u64,
        read_ahead: u64,
        total_size: u64,
    ) -> Result<Option<Self>, StorageError> {
        if from >= total_size {
            return Ok(None);
        }

        let end: u64 = fetch_end(from, requested, read_ahead, total_size);
        trace!(key, start = from, end, "opening range stream");

        let body: ObjectBody = bucket
            .client()
            .get_object_range(bucket.name(), key, from, end)
            .await?;

        Ok(Some(Self {
            key: key.to_string(),
            start: from,
            end,
            body,
        }))
    }

    /// Read the next bytes of the range. `Ok(0)` means the range is consumed.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf).await
    }

    /// Inclusive byte range this stream was opened for.
    pub fn range(&self) -> (u64, u64) {
        (self.start, self.end)
    }

    /// Release the stream.
    pub fn close(self) {
        trace!(key = %self.key, start = self.start, end = self.end, "closing range stream");
    }
}

impl fmt::Debug for RangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeStream")
            .field("key", &self.key)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bucketfs_storage::{MemoryStorageClient, RangeRequest};

    use super::*;

    const BUCKET: &str = "bucket";
    const KB64: u64 = 64 * 1024;

    #[test]
    fn test_fetch_end_adds_read_ahead() {
        assert_eq!(fetch_end(0, 10, KB64, 1_000_000), 10 + KB64 - 1);
        assert_eq!(fetch_end(100, 10, 0, 1_000), 109);
    }

    #[test]
    fn test_fetch_end_clamps_to_object() {
        assert_eq!(fetch_end(0, 10, KB64, 5), 4);
        assert_eq!(fetch_end(4, 10, KB64, 5), 4);
    }

    #[test]
    fn test_fetch_end_zero_length_request() {
        assert_eq!(fetch_end(3, 0, 0, 10), 3);
    }

    #[tokio::test]
    async fn test_open_past_end_issues_no_request() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "a.txt", b"hello".to_vec());
        let bucket: Bucket = Bucket::new(store.clone(), BUCKET);

        let stream = RangeStream::open(&bucket, "a.txt", 5, 10, KB64, 5).await.unwrap();

        assert!(stream.is_none());
        assert_eq!(store.request_counts().get_range, 0);
    }

    #[tokio::test]
    async fn test_open_and_read_range() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "a.txt", b"hello".to_vec());
        let bucket: Bucket = Bucket::new(store.clone(), BUCKET);

        let mut stream: RangeStream = RangeStream::open(&bucket, "a.txt", 1, 2, KB64, 5)
            .await
            .unwrap()
            .unwrap();
        let mut buf: [u8; 16] = [0; 16];
        let n: usize = stream.read(&mut buf).await.unwrap();

        assert_eq!(&buf[..n], b"ello");
        assert_eq!(stream.range(), (1, 4));
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
        assert_eq!(
            store.range_requests(),
            vec![RangeRequest {
                key: "a.txt".into(),
                start: 1,
                end: 4
            }]
        );
        stream.close();
    }
}
