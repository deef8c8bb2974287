//! In-memory storage backend.
//!
//! Implements the same listing semantics as S3 ListObjectsV2 (lexicographic
//! key order, delimiter grouping, `max-keys` counting both keys and common
//! prefixes, continuation tokens) so code written against [`StorageClient`]
//! can be exercised without a network. Every request is counted.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::ops::Bound;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bucketfs_common::MAX_LIST_PAGE_SIZE;
use tokio::io::{AsyncRead, ReadBuf};

use crate::error::StorageError;
use crate::traits::StorageClient;
use crate::types::{ListObjectsPage, ListObjectsRequest, ObjectBody, ObjectInfo, ObjectMetadata};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    last_modified: i64,
}

/// Number of requests served per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub head: u64,
    pub list: u64,
    pub get_range: u64,
}

/// A byte range that was requested through `get_object_range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    pub key: String,
    pub start: u64,
    pub end: u64,
}

/// [`StorageClient`] backed by process memory.
#[derive(Debug)]
pub struct MemoryStorageClient {
    buckets: RwLock<HashMap<String, BTreeMap<String, StoredObject>>>,
    /// Upper bound on bytes produced by a single body read.
    max_read_chunk: usize,
    head_requests: AtomicU64,
    list_requests: AtomicU64,
    range_requests: AtomicU64,
    range_log: Mutex<Vec<RangeRequest>>,
}

impl Default for MemoryStorageClient {
    fn default() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            max_read_chunk: usize::MAX,
            head_requests: AtomicU64::new(0),
            list_requests: AtomicU64::new(0),
            range_requests: AtomicU64::new(0),
            range_log: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryStorageClient {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many bytes a body yields per read, to mimic a network
    /// stream delivering data in packets.
    ///
    /// # Arguments
    /// * `chunk` - Maximum bytes per read (clamped to at least 1)
    pub fn with_max_read_chunk(mut self, chunk: usize) -> Self {
        self.max_read_chunk = chunk.max(1);
        self
    }

    /// Store an object stamped with the current time.
    ///
    /// # Arguments
    /// * `bucket` - Bucket name
    /// * `key` - Object key
    /// * `data` - Object content
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        let now: i64 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.put_object_with_mtime(bucket, key, data, now);
    }

    /// Store an object with an explicit modification time.
    ///
    /// # Arguments
    /// * `bucket` - Bucket name
    /// * `key` - Object key
    /// * `data` - Object content
    /// * `last_modified` - Unix epoch seconds
    pub fn put_object_with_mtime(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Vec<u8>>,
        last_modified: i64,
    ) {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                last_modified,
            },
        );
    }

    /// Remove an object. Returns whether it existed.
    pub fn delete_object(&self, bucket: &str, key: &str) -> bool {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        buckets
            .get_mut(bucket)
            .map(|objects| objects.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Requests served so far.
    pub fn request_counts(&self) -> RequestCounts {
        RequestCounts {
            head: self.head_requests.load(Ordering::SeqCst),
            list: self.list_requests.load(Ordering::SeqCst),
            get_range: self.range_requests.load(Ordering::SeqCst),
        }
    }

    /// Every range requested so far, in order.
    pub fn range_requests(&self) -> Vec<RangeRequest> {
        self.range_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        buckets.get(bucket).and_then(|objects| objects.get(key)).cloned()
    }
}

/// One element of a listing: either an object or a common prefix.
enum ListItem {
    Object(ObjectInfo),
    Prefix(String),
}

impl ListItem {
    fn sort_key(&self) -> &str {
        match self {
            ListItem::Object(info) => &info.key,
            ListItem::Prefix(prefix) => prefix,
        }
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, StorageError> {
        self.head_requests.fetch_add(1, Ordering::SeqCst);

        Ok(self.object(bucket, key).map(|obj| ObjectMetadata {
            size: obj.data.len() as u64,
            last_modified: Some(obj.last_modified),
            etag: None,
            content_type: None,
        }))
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, StorageError> {
        self.list_requests.fetch_add(1, Ordering::SeqCst);

        let max_keys: usize = request
            .max_keys
            .unwrap_or(MAX_LIST_PAGE_SIZE)
            .clamp(1, MAX_LIST_PAGE_SIZE);
        let delimiter: Option<&str> = request.delimiter.as_deref().filter(|d| !d.is_empty());
        let prefix: &str = &request.prefix;

        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        let Some(objects) = buckets.get(bucket) else {
            return Ok(ListObjectsPage::default());
        };

        let mut page: ListObjectsPage = ListObjectsPage::default();
        let mut last_returned: Option<String> = None;

        for (key, obj) in objects.range::<str, _>((Bound::Included(prefix), Bound::Unbounded)) {
            if !key.starts_with(prefix) {
                break;
            }

            let grouped: Option<String> = delimiter.and_then(|d| {
                key[prefix.len()..]
                    .find(d)
                    .map(|idx| key[..prefix.len() + idx + d.len()].to_string())
            });
            let item: ListItem = match grouped {
                Some(common) => ListItem::Prefix(common),
                None => ListItem::Object(ObjectInfo {
                    key: key.clone(),
                    size: obj.data.len() as u64,
                    last_modified: Some(obj.last_modified),
                    etag: None,
                }),
            };

            // Resume strictly after the token; also collapses a prefix group
            if let Some(token) = request.continuation_token.as_deref() {
                if item.sort_key() <= token {
                    continue;
                }
            }
            if last_returned.as_deref() == Some(item.sort_key()) {
                continue;
            }

            if page.key_count() == max_keys {
                page.is_truncated = true;
                break;
            }

            last_returned = Some(item.sort_key().to_string());
            match item {
                ListItem::Object(info) => page.objects.push(info),
                ListItem::Prefix(common) => page.common_prefixes.push(common),
            }
        }

        if page.is_truncated {
            page.next_continuation_token = last_returned;
        }

        Ok(page)
    }

    async fn get_object_range(
        &self,
        bucket: &str,
        key: &str,
        start: u64,
        end: u64,
    ) -> Result<ObjectBody, StorageError> {
        self.range_requests.fetch_add(1, Ordering::SeqCst);
        self.range_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RangeRequest {
                key: key.to_string(),
                start,
                end,
            });

        let obj: StoredObject = self.object(bucket, key).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        let size: u64 = obj.data.len() as u64;
        if start >= size || end < start {
            log::debug!("Rejected range {}-{} for {}/{} ({} bytes)", start, end, bucket, key, size);
            return Err(StorageError::InvalidRange {
                bucket: bucket.to_string(),
                key: key.to_string(),
                start,
                end,
                size,
            });
        }

        // S3 clamps an end past the object to its last byte
        let last: u64 = end.min(size - 1);
        let data: Vec<u8> = obj.data[start as usize..=last as usize].to_vec();

        Ok(Box::pin(ChunkedBody {
            data,
            pos: 0,
            chunk: self.max_read_chunk,
        }))
    }
}

/// Body that yields at most `chunk` bytes per read.
struct ChunkedBody {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl AsyncRead for ChunkedBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this: &mut ChunkedBody = self.get_mut();
        let available: usize = this.data.len() - this.pos;
        let n: usize = available.min(buf.remaining()).min(this.chunk);
        let end: usize = this.pos + n;
        buf.put_slice(&this.data[this.pos..end]);
        this.pos = end;
        Poll::Ready(Ok(()))
    }
}
