//! Shared data structures for storage operations.

use std::fmt;
use std::pin::Pin;

use serde::Deserialize;
use tokio::io::AsyncRead;

/// Streaming body of a ranged GetObject response.
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// Configuration settings for storage operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// AWS region.
    pub region: String,
    /// AWS credentials (access key, secret key, session token).
    pub credentials: Option<AwsCredentials>,
    /// Custom endpoint for S3-compatible stores (MinIO, Ceph RGW, ...).
    pub endpoint_url: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`).
    /// Most S3-compatible stores behind a custom endpoint need this.
    pub force_path_style: bool,
    /// Expected bucket owner account ID, sent with every request.
    pub expected_bucket_owner: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            region: "us-west-2".into(),
            credentials: None,
            endpoint_url: None,
            force_path_style: false,
            expected_bucket_owner: None,
        }
    }
}

/// AWS credentials.
#[derive(Clone, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Object metadata returned by a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub last_modified: Option<i64>,
    /// ETag (usually MD5 hash for non-multipart uploads).
    pub etag: Option<String>,
    /// Content type, if set.
    pub content_type: Option<String>,
}

/// Information about an S3 object from list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// S3 object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub last_modified: Option<i64>,
    /// ETag (usually MD5 hash for non-multipart uploads).
    pub etag: Option<String>,
}

/// Parameters of a single ListObjectsV2 request.
///
/// # Example
///
/// ```ignore
/// let request = ListObjectsRequest::new("dir/")
///     .with_delimiter("/")
///     .with_max_keys(100);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsRequest {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// Group keys sharing a prefix up to this delimiter into common prefixes.
    pub delimiter: Option<String>,
    /// Token from a previous truncated page.
    pub continuation_token: Option<String>,
    /// Maximum number of keys plus common prefixes on the page.
    pub max_keys: Option<usize>,
}

impl ListObjectsRequest {
    /// Create a request listing everything under `prefix`.
    ///
    /// # Arguments
    /// * `prefix` - Key prefix to list
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Set the delimiter used for common prefix grouping.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Resume from a continuation token.
    pub fn with_continuation_token(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }

    /// Bound the page size.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

/// One page of ListObjectsV2 results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsPage {
    /// Common prefixes, each ending with the delimiter.
    pub common_prefixes: Vec<String>,
    /// Objects on this page.
    pub objects: Vec<ObjectInfo>,
    /// Token to pass to the next request when the page is truncated.
    pub next_continuation_token: Option<String>,
    /// Whether more results are available.
    pub is_truncated: bool,
}

impl ListObjectsPage {
    /// Number of keys plus common prefixes on the page.
    pub fn key_count(&self) -> usize {
        self.common_prefixes.len() + self.objects.len()
    }
}

/// Format an inclusive HTTP byte range header value.
///
/// # Arguments
/// * `start` - First byte offset
/// * `end` - Last byte offset (inclusive)
///
/// # Returns
/// Header value such as `bytes=0-65535`.
pub fn format_range(start: u64, end: u64) -> String {
    format!("bytes={}-{}", start, end)
}
