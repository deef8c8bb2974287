//! Storage traits/interfaces for S3 operations.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{ListObjectsPage, ListObjectsRequest, ObjectBody, ObjectMetadata};

/// Low-level S3 operations - implemented by each backend.
///
/// Only the read path is modelled. Implementations must not retry on their
/// own behalf beyond what the underlying transport already does.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Expected bucket owner sent with every request, if any.
    fn expected_bucket_owner(&self) -> Option<&str> {
        None
    }

    /// Look up an object's size and modification time.
    /// Returns None if object doesn't exist.
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, StorageError>;

    /// Fetch a single ListObjectsV2 page.
    async fn list_objects_v2(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, StorageError>;

    /// Open a streaming download of the inclusive byte range `[start, end]`.
    ///
    /// The returned body is owned by the caller; dropping it releases the
    /// underlying connection.
    async fn get_object_range(
        &self,
        bucket: &str,
        key: &str,
        start: u64,
        end: u64,
    ) -> Result<ObjectBody, StorageError>;
}
