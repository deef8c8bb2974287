//! Filesystem adapter: the entry point that binds a bucket and hands out
//! handles.

use std::sync::Arc;

use bucketfs_storage::StorageClient;
use tracing::debug;

use crate::bucket::Bucket;
use crate::error::{FsError, Op};
use crate::handle::FileHandle;
use crate::lister::DirectoryLister;
use crate::metadata::Metadata;
use crate::options::VfsOptions;
use crate::resolver::MetadataResolver;

/// Name reported by [`BucketFs::name`].
pub const FS_NAME: &str = "s3";

/// Read-only filesystem view of one bucket.
///
/// Paths are object keys relative to the bucket root, without a leading
/// delimiter. The empty path is the root directory.
///
/// # Example
///
/// ```ignore
/// let fs = BucketFs::new(client, "my-bucket");
/// let mut file = fs.open("dir/b.txt").await?;
/// let mut buf = vec![0u8; 1024];
/// let outcome = file.read(&mut buf).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BucketFs {
    bucket: Bucket,
    resolver: MetadataResolver,
    options: VfsOptions,
}

impl BucketFs {
    /// Bind `client` to `bucket` with default options.
    ///
    /// # Arguments
    /// * `client` - Storage backend
    /// * `bucket` - Bucket every request targets
    pub fn new(client: Arc<dyn StorageClient>, bucket: impl Into<String>) -> Self {
        Self::from_bucket(Bucket::new(client, bucket), VfsOptions::default())
    }

    /// Replace the options. Applies to handles opened afterwards.
    pub fn with_options(self, options: VfsOptions) -> Self {
        Self::from_bucket(self.bucket, options)
    }

    fn from_bucket(bucket: Bucket, options: VfsOptions) -> Self {
        let resolver: MetadataResolver =
            MetadataResolver::new(bucket.clone(), Self::lister_for(&bucket, &options));
        Self {
            bucket,
            resolver,
            options,
        }
    }

    fn lister_for(bucket: &Bucket, options: &VfsOptions) -> DirectoryLister {
        DirectoryLister::new(bucket.clone(), options.listing.effective_page_size())
    }

    /// Filesystem name, always `"s3"`.
    pub fn name(&self) -> &'static str {
        FS_NAME
    }

    /// Bucket this filesystem is bound to.
    pub fn bucket(&self) -> &str {
        self.bucket.name()
    }

    pub fn options(&self) -> &VfsOptions {
        &self.options
    }

    /// Resolve the metadata of `path` without opening it.
    ///
    /// # Errors
    /// `NotExist` or `Transport`, tagged with [`Op::Stat`].
    pub async fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        self.resolver.stat(path).await
    }

    /// Open `path` for reading or listing.
    ///
    /// Resolves metadata once; the handle serves stat requests from it
    /// without further round trips.
    ///
    /// # Errors
    /// Any resolution error, re-tagged with [`Op::Open`].
    pub async fn open(&self, path: &str) -> Result<FileHandle, FsError> {
        let metadata: Metadata = self
            .resolver
            .stat(path)
            .await
            .map_err(|e| e.with_op(Op::Open))?;

        debug!(
            bucket = self.bucket.name(),
            path,
            kind = ?metadata.kind(),
            size = metadata.size(),
            "opened"
        );

        Ok(FileHandle::new(
            self.bucket.clone(),
            path,
            metadata,
            Self::lister_for(&self.bucket, &self.options),
            &self.options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use bucketfs_storage::MemoryStorageClient;

    use super::*;
    use crate::options::ListingOptions;

    #[tokio::test]
    async fn test_open_missing_is_tagged_open() {
        let fs: BucketFs = BucketFs::new(Arc::new(MemoryStorageClient::new()), "bucket");

        let err: FsError = fs.open("missing.txt").await.unwrap_err();

        assert!(err.is_not_exist());
        assert_eq!(err.op(), Op::Open);
        assert_eq!(err.path(), "missing.txt");
    }

    #[tokio::test]
    async fn test_open_caches_metadata() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object("bucket", "a.txt", b"hello".to_vec());
        let fs: BucketFs = BucketFs::new(store.clone(), "bucket");

        let handle: FileHandle = fs.open("a.txt").await.unwrap();
        assert_eq!(handle.stat().size(), 5);
        assert_eq!(handle.stat().size(), 5);
        assert_eq!(handle.name(), "a.txt");

        assert_eq!(store.request_counts().head, 1);
    }

    #[test]
    fn test_name_and_options() {
        let fs: BucketFs = BucketFs::new(Arc::new(MemoryStorageClient::new()), "bucket")
            .with_options(VfsOptions::default().with_listing(ListingOptions::with_page_size(5)));

        assert_eq!(fs.name(), "s3");
        assert_eq!(fs.bucket(), "bucket");
        assert_eq!(fs.options().listing.page_size, 5);
    }
}
