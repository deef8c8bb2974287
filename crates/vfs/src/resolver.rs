//! Path to metadata resolution.

use bucketfs_common::{clean_key, is_dir_key, ROOT_NAME};
use bucketfs_storage::ObjectMetadata;
use tracing::debug;

use crate::bucket::Bucket;
use crate::error::{FsError, Op};
use crate::lister::DirectoryLister;
use crate::metadata::{mod_time_from_epoch_secs, Metadata};

/// Resolves paths to [`Metadata`], synthesizing directories from prefixes.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    bucket: Bucket,
    lister: DirectoryLister,
}

impl MetadataResolver {
    pub fn new(bucket: Bucket, lister: DirectoryLister) -> Self {
        Self { bucket, lister }
    }

    /// Resolve `path`.
    ///
    /// 1. HEAD the key. A hit on a key ending in the delimiter is a
    ///    directory marker; any other hit is a file.
    /// 2. On a miss, the path is a directory if any key starts with the
    ///    cleaned path.
    /// 3. The bucket root is always a directory, even when empty.
    ///
    /// # Errors
    /// `NotExist` when neither an object nor a child key exists, `Transport`
    /// for any store failure. Both are tagged with [`Op::Stat`].
    pub async fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        // An empty key is not addressable, and the root always exists
        if path.is_empty() {
            return Ok(Metadata::directory(ROOT_NAME));
        }

        let head: Option<ObjectMetadata> = self
            .bucket
            .client()
            .head_object(self.bucket.name(), path)
            .await
            .map_err(|e| FsError::transport(Op::Stat, path, e))?;

        match head {
            Some(_) if is_dir_key(path) => {
                debug!(path, "directory marker");
                Ok(Metadata::directory(path))
            }
            Some(object) => Ok(Metadata::file(
                path,
                object.size,
                mod_time_from_epoch_secs(object.last_modified),
            )),
            None => self.stat_directory(path).await,
        }
    }

    async fn stat_directory(&self, path: &str) -> Result<Metadata, FsError> {
        let cleaned: String = clean_key(path);
        if cleaned.is_empty() {
            return Ok(Metadata::directory(ROOT_NAME));
        }

        let exists: bool = self
            .lister
            .has_children(&cleaned)
            .await
            .map_err(|e| FsError::transport(Op::Stat, path, e))?;

        if exists {
            debug!(path, "implicit directory");
            Ok(Metadata::directory(&cleaned))
        } else {
            Err(FsError::NotExist {
                op: Op::Stat,
                path: path.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bucketfs_storage::MemoryStorageClient;

    use super::*;
    use crate::metadata::FileKind;

    const BUCKET: &str = "bucket";

    fn resolver_for(store: Arc<MemoryStorageClient>) -> MetadataResolver {
        let bucket: Bucket = Bucket::new(store, BUCKET);
        MetadataResolver::new(bucket.clone(), DirectoryLister::new(bucket, 1000))
    }

    #[tokio::test]
    async fn test_stat_file() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object_with_mtime(BUCKET, "dir/b.txt", b"bye".to_vec(), 1_700_000_000);

        let meta: Metadata = resolver_for(store).stat("dir/b.txt").await.unwrap();

        assert_eq!(meta.name(), "b.txt");
        assert_eq!(meta.size(), 3);
        assert_eq!(meta.kind(), FileKind::File);
        assert_eq!(meta.mod_time(), mod_time_from_epoch_secs(Some(1_700_000_000)));
    }

    #[tokio::test]
    async fn test_stat_marker_with_content_is_directory() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "dir/", b"not empty".to_vec());

        let meta: Metadata = resolver_for(store).stat("dir/").await.unwrap();

        assert!(meta.is_dir());
        assert_eq!(meta.size(), 0);
        assert_eq!(meta.name(), "dir");
    }

    #[tokio::test]
    async fn test_stat_implicit_directory() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "dir/sub/c.txt", b"c".to_vec());

        let resolver: MetadataResolver = resolver_for(store.clone());
        let meta: Metadata = resolver.stat("dir/sub").await.unwrap();

        assert!(meta.is_dir());
        assert_eq!(meta.name(), "sub");
        assert_eq!(store.request_counts().head, 1);
        assert_eq!(store.request_counts().list, 1);
    }

    #[tokio::test]
    async fn test_stat_shared_key_prefix_is_a_directory() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "dirt.txt", b"dirt".to_vec());
        store.put_object(BUCKET, "dir/b.txt", b"bye".to_vec());
        let resolver: MetadataResolver = resolver_for(store);

        let sibling: Metadata = resolver.stat("dirt").await.unwrap();
        let partial: Metadata = resolver.stat("dir/b").await.unwrap();

        assert!(sibling.is_dir());
        assert!(partial.is_dir());
        assert_eq!(partial.name(), "b");
    }

    #[tokio::test]
    async fn test_stat_without_matching_key_is_not_exist() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        store.put_object(BUCKET, "dirt.txt", b"dirt".to_vec());

        let err: FsError = resolver_for(store).stat("dix").await.unwrap_err();

        assert!(err.is_not_exist());
        assert_eq!(err.op(), Op::Stat);
        assert_eq!(err.path(), "dix");
    }

    #[tokio::test]
    async fn test_stat_root_of_empty_bucket() {
        let store: Arc<MemoryStorageClient> = Arc::new(MemoryStorageClient::new());
        let resolver: MetadataResolver = resolver_for(store.clone());

        let root: Metadata = resolver.stat("").await.unwrap();
        let slash: Metadata = resolver.stat("/").await.unwrap();

        assert!(root.is_dir());
        assert_eq!(root.name(), ROOT_NAME);
        assert!(slash.is_dir());
        // The empty path never reaches the store
        assert_eq!(store.request_counts().head, 1);
    }
}
