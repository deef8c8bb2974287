//! Directory listing over delimited ListObjectsV2.
//!
//! A directory's children are the keys under `path/`: common prefixes become
//! subdirectories and plain keys become files. Keys ending in the delimiter
//! are directory markers; they are already represented by their common
//! prefix one level up and are dropped from the file set.

use bucketfs_common::{clean_key, dir_prefix, is_dir_key, DELIMITER_STR, MAX_LIST_PAGE_SIZE};
use bucketfs_storage::{ListObjectsPage, ListObjectsRequest, StorageError};
use tracing::{trace, warn};

use crate::bucket::Bucket;
use crate::metadata::{mod_time_from_epoch_secs, DirEntry, Metadata};

/// Resumable position in a directory listing.
///
/// The cursor is plain state owned by the caller and threaded through
/// [`DirectoryLister::next_page`] / [`DirectoryLister::list_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCursor {
    token: Option<String>,
    exhausted: bool,
}

impl ListCursor {
    /// Cursor positioned at the start of a listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continuation token for the next page, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether the last page has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn advance(&mut self, next_token: Option<String>, is_truncated: bool) {
        self.exhausted = !is_truncated;
        self.token = next_token;
    }
}

/// One listing page, split into subdirectories and files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub directories: Vec<DirEntry>,
    pub files: Vec<DirEntry>,
    pub next_token: Option<String>,
    pub is_truncated: bool,
}

impl ListPage {
    fn from_objects(page: ListObjectsPage) -> Self {
        let directories: Vec<DirEntry> = page
            .common_prefixes
            .iter()
            .map(|prefix| DirEntry::new(Metadata::directory(prefix)))
            .collect();

        let files: Vec<DirEntry> = page
            .objects
            .iter()
            .filter(|obj| !is_dir_key(&obj.key))
            .map(|obj| {
                DirEntry::new(Metadata::file(
                    &obj.key,
                    obj.size,
                    mod_time_from_epoch_secs(obj.last_modified),
                ))
            })
            .collect();

        Self {
            directories,
            files,
            next_token: page.next_continuation_token,
            is_truncated: page.is_truncated,
        }
    }

    /// All entries on the page, ordered by name.
    pub fn into_entries(self) -> Vec<DirEntry> {
        let mut entries: Vec<DirEntry> = self.directories;
        entries.extend(self.files);
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        entries
    }
}

/// Listing that failed part-way, with the entries gathered before the error.
#[derive(Debug)]
pub struct PartialListing {
    pub entries: Vec<DirEntry>,
    pub error: StorageError,
}

/// Lists the children of directory paths in one bucket.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    bucket: Bucket,
    page_size: usize,
}

impl DirectoryLister {
    /// Create a lister.
    ///
    /// # Arguments
    /// * `bucket` - Bucket binding to list
    /// * `page_size` - Keys per request in [`DirectoryLister::list_all`]
    pub fn new(bucket: Bucket, page_size: usize) -> Self {
        Self {
            bucket,
            page_size: page_size.clamp(1, MAX_LIST_PAGE_SIZE),
        }
    }

    /// Fetch one page of the children of `path`.
    ///
    /// # Arguments
    /// * `path` - Directory path (a trailing delimiter is optional)
    /// * `token` - Continuation token from the previous page
    /// * `max_keys` - Upper bound on subdirectories plus files returned
    pub async fn list(
        &self,
        path: &str,
        token: Option<&str>,
        max_keys: usize,
    ) -> Result<ListPage, StorageError> {
        let prefix: String = dir_prefix(path);
        trace!(bucket = self.bucket.name(), %prefix, ?token, max_keys, "listing page");

        let request: ListObjectsRequest = ListObjectsRequest::new(prefix)
            .with_delimiter(DELIMITER_STR)
            .with_continuation_token(token.map(|t| t.to_string()))
            .with_max_keys(max_keys.clamp(1, MAX_LIST_PAGE_SIZE));

        let page: ListObjectsPage = self
            .bucket
            .client()
            .list_objects_v2(self.bucket.name(), &request)
            .await?;

        Ok(ListPage::from_objects(page))
    }

    /// Fetch the next non-empty page at `cursor` and advance it.
    ///
    /// Pages holding only directory markers are skipped. Returns `None` once
    /// the listing is exhausted. On error the cursor is left unchanged.
    pub async fn next_page(
        &self,
        path: &str,
        cursor: &mut ListCursor,
        max_keys: usize,
    ) -> Result<Option<Vec<DirEntry>>, StorageError> {
        while !cursor.is_exhausted() {
            let page: ListPage = self.list(path, cursor.token(), max_keys).await?;

            let is_truncated: bool = if page.is_truncated && page.next_token.is_none() {
                warn!(path, "truncated listing page without a continuation token");
                false
            } else {
                page.is_truncated
            };
            cursor.advance(page.next_token.clone(), is_truncated);

            let entries: Vec<DirEntry> = page.into_entries();
            if !entries.is_empty() {
                return Ok(Some(entries));
            }
        }
        Ok(None)
    }

    /// List every remaining child of `path`, continuing from `cursor`.
    ///
    /// # Errors
    /// On failure, returns the entries accumulated so far alongside the error.
    pub async fn list_all(
        &self,
        path: &str,
        cursor: &mut ListCursor,
    ) -> Result<Vec<DirEntry>, PartialListing> {
        let mut entries: Vec<DirEntry> = Vec::new();

        loop {
            match self.next_page(path, cursor, self.page_size).await {
                Ok(Some(page)) => entries.extend(page),
                Ok(None) => return Ok(entries),
                Err(error) => return Err(PartialListing { entries, error }),
            }
        }
    }

    /// Check whether any key starts with the cleaned `path`.
    ///
    /// Used to detect directories that exist only as a common prefix. The
    /// prefix carries no trailing delimiter, so `dir` matches `dirt.txt`.
    pub async fn has_children(&self, path: &str) -> Result<bool, StorageError> {
        let request: ListObjectsRequest = ListObjectsRequest::new(clean_key(path)).with_max_keys(1);

        let page: ListObjectsPage = self
            .bucket
            .client()
            .list_objects_v2(self.bucket.name(), &request)
            .await?;

        Ok(page.key_count() > 0)
    }
}
