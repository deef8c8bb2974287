//! Read-only virtual filesystem over an object storage bucket.
//!
//! Object keys are treated as paths separated by `/`. Directories are never
//! stored: a path is a directory when a marker key (`dir/`) exists or when
//! any key lives under it. File content is fetched on demand with ranged
//! GETs, one open range per handle, sized to the caller's request plus a
//! read-ahead window.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: Adapters (BucketFs, BlockingFile)
//! Layer 2: Handles (FileHandle: read, seek, read_dir, close)
//! Layer 1: Primitives (MetadataResolver, DirectoryLister, RangeStream)
//! ```
//!
//! Everything below layer 1 goes through [`bucketfs_storage::StorageClient`],
//! so the same code runs against S3 or the in-memory backend.

mod bucket;
pub mod blocking;
pub mod error;
pub mod fs;
pub mod handle;
pub mod lister;
pub mod metadata;
pub mod options;
pub mod range;
pub mod resolver;

pub use blocking::BlockingFile;
pub use bucket::Bucket;
pub use error::{FsError, Op, ReadDirError};
pub use fs::{BucketFs, FS_NAME};
pub use handle::{FileHandle, ReadOutcome, Whence};
pub use lister::{DirectoryLister, ListCursor, ListPage, PartialListing};
pub use metadata::{DirEntry, FileKind, Metadata};
pub use options::{ListingOptions, ReadAheadOptions, VfsOptions};
pub use range::RangeStream;
pub use resolver::MetadataResolver;
