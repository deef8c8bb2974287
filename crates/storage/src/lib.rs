//! Storage abstraction for bucketfs S3 operations.
//!
//! This crate provides a platform-agnostic interface for the read path of an
//! object store: HEAD lookups, delimited ListObjectsV2 pages and ranged
//! GetObject streams. It supports multiple backends:
//!
//! - **CRT Backend** - Native Rust using the AWS SDK (`bucketfs-storage-crt`)
//! - **Memory Backend** - In-process store with S3 listing semantics, used
//!   by tests and embedders that stage content locally

mod error;
pub mod memory;
mod traits;
mod types;

pub use error::StorageError;
pub use memory::{MemoryStorageClient, RangeRequest, RequestCounts};
pub use traits::StorageClient;
pub use types::{
    format_range, AwsCredentials, ListObjectsPage, ListObjectsRequest, ObjectBody, ObjectInfo,
    ObjectMetadata, StorageSettings,
};
