//! AWS SDK S3 backend for bucketfs storage.
//!
//! This crate provides a `StorageClient` implementation using the AWS SDK for Rust.
//! It covers the read path bucketfs needs: HEAD, delimited ListObjectsV2 and
//! ranged GetObject streams.
//!
//! # Example
//!
//! ```ignore
//! use bucketfs_storage::StorageSettings;
//! use bucketfs_storage_crt::CrtStorageClient;
//! use bucketfs_vfs::BucketFs;
//!
//! let settings = StorageSettings::default();
//! let client = CrtStorageClient::new(settings).await?;
//!
//! let fs = BucketFs::new(Arc::new(client), "my-bucket");
//! let mut file = fs.open("logs/2024/app.log").await?;
//! ```

mod client;
mod error;

pub use client::CrtStorageClient;
pub use error::CrtError;
