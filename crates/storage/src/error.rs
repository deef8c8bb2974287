//! Error types for storage operations.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Object not found in S3.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Access denied.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Requested byte range lies outside the object.
    #[error("Invalid range bytes={start}-{end} for s3://{bucket}/{key} ({size} bytes)")]
    InvalidRange {
        bucket: String,
        key: String,
        start: u64,
        end: u64,
        size: u64,
    },

    /// Network error.
    #[error("Network error: {message}")]
    NetworkError { message: String, retryable: bool },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    IoError { path: String, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl StorageError {
    /// Check if this error is retryable.
    ///
    /// Nothing in bucketfs retries on its own; this is surfaced so callers
    /// can decide at the transport layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::NetworkError { retryable, .. } => *retryable,
            StorageError::NotFound { .. } => false,
            StorageError::AccessDenied { .. } => false,
            StorageError::InvalidRange { .. } => false,
            StorageError::IoError { .. } => false,
            StorageError::InvalidConfig { .. } => false,
            StorageError::Other { .. } => false,
        }
    }

    /// Check if this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_flagged_network_errors() {
        let transient: StorageError = StorageError::NetworkError {
            message: "connection reset".into(),
            retryable: true,
        };
        let denied: StorageError = StorageError::AccessDenied {
            bucket: "b".into(),
            key: "k".into(),
            message: "forbidden".into(),
        };

        assert!(transient.is_retryable());
        assert!(!denied.is_retryable());
    }

    #[test]
    fn test_display_includes_location() {
        let err: StorageError = StorageError::NotFound {
            bucket: "bucket".into(),
            key: "dir/a.txt".into(),
        };
        assert_eq!(err.to_string(), "Object not found: s3://bucket/dir/a.txt");
        assert!(err.is_not_found());
    }
}
