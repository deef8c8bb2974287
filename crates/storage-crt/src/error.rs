//! Error types for CRT storage operations.

use bucketfs_storage::StorageError;
use thiserror::Error;

/// Errors specific to the CRT storage client.
#[derive(Error, Debug)]
pub enum CrtError {
    /// AWS SDK error.
    #[error("AWS SDK error: {message}")]
    SdkError { message: String, retryable: bool },

    /// Request rejected for lack of permission.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<CrtError> for StorageError {
    fn from(err: CrtError) -> Self {
        match err {
            CrtError::SdkError { message, retryable } => {
                StorageError::NetworkError { message, retryable }
            }
            CrtError::AccessDenied {
                bucket,
                key,
                message,
            } => StorageError::AccessDenied {
                bucket,
                key,
                message,
            },
            CrtError::ConfigError(message) => StorageError::InvalidConfig { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_keeps_retryable_flag() {
        let err: StorageError = CrtError::SdkError {
            message: "throttled".into(),
            retryable: true,
        }
        .into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_config_error_maps_to_invalid_config() {
        let err: StorageError = CrtError::ConfigError("empty region".into()).into();
        assert!(matches!(err, StorageError::InvalidConfig { .. }));
    }
}
