//! [`StorageClient`] over the AWS SDK for Rust.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

use bucketfs_storage::{
    format_range, ListObjectsPage, ListObjectsRequest, ObjectBody, ObjectInfo, ObjectMetadata,
    StorageClient, StorageError, StorageSettings,
};

use crate::error::CrtError;

/// Error codes S3 uses for permission failures. HEAD responses carry no
/// body, so they surface as the bare HTTP reason.
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "Forbidden", "AllAccessDisabled"];

/// Read-only S3 access for bucketfs.
///
/// Relies on the SDK for retry, connection pooling, and
/// streaming; bucketfs itself never retries.
pub struct CrtStorageClient {
    s3_client: S3Client,
    /// Sent as `x-amz-expected-bucket-owner` on every request.
    expected_bucket_owner: Option<String>,
}

impl CrtStorageClient {
    /// Build a client from settings, falling back to the default
    /// credential chain when no static credentials are given.
    ///
    /// # Arguments
    /// * `settings` - Region, endpoint and optional static credentials
    ///
    /// # Errors
    /// Returns `StorageError::InvalidConfig` for an empty region or a
    /// malformed endpoint URL.
    pub async fn new(settings: StorageSettings) -> Result<Self, StorageError> {
        validate_settings(&settings)?;

        let config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()));

        let config_loader = if let Some(ref creds) = settings.credentials {
            let credentials = Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None,
                "bucketfs",
            );
            config_loader.credentials_provider(credentials)
        } else {
            config_loader
        };

        let config_loader = if let Some(ref endpoint) = settings.endpoint_url {
            config_loader.endpoint_url(endpoint)
        } else {
            config_loader
        };

        let sdk_config = config_loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();
        let s3_client = S3Client::from_conf(s3_config);

        log::debug!(
            "Created S3 client for region {} (endpoint: {:?})",
            settings.region,
            settings.endpoint_url
        );

        Ok(Self {
            s3_client,
            expected_bucket_owner: settings.expected_bucket_owner,
        })
    }

    /// Wrap an already configured SDK client.
    ///
    /// # Arguments
    /// * `s3_client` - SDK client to issue requests with
    /// * `expected_bucket_owner` - Account ID the bucket must belong to
    pub fn from_client(s3_client: S3Client, expected_bucket_owner: Option<String>) -> Self {
        Self {
            s3_client,
            expected_bucket_owner,
        }
    }
}

/// Reject settings the SDK would only fail on at request time.
fn validate_settings(settings: &StorageSettings) -> Result<(), CrtError> {
    if settings.region.trim().is_empty() {
        return Err(CrtError::ConfigError("region must not be empty".into()));
    }
    if let Some(ref endpoint) = settings.endpoint_url {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(CrtError::ConfigError(format!(
                "endpoint URL must start with http:// or https://: {}",
                endpoint
            )));
        }
    }
    Ok(())
}

/// Map a modelled S3 service error onto the storage taxonomy.
fn service_failure<E>(err: E, bucket: &str, key: &str, retryable: bool) -> StorageError
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    let crt_err: CrtError = match err.code() {
        Some(code) if ACCESS_DENIED_CODES.contains(&code) => CrtError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: err.to_string(),
        },
        _ => CrtError::SdkError {
            message: err.to_string(),
            retryable,
        },
    };
    crt_err.into()
}

#[async_trait]
impl StorageClient for CrtStorageClient {
    fn expected_bucket_owner(&self) -> Option<&str> {
        self.expected_bucket_owner.as_deref()
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectMetadata>, StorageError> {
        let mut request = self.s3_client.head_object().bucket(bucket).key(key);

        if let Some(ref owner) = self.expected_bucket_owner {
            request = request.expected_bucket_owner(owner);
        }

        match request.send().await {
            Ok(output) => {
                let last_modified: Option<i64> = output
                    .last_modified()
                    .and_then(|dt| dt.to_millis().ok())
                    .map(|ms| ms / 1000);

                Ok(Some(ObjectMetadata {
                    size: output.content_length().map(|l| l as u64).unwrap_or(0),
                    last_modified,
                    etag: output.e_tag().map(|s| s.to_string()),
                    content_type: output.content_type().map(|s| s.to_string()),
                }))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(None)
                } else {
                    Err(service_failure(service_err, bucket, key, false))
                }
            }
        }
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, StorageError> {
        let mut builder = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&request.prefix);

        if let Some(ref owner) = self.expected_bucket_owner {
            builder = builder.expected_bucket_owner(owner);
        }

        if let Some(ref delimiter) = request.delimiter {
            builder = builder.delimiter(delimiter);
        }

        if let Some(ref token) = request.continuation_token {
            builder = builder.continuation_token(token);
        }

        if let Some(max_keys) = request.max_keys {
            builder = builder.max_keys(i32::try_from(max_keys).unwrap_or(i32::MAX));
        }

        let response = builder.send().await.map_err(|err| {
            service_failure(err.into_service_error(), bucket, &request.prefix, true)
        })?;

        let mut page: ListObjectsPage = ListObjectsPage {
            is_truncated: response.is_truncated() == Some(true),
            next_continuation_token: response.next_continuation_token.clone(),
            ..ListObjectsPage::default()
        };

        if let Some(ref prefixes) = response.common_prefixes {
            page.common_prefixes = prefixes
                .iter()
                .filter_map(|cp| cp.prefix().map(|p| p.to_string()))
                .collect();
        }

        if let Some(ref contents) = response.contents {
            for obj in contents {
                let last_modified: Option<i64> = obj
                    .last_modified()
                    .and_then(|dt| dt.to_millis().ok())
                    .map(|ms| ms / 1000);

                page.objects.push(ObjectInfo {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().map(|s| s as u64).unwrap_or(0),
                    last_modified,
                    etag: obj.e_tag().map(|s| s.to_string()),
                });
            }
        }

        log::debug!(
            "Listed s3://{}/{}: {} prefixes, {} objects, truncated={}",
            bucket,
            request.prefix,
            page.common_prefixes.len(),
            page.objects.len(),
            page.is_truncated
        );

        Ok(page)
    }

    async fn get_object_range(
        &self,
        bucket: &str,
        key: &str,
        start: u64,
        end: u64,
    ) -> Result<ObjectBody, StorageError> {
        let mut request = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(format_range(start, end));

        if let Some(ref owner) = self.expected_bucket_owner {
            request = request.expected_bucket_owner(owner);
        }

        let response = request.send().await.map_err(|err| {
            let service_err = err.into_service_error();
            if service_err.is_no_such_key() {
                StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
            } else {
                service_failure(service_err, bucket, key, true)
            }
        })?;

        Ok(Box::pin(response.body.into_async_read()))
    }
}
