use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::Config;
use crate::error::AppError;

/// A blob fetched from the store: raw bytes plus the content type it was
/// stored with.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Content-addressable object storage collaborator. Production runs on S3;
/// tests substitute an in-memory implementation.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<BlobObject, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Time-limited read URL; generated per request, never persisted.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration)
        -> Result<String, AppError>;

    /// Time-limited upload URL for browser-direct PUTs.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket_name: String,
}

impl S3BlobStore {
    pub fn new(config: &Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.aws_access_key_id.clone(),
            config.aws_secret_access_key.clone(),
            None,
            None,
            "manual_config",
        );

        let region = aws_sdk_s3::config::Region::new(config.aws_region.clone());

        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket_name: config.s3_bucket_name.clone(),
        }
    }

    /// Creates the bucket when it is missing. Called once at startup; objects
    /// stay private, access goes through presigned URLs.
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let resp = self
            .client
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;

        if resp.is_ok() {
            return Ok(());
        }

        tracing::info!("bucket {} not reachable, attempting to create", self.bucket_name);
        self.client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("failed to create bucket {}: {:?}", self.bucket_name, e);
                AppError::Dependency(format!("failed to create S3 bucket: {}", e))
            })?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("S3 upload error for {}: {:?}", key, e);
                AppError::Dependency(format!("failed to upload blob {}: {}", key, e))
            })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<BlobObject, AppError> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(AppError::NotFound(format!("blob {} not found", key)));
                }
                tracing::error!("S3 download error for {}: {:?}", key, service_err);
                return Err(AppError::Dependency(format!(
                    "failed to download blob {}: {}",
                    key, service_err
                )));
            }
        };

        let content_type = resp
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = resp.body.collect().await.map_err(|e| {
            tracing::error!("S3 body error for {}: {:?}", key, e);
            AppError::Dependency(format!("failed to read blob body for {}", key))
        })?;

        Ok(BlobObject {
            data: data.into_bytes().to_vec(),
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("S3 delete error for {}: {:?}", key, e);
                AppError::Dependency(format!("failed to delete blob {}", key))
            })?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(context)) if context.err().is_not_found() => Ok(false),
            Err(e) => {
                tracing::error!("S3 head error for {}: {:?}", key, e);
                Err(AppError::Dependency(format!(
                    "failed to check blob {}: {}",
                    key, e
                )))
            }
        }
    }

    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Dependency(format!("failed to configure presigner: {}", e)))?;

        let presigned_req = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                tracing::error!("presigning error for {}: {:?}", key, e);
                AppError::Dependency(format!("failed to presign read for {}", key))
            })?;

        Ok(presigned_req.uri().to_string())
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Dependency(format!("failed to configure presigner: {}", e)))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                tracing::error!("presigning error for {}: {:?}", key, e);
                AppError::Dependency(format!("failed to presign upload for {}", key))
            })?;

        Ok(presigned_req.uri().to_string())
    }
}
