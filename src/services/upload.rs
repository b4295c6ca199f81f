use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::keys::{build_file_key, classify_content_type};
use crate::models::{MediaRecord, MediaType};
use crate::services::blob::BlobStore;
use crate::services::metadata::MetadataStore;

/// One file pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A file that made it through both writes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredFile {
    pub file_key: String,
    pub file_type: MediaType,
}

/// A presigned direct-upload slot: the client PUTs to `url`, then registers
/// `file_key`.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    pub file_key: String,
    pub file_type: MediaType,
    pub url: String,
}

/// Accepts new files and keeps blob and metadata in step: blob first, record
/// second, blob deleted again when the record write fails.
#[derive(Clone)]
pub struct UploadCoordinator {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl UploadCoordinator {
    pub fn new(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { blobs, metadata }
    }

    /// Stores a batch of files for `owner`. Files are processed
    /// independently: a failure on one never rolls back another that already
    /// committed. Non-media payloads are skipped. Returns the files that were
    /// fully registered; if that list would be empty, the whole request was
    /// invalid.
    pub async fn upload_many(
        &self,
        owner: &str,
        files: Vec<UploadPayload>,
    ) -> Result<Vec<RegisteredFile>, AppError> {
        if files.is_empty() {
            return Err(AppError::Validation(
                "Please upload at least one image or video".to_string(),
            ));
        }

        let mut registered = Vec::new();

        for file in files {
            let Some(file_type) = classify_content_type(&file.content_type) else {
                tracing::info!(
                    "skipping {} with unsupported content type {}",
                    file.file_name,
                    file.content_type
                );
                continue;
            };

            match self.upload_one(owner, file_type, file).await {
                Ok(result) => registered.push(result),
                Err(e) => {
                    tracing::warn!("upload failed for one file: {}", e);
                }
            }
        }

        if registered.is_empty() {
            return Err(AppError::Validation(
                "No valid files were uploaded".to_string(),
            ));
        }

        Ok(registered)
    }

    async fn upload_one(
        &self,
        owner: &str,
        file_type: MediaType,
        file: UploadPayload,
    ) -> Result<RegisteredFile, AppError> {
        let file_key = build_file_key(
            file_type,
            chrono::Utc::now().timestamp_millis(),
            &file.file_name,
        );

        self.blobs
            .put(&file_key, file.data, &file.content_type)
            .await?;

        let record = MediaRecord::new(file_key.clone(), file_type, owner.to_string());

        if let Err(err) = self.metadata.put(&record).await {
            // Compensating action: the blob must not outlive a failed record
            // write.
            if let Err(rollback_err) = self.blobs.delete(&file_key).await {
                tracing::error!(
                    "rollback failed, orphan blob {} left behind: {}",
                    file_key,
                    rollback_err
                );
            } else {
                tracing::warn!("rolled back blob {} after metadata failure", file_key);
            }
            return Err(err);
        }

        tracing::info!("registered {} for {}", file_key, owner);
        Ok(RegisteredFile {
            file_key,
            file_type,
        })
    }

    /// Issues a presigned PUT URL for a browser-direct upload. Nothing is
    /// written yet; the client must call `register` once the PUT completes.
    pub async fn presign(
        &self,
        file_name: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUpload, AppError> {
        let file_type = classify_content_type(content_type).ok_or_else(|| {
            AppError::Validation(format!("unsupported file type {}", content_type))
        })?;

        let file_key = build_file_key(file_type, chrono::Utc::now().timestamp_millis(), file_name);

        let url = self
            .blobs
            .presigned_put_url(&file_key, content_type, expires_in)
            .await?;

        Ok(PresignedUpload {
            file_key,
            file_type,
            url,
        })
    }

    /// Writes the metadata record for a blob the client uploaded directly.
    /// The blob must already exist (a record must never point at nothing) and
    /// the key must not be registered twice.
    pub async fn register(
        &self,
        owner: &str,
        file_key: &str,
        file_type: MediaType,
    ) -> Result<RegisteredFile, AppError> {
        if self.metadata.get(file_key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "{} is already registered",
                file_key
            )));
        }

        if !self.blobs.exists(file_key).await? {
            return Err(AppError::Validation(format!(
                "no uploaded blob found for {}",
                file_key
            )));
        }

        let record = MediaRecord::new(file_key.to_string(), file_type, owner.to_string());
        self.metadata.put(&record).await?;

        tracing::info!("registered direct upload {} for {}", file_key, owner);
        Ok(RegisteredFile {
            file_key: file_key.to_string(),
            file_type,
        })
    }
}
