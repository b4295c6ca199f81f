use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{MediaRecord, MediaType, PreviewState};
use crate::pagination::PaginatedResponse;
use crate::services::blob::BlobStore;
use crate::services::metadata::MetadataStore;

/// A media record as the gallery sees it: metadata joined with freshly
/// presigned, short-lived access URLs. Never persisted.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemView {
    pub file_key: String,
    pub file_type: MediaType,
    pub upload_date: NaiveDateTime,
    pub uploaded_by: String,
    pub pinned: bool,
    /// Presigned read URL for the original blob.
    pub url: String,
    /// Presigned read URL for the preview blob; the original URL when no
    /// preview exists yet.
    pub preview_url: String,
}

/// Lists, pins, unpins, and deletes media records, enforcing ownership on
/// every mutation.
#[derive(Clone)]
pub struct MediaService {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    url_ttl: Duration,
}

impl MediaService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        url_ttl: Duration,
    ) -> Self {
        Self {
            blobs,
            metadata,
            url_ttl,
        }
    }

    pub async fn list(
        &self,
        owner: &str,
        pinned: Option<bool>,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<MediaItemView>, AppError> {
        let page = page.max(1);
        let owned = self
            .metadata
            .list_by_owner(owner, pinned, page, limit)
            .await?;

        let mut items = Vec::with_capacity(owned.records.len());
        for record in owned.records {
            items.push(self.with_urls(record).await?);
        }

        Ok(PaginatedResponse::new(items, owned.total_items, page, limit))
    }

    async fn with_urls(&self, record: MediaRecord) -> Result<MediaItemView, AppError> {
        let url = self
            .blobs
            .presigned_get_url(&record.file_key, self.url_ttl)
            .await?;

        let preview_url = match &record.preview {
            PreviewState::Ready { preview_key } => {
                self.blobs.presigned_get_url(preview_key, self.url_ttl).await?
            }
            PreviewState::Pending => url.clone(),
        };

        Ok(MediaItemView {
            file_key: record.file_key,
            file_type: record.file_type,
            upload_date: record.upload_date,
            uploaded_by: record.uploaded_by,
            pinned: record.pinned,
            url,
            preview_url,
        })
    }

    /// The single authorization predicate applied before any mutation: the
    /// record must exist and must belong to the requester.
    async fn load_owned(&self, requester: &str, file_key: &str) -> Result<MediaRecord, AppError> {
        let record = self
            .metadata
            .get(file_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        if record.uploaded_by != requester {
            return Err(AppError::Forbidden(
                "You can only modify your own uploads".to_string(),
            ));
        }

        Ok(record)
    }

    /// Idempotent: pinning an already pinned record is a no-op success.
    pub async fn set_pinned(
        &self,
        requester: &str,
        file_key: &str,
        pinned: bool,
    ) -> Result<(), AppError> {
        self.load_owned(requester, file_key).await?;

        if !self.metadata.set_pinned(file_key, pinned).await? {
            // Deleted between the ownership check and the write.
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        Ok(())
    }

    /// Deletes blob(s) first, then the record. A failure after the blob
    /// deletion leaves an orphaned record; that is the accepted failure mode
    /// (the record stays visible and deletable) rather than an unreachable
    /// orphan blob.
    pub async fn delete(&self, requester: &str, file_key: &str) -> Result<(), AppError> {
        let record = self.load_owned(requester, file_key).await?;

        self.blobs.delete(&record.file_key).await?;

        if let PreviewState::Ready { preview_key } = &record.preview {
            if let Err(e) = self.blobs.delete(preview_key).await {
                tracing::warn!("failed to delete preview blob {}: {}", preview_key, e);
            }
        }

        self.metadata.delete(&record.file_key).await?;

        tracing::info!("deleted {} for {}", file_key, requester);
        Ok(())
    }
}
