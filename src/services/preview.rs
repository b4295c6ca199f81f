use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::keys::{derive_preview_key, is_image_key};
use crate::models::{MediaRecord, MediaType};
use crate::preview_image::render_preview;
use crate::services::blob::BlobStore;
use crate::services::metadata::{MetadataStore, PreviewUpdate};

/// What happened to a single record during preview generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// Preview written and recorded.
    Generated,
    /// Nothing to do: preview already present, record is not an image, or
    /// the blob's content type is not an image.
    Skipped,
    /// The record disappeared before the conditional update landed. The
    /// orphaned preview blob is left alone.
    RecordGone,
}

/// Counters for one sweep over the metadata store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: u64,
    pub generated: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Generates downscaled JPEG previews for image records that lack one.
///
/// Safe to run at any time, repeatedly, and concurrently: the preview key is
/// derived deterministically from the file key, so retried runs overwrite
/// the same destination blob with equivalent bytes, and the metadata update
/// is conditional, so only one run ever records the result. Anything that
/// fails is retried naturally by the next sweep.
#[derive(Clone)]
pub struct PreviewGenerator {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    target_width: u32,
    page_size: u64,
}

impl PreviewGenerator {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        target_width: u32,
        page_size: u64,
    ) -> Self {
        Self {
            blobs,
            metadata,
            target_width,
            page_size,
        }
    }

    /// Pull mode: walk the whole metadata store page by page and process
    /// every record. Per-item failures are logged and counted, never
    /// propagated; a metadata scan failure ends this sweep early and the
    /// next scheduled sweep starts over.
    pub async fn sweep(&self) -> SweepStats {
        let mut stats = SweepStats::default();
        let mut page = Some(0);

        while let Some(current) = page {
            let scan = match self.metadata.scan_page(current, self.page_size).await {
                Ok(scan) => scan,
                Err(e) => {
                    tracing::error!("preview sweep: scan page {} failed: {}", current, e);
                    break;
                }
            };

            for record in &scan.records {
                stats.scanned += 1;
                match self.process_record(record).await {
                    Ok(PreviewOutcome::Generated) => stats.generated += 1,
                    Ok(PreviewOutcome::Skipped) | Ok(PreviewOutcome::RecordGone) => {
                        stats.skipped += 1
                    }
                    Err(e) => {
                        stats.failed += 1;
                        tracing::warn!("preview sweep: {} failed: {}", record.file_key, e);
                    }
                }
            }

            page = scan.next_page;
        }

        stats
    }

    /// Push mode: run the same per-record algorithm for one freshly created
    /// blob. Errors are logged and swallowed; the sweep will retry.
    pub async fn on_blob_created(&self, file_key: &str) {
        let record = match self.metadata.get(file_key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("preview trigger: no record for {}", file_key);
                return;
            }
            Err(e) => {
                tracing::warn!("preview trigger: lookup of {} failed: {}", file_key, e);
                return;
            }
        };

        match self.process_record(&record).await {
            Ok(outcome) => {
                tracing::debug!("preview trigger: {} -> {:?}", file_key, outcome);
            }
            Err(e) => {
                tracing::warn!("preview trigger: {} failed: {}", file_key, e);
            }
        }
    }

    async fn process_record(&self, record: &MediaRecord) -> Result<PreviewOutcome, AppError> {
        // Idempotence guard: once a preview is recorded, the record is done
        // forever.
        if record.preview.is_ready() {
            return Ok(PreviewOutcome::Skipped);
        }

        // Cheap prefix check before any blob traffic.
        if record.file_type != MediaType::Image || !is_image_key(&record.file_key) {
            return Ok(PreviewOutcome::Skipped);
        }

        let blob = self.blobs.get(&record.file_key).await?;
        if !blob.content_type.starts_with("image/") {
            tracing::debug!(
                "skipping {} with non-image content type {}",
                record.file_key,
                blob.content_type
            );
            return Ok(PreviewOutcome::Skipped);
        }

        let target_width = self.target_width;
        let data = blob.data;
        let preview = tokio::task::spawn_blocking(move || render_preview(&data, target_width))
            .await
            .map_err(|e| AppError::Dependency(format!("preview task join error: {}", e)))??;

        // Deterministic destination: a retried run writes the same key, so
        // duplicate work is harmless.
        let preview_key = derive_preview_key(&record.file_key);
        self.blobs
            .put(&preview_key, preview, "image/jpeg")
            .await?;

        match self
            .metadata
            .set_preview_key(&record.file_key, &preview_key)
            .await?
        {
            PreviewUpdate::Applied => {
                tracing::info!("preview ready: {} -> {}", record.file_key, preview_key);
                Ok(PreviewOutcome::Generated)
            }
            // A concurrent run won the conditional write; both computed the
            // same preview key, so nothing diverged.
            PreviewUpdate::AlreadySet => Ok(PreviewOutcome::Skipped),
            PreviewUpdate::RecordMissing => {
                tracing::info!(
                    "record {} deleted during preview generation, leaving blob untouched",
                    record.file_key
                );
                Ok(PreviewOutcome::RecordGone)
            }
        }
    }

    /// Periodic pull-mode driver, spawned at startup.
    pub async fn run_scheduler(self, interval: Duration) {
        tracing::info!("preview sweep scheduler started ({:?} interval)", interval);
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            let stats = self.sweep().await;
            tracing::info!(
                "preview sweep done: scanned={} generated={} skipped={} failed={}",
                stats.scanned,
                stats.generated,
                stats.skipped,
                stats.failed
            );
        }
    }
}
