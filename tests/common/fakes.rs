//! In-memory stand-ins for the external collaborators. They implement the
//! same traits as the production S3/sea-orm/JWT implementations, so every
//! service can run against them unchanged.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use media_vault::auth::TokenVerifier;
use media_vault::error::AppError;
use media_vault::models::{MediaRecord, PreviewState};
use media_vault::services::blob::{BlobObject, BlobStore};
use media_vault::services::metadata::{MetadataStore, OwnedPage, PreviewUpdate, ScanPage};

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, BlobObject>>,
}

#[allow(dead_code)]
impl MemoryBlobStore {
    pub fn insert(&self, key: &str, data: Vec<u8>, content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            BlobObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object(&self, key: &str) -> Option<BlobObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.insert(key, data, content_type);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<BlobObject, AppError> {
        self.object(key)
            .ok_or_else(|| AppError::NotFound(format!("blob {} not found", key)))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.contains(key))
    }

    // Presigning never checks existence, mirroring S3.
    async fn presigned_get_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        Ok(format!(
            "https://blobs.test/{}?expires={}",
            key,
            expires_in.as_secs()
        ))
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        Ok(format!(
            "https://blobs.test/put/{}?expires={}",
            key,
            expires_in.as_secs()
        ))
    }
}

#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Mutex<BTreeMap<String, MediaRecord>>,
    fail_puts_matching: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl MemoryMetadataStore {
    /// Every subsequent `put` whose file key contains `needle` fails with a
    /// dependency error, simulating a metadata-store outage for that file.
    pub fn fail_puts_matching(&self, needle: &str) {
        *self.fail_puts_matching.lock().unwrap() = Some(needle.to_string());
    }

    pub fn insert(&self, record: MediaRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.file_key.clone(), record);
    }

    pub fn record(&self, file_key: &str) -> Option<MediaRecord> {
        self.records.lock().unwrap().get(file_key).cloned()
    }

    pub fn remove(&self, file_key: &str) {
        self.records.lock().unwrap().remove(file_key);
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, record: &MediaRecord) -> Result<(), AppError> {
        if let Some(needle) = self.fail_puts_matching.lock().unwrap().as_deref() {
            if record.file_key.contains(needle) {
                return Err(AppError::Dependency(
                    "simulated metadata store outage".to_string(),
                ));
            }
        }

        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.file_key) {
            return Err(AppError::Conflict(format!(
                "{} already exists",
                record.file_key
            )));
        }
        records.insert(record.file_key.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, file_key: &str) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.record(file_key))
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        pinned: Option<bool>,
        page: u64,
        limit: u64,
    ) -> Result<OwnedPage, AppError> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<MediaRecord> = records
            .values()
            .filter(|r| r.uploaded_by == owner)
            .filter(|r| pinned.map_or(true, |p| r.pinned == p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));

        let total_items = matching.len() as u64;
        let start = (page.saturating_sub(1) * limit) as usize;
        let page_records = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Ok(OwnedPage {
            records: page_records,
            total_items,
        })
    }

    async fn set_pinned(&self, file_key: &str, pinned: bool) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(file_key) {
            Some(record) => {
                record.pinned = pinned;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_preview_key(
        &self,
        file_key: &str,
        preview_key: &str,
    ) -> Result<PreviewUpdate, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(file_key) {
            None => Ok(PreviewUpdate::RecordMissing),
            Some(record) if record.preview.is_ready() => Ok(PreviewUpdate::AlreadySet),
            Some(record) => {
                record.preview = PreviewState::Ready {
                    preview_key: preview_key.to_string(),
                };
                Ok(PreviewUpdate::Applied)
            }
        }
    }

    async fn delete(&self, file_key: &str) -> Result<(), AppError> {
        self.remove(file_key);
        Ok(())
    }

    async fn scan_page(&self, page: u64, page_size: u64) -> Result<ScanPage, AppError> {
        let records = self.records.lock().unwrap();
        let start = (page * page_size) as usize;
        let page_records: Vec<MediaRecord> = records
            .values()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        let full_page = page_records.len() as u64 == page_size;

        Ok(ScanPage {
            records: page_records,
            next_page: full_page.then(|| page + 1),
        })
    }
}

/// Token verifier with a fixed token -> subject table.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

#[allow(dead_code)]
impl StaticTokenVerifier {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            tokens: pairs
                .iter()
                .map(|(token, subject)| (token.to_string(), subject.to_string()))
                .collect(),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<String, AppError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Invalid token".to_string()))
    }
}
