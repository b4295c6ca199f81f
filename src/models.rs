use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The two kinds of media the service accepts. Anything else is rejected at
/// the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Key namespace for blobs of this type (`images/...`, `videos/...`).
    pub fn key_prefix(&self) -> &'static str {
        match self {
            MediaType::Image => "images",
            MediaType::Video => "videos",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// Preview lifecycle of a record. Monotonic: `Pending` becomes `Ready` at
/// most once and never reverts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Pending,
    Ready { preview_key: String },
}

impl PreviewState {
    pub fn from_key(preview_key: Option<String>) -> Self {
        match preview_key {
            Some(preview_key) => PreviewState::Ready { preview_key },
            None => PreviewState::Pending,
        }
    }

    pub fn preview_key(&self) -> Option<&str> {
        match self {
            PreviewState::Ready { preview_key } => Some(preview_key),
            PreviewState::Pending => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreviewState::Ready { .. })
    }
}

/// One uploaded file: the metadata-store record joined to exactly one blob
/// via `file_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub file_key: String,
    pub file_type: MediaType,
    pub upload_date: NaiveDateTime,
    pub uploaded_by: String,
    pub preview: PreviewState,
    pub pinned: bool,
}

impl MediaRecord {
    /// A freshly uploaded record: unpinned, preview pending.
    pub fn new(file_key: String, file_type: MediaType, uploaded_by: String) -> Self {
        Self {
            file_key,
            file_type,
            upload_date: chrono::Utc::now().naive_utc(),
            uploaded_by,
            preview: PreviewState::Pending,
            pinned: false,
        }
    }
}
