//! Blob key scheme.
//!
//! Originals live under a type-scoped namespace (`images/{millis}-{name}`,
//! `videos/{millis}-{name}`); previews live under `previews/` and share the
//! original's base name, so regenerating a preview always targets the same
//! destination key.

use crate::models::MediaType;

pub const PREVIEW_PREFIX: &str = "previews";

/// Maps an upload's content type to a media type. `None` means the file is
/// neither image nor video and must be skipped.
pub fn classify_content_type(content_type: &str) -> Option<MediaType> {
    if content_type.starts_with("image/") {
        Some(MediaType::Image)
    } else if content_type.starts_with("video/") {
        Some(MediaType::Video)
    } else {
        None
    }
}

/// Keeps letters, digits, dots, dashes, and underscores; everything else
/// (path separators included) becomes a dash.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// `images/170000-cat.png` for an image named `cat.png` uploaded at millis
/// 170000. The millisecond timestamp plus the original name keeps keys unique
/// per upload.
pub fn build_file_key(file_type: MediaType, upload_millis: i64, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        file_type.key_prefix(),
        upload_millis,
        sanitize_file_name(file_name)
    )
}

/// Deterministic preview destination: same base name, preview namespace.
/// `images/170000-cat.png` -> `previews/170000-cat.png`.
pub fn derive_preview_key(file_key: &str) -> String {
    let base_name = file_key.rsplit('/').next().unwrap_or(file_key);
    format!("{}/{}", PREVIEW_PREFIX, base_name)
}

/// Prefix check used by the preview sweep before it ever touches the blob.
pub fn is_image_key(file_key: &str) -> bool {
    file_key.starts_with(&format!("{}/", MediaType::Image.key_prefix()))
}
