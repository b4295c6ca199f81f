use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenVerifier;
use crate::services::media::MediaService;
use crate::services::preview::PreviewGenerator;
use crate::services::upload::UploadCoordinator;

/// Everything the handlers need, constructed once in `main` (or by the test
/// harness, with in-memory stores) and shared through axum state.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadCoordinator,
    pub previews: PreviewGenerator,
    pub media: MediaService,
    pub verifier: Arc<dyn TokenVerifier>,
    pub upload_url_ttl: Duration,
}
