pub mod fakes;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

use media_vault::models::{MediaRecord, MediaType};
use media_vault::routes::create_routes;
use media_vault::services::media::MediaService;
use media_vault::services::preview::PreviewGenerator;
use media_vault::services::upload::UploadCoordinator;
use media_vault::state::AppState;

use self::fakes::{MemoryBlobStore, MemoryMetadataStore, StaticTokenVerifier};

/// Small on purpose so tests stay fast and the sweep still paginates.
pub const PREVIEW_WIDTH: u32 = 64;
pub const SWEEP_PAGE_SIZE: u64 = 2;

/// The full service stack wired to in-memory collaborators, with direct
/// handles on the fakes for seeding and inspection.
#[allow(dead_code)]
pub struct TestApp {
    pub blobs: Arc<MemoryBlobStore>,
    pub metadata: Arc<MemoryMetadataStore>,
    pub uploads: UploadCoordinator,
    pub previews: PreviewGenerator,
    pub media: MediaService,
}

#[allow(dead_code)]
pub fn test_app() -> TestApp {
    let blobs = Arc::new(MemoryBlobStore::default());
    let metadata = Arc::new(MemoryMetadataStore::default());

    let uploads = UploadCoordinator::new(blobs.clone(), metadata.clone());
    let previews = PreviewGenerator::new(
        blobs.clone(),
        metadata.clone(),
        PREVIEW_WIDTH,
        SWEEP_PAGE_SIZE,
    );
    let media = MediaService::new(blobs.clone(), metadata.clone(), Duration::from_secs(6400));

    TestApp {
        blobs,
        metadata,
        uploads,
        previews,
        media,
    }
}

/// Router over the same stack; `alice-token` and `bob-token` are the two
/// known bearer tokens.
#[allow(dead_code)]
pub fn test_router(app: &TestApp) -> axum::Router {
    let verifier = StaticTokenVerifier::with(&[("alice-token", "alice"), ("bob-token", "bob")]);

    create_routes(AppState {
        uploads: app.uploads.clone(),
        previews: app.previews.clone(),
        media: app.media.clone(),
        verifier: Arc::new(verifier),
        upload_url_ttl: Duration::from_secs(3600),
    })
}

/// A valid PNG of the given dimensions.
#[allow(dead_code)]
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba::<u8>([20, 90, 200, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Seeds blob + record for an already-uploaded image, preview pending.
#[allow(dead_code)]
pub fn seed_image(app: &TestApp, file_key: &str, owner: &str, width: u32, height: u32) {
    app.blobs.insert(file_key, png_bytes(width, height), "image/png");
    app.metadata.insert(MediaRecord::new(
        file_key.to_string(),
        MediaType::Image,
        owner.to_string(),
    ));
}
