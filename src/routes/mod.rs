pub mod home;
pub mod media;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::state::AppState;

/// Uploads go up to 200 MB; everything else uses axum's default limit.
const UPLOAD_BODY_LIMIT: usize = 200 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        upload::upload_media,
        upload::presign_upload,
        upload::register_upload,
        media::list_media,
        media::pin_media,
        media::unpin_media,
        media::delete_media,
    ),
    components(
        schemas(
            upload::UploadResponse,
            upload::UploadedFile,
            upload::PresignResponse,
            upload::RegisterRequest,
            upload::RegisterResponse,
            media::MessageResponse,
            crate::models::MediaType,
            crate::services::media::MediaItemView,
            crate::pagination::PaginatedResponse<crate::services::media::MediaItemView>,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Upload", description = "Multipart and browser-direct uploads"),
        (name = "Media", description = "Gallery listing, pinning, and deletion")
    ),
    info(
        title = "MediaVault API",
        version = "0.1.0",
        description = "Personal media storage: upload images and videos, browse them with short-lived URLs, pin favorites, delete.",
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    // Everything under /api requires a verified bearer token.
    let protected_routes = Router::new()
        .route("/api/upload", post(upload::upload_media))
        .route("/api/upload/presign", get(upload::presign_upload))
        .route("/api/upload/register", post(upload::register_upload))
        .route(
            "/api/media",
            get(media::list_media).delete(media::delete_media),
        )
        .route("/api/media/pin", post(media::pin_media))
        .route("/api/media/unpin", post(media::unpin_media))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let app_routes = Router::new()
        .route("/", get(home::root))
        .merge(protected_routes)
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
