use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::pagination::PaginatedResponse;
use crate::services::media::MediaItemView;
use crate::state::AppState;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListMediaQuery {
    /// Restrict to pinned (`true`) or unpinned (`false`) items.
    pub pinned: Option<bool>,
    #[param(default = 1, minimum = 1)]
    pub page: Option<u64>,
    #[param(default = 50, minimum = 1, maximum = 200)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/media",
    tag = "Media",
    params(ListMediaQuery),
    responses(
        (status = 200, description = "Caller's media with fresh access URLs", body = PaginatedResponse<MediaItemView>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListMediaQuery>,
) -> Result<Json<PaginatedResponse<MediaItemView>>, AppError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let response = state.media.list(&user.id, query.pinned, page, limit).await?;
    Ok(Json(response))
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FileKeyQuery {
    pub file_key: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/media/pin",
    tag = "Media",
    params(FileKeyQuery),
    responses(
        (status = 200, description = "Item pinned", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pin_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<FileKeyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    state.media.set_pinned(&user.id, &query.file_key, true).await?;

    Ok(Json(MessageResponse {
        message: "Item pinned successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/media/unpin",
    tag = "Media",
    params(FileKeyQuery),
    responses(
        (status = 200, description = "Item unpinned", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpin_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<FileKeyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .media
        .set_pinned(&user.id, &query.file_key, false)
        .await?;

    Ok(Json(MessageResponse {
        message: "Item unpinned successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/media",
    tag = "Media",
    params(FileKeyQuery),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Internal Server Error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<FileKeyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    state.media.delete(&user.id, &query.file_key).await?;

    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}
