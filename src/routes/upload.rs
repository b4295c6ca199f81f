use axum::{
    extract::{Multipart, Query, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::MediaType;
use crate::services::upload::{RegisteredFile, UploadPayload};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_key: String,
    pub file_type: MediaType,
}

impl From<RegisteredFile> for UploadedFile {
    fn from(file: RegisteredFile) -> Self {
        Self {
            file_key: file.file_key,
            file_type: file.file_type,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<UploadedFile>,
}

/// Fires the push-mode preview trigger for every image that just got a blob.
fn trigger_previews(state: &AppState, files: &[RegisteredFile]) {
    for file in files.iter().filter(|f| f.file_type == MediaType::Image) {
        let previews = state.previews.clone();
        let file_key = file.file_key.clone();
        tokio::spawn(async move {
            previews.on_blob_created(&file_key).await;
        });
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "At least one file uploaded", body = UploadResponse),
        (status = 400, description = "No valid file in the request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("Invalid multipart data".to_string()))?
    {
        if field.name() != Some("files") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| AppError::Validation("Failed to read file bytes".to_string()))?;

        files.push(UploadPayload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let registered = state.uploads.upload_many(&user.id, files).await?;
    trigger_previews(&state, &registered);

    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        files: registered.into_iter().map(UploadedFile::from).collect(),
    }))
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PresignQuery {
    pub file_name: String,
    /// Content type of the file about to be uploaded.
    pub file_type: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub signed_url: String,
    pub file_key: String,
}

#[utoipa::path(
    get,
    path = "/api/upload/presign",
    tag = "Upload",
    params(PresignQuery),
    responses(
        (status = 200, description = "Presigned PUT URL", body = PresignResponse),
        (status = 400, description = "Missing or unsupported file type"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn presign_upload(
    State(state): State<AppState>,
    Query(query): Query<PresignQuery>,
) -> Result<Json<PresignResponse>, AppError> {
    let presigned = state
        .uploads
        .presign(&query.file_name, &query.file_type, state.upload_url_ttl)
        .await?;

    Ok(Json(PresignResponse {
        signed_url: presigned.url,
        file_key: presigned.file_key,
    }))
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub file_key: String,
    pub file_type: MediaType,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub file_key: String,
}

#[utoipa::path(
    post,
    path = "/api/upload/register",
    tag = "Upload",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Metadata registered", body = RegisterResponse),
        (status = 400, description = "No blob uploaded for this key"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Key already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let registered = state
        .uploads
        .register(&user.id, &request.file_key, request.file_type)
        .await?;

    trigger_previews(&state, std::slice::from_ref(&registered));

    Ok(Json(RegisterResponse {
        file_key: registered.file_key,
    }))
}
