use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// The verified caller, inserted into request extensions by
/// `auth_middleware`. `id` is the token's stable subject identifier and is
/// what `MediaRecord::uploaded_by` stores.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Identity collaborator: checks a bearer token and extracts the subject.
/// Token issuance belongs to the external identity provider; this service
/// only verifies.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AppError>;
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies HS256 bearer tokens against the configured secret, issuer, and
/// audience. Expiry is enforced by the decoder.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<String, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("token verification failed: {}", e);
                AppError::Unauthenticated("Invalid token".to_string())
            })?;

        Ok(token_data.claims.sub)
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Unauthorized".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Unauthorized".to_string()))?;

    let subject = state.verifier.verify(token)?;

    req.extensions_mut().insert(AuthUser { id: subject });

    Ok(next.run(req).await)
}
