//! Shared-secret bearer authentication for the upload endpoint.

use crate::startup::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::utils::constant_time_eq;

const BEARER_PREFIX: &str = "Bearer ";

/// Proof that the request carried `Authorization: Bearer <shared secret>`.
///
/// Declared before the body extractor in a handler so that unauthenticated
/// requests are rejected without reading the upload.
#[derive(Debug, Clone, Copy)]
pub struct BearerAuth;

/// `true` when `header` is exactly `Bearer <secret>`.
pub fn bearer_token_matches(header: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }

    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(|token| constant_time_eq(token, secret))
        .unwrap_or(false)
}

#[async_trait]
impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        if bearer_token_matches(header, state.config.auth.secret_token.expose_secret()) {
            Ok(BearerAuth)
        } else {
            tracing::warn!(
                path = %parts.uri.path(),
                header_present = header.is_some(),
                "Rejected request with invalid bearer token"
            );
            Err(AppError::Forbidden(anyhow::anyhow!("Unauthorized")))
        }
    }
}
