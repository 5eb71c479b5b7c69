use crate::dtos::ModelListResponse;
use crate::services::summarizer::available_models;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// Models that can serve content generation, by provider name.
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelListResponse>, AppError> {
    let models = available_models(
        state.provider.as_ref(),
        state.config.models.request_timeout,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to list provider models");
        AppError::ProcessingError(anyhow::Error::new(e))
    })?;

    Ok(Json(ModelListResponse {
        models: models.into_iter().map(|m| m.name).collect(),
    }))
}
