use crate::dtos::SummaryResponse;
use crate::middleware::BearerAuth;
use crate::models::{ImageUpload, UploadError};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use service_core::error::AppError;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Authenticate, validate and summarise an uploaded image.
pub async fn upload_image(
    State(state): State<AppState>,
    _auth: BearerAuth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Expected a multipart form upload: {}", e))
    })?;

    let upload = read_image_field(&mut multipart).await?;

    tracing::info!(
        filename = %upload.filename,
        mime_type = %upload.mime_type,
        size = upload.size(),
        model = %state.summarizer.model(),
        "Image upload accepted"
    );

    let summary = state.summarizer.summarize(&upload).await.map_err(|e| {
        tracing::error!(filename = %upload.filename, error = %e, "Image summarization failed");
        AppError::ProcessingError(anyhow::Error::new(e))
    })?;

    tracing::info!(
        filename = %upload.filename,
        summary_chars = summary.len(),
        "Image summarization completed"
    );

    Ok(Json(SummaryResponse { summary }))
}

/// Find the `file` field and validate it. Other fields are skipped.
///
/// A `file` field without a filename parameter is a plain form value, not a
/// file, and counts as missing.
async fn read_image_field(multipart: &mut Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
        })?;

        return Ok(ImageUpload::new(&filename, data)?);
    }

    Err(UploadError::MissingFile.into())
}
