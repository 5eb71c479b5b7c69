//! Image summarisation: model selection, the provider call and text cleanup.

use crate::models::ImageUpload;
use crate::services::providers::{ModelInfo, ProviderError, VisionProvider};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Instruction sent alongside every uploaded image.
pub const SUMMARY_PROMPT: &str = "Analyze this image and summarize its content. \
Describe the shapes, drawings and colors you see, transcribe any text, \
and explain what the image as a whole appears to show.";

/// Strip emphasis markers and blank lines from model output.
///
/// Every `*` is removed, each line is trimmed and empty lines are dropped.
/// Applying it twice gives the same result as applying it once.
pub fn clean_text(text: &str) -> String {
    text.replace('*', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First candidate, in candidate order, that appears among `available`.
///
/// Names are compared without the provider's `models/` prefix on either side.
pub fn select_model<'a>(candidates: &'a [String], available: &[String]) -> Option<&'a str> {
    let strip = |name: &str| name.strip_prefix("models/").unwrap_or(name).to_string();
    let available: Vec<String> = available.iter().map(|n| strip(n.as_str())).collect();

    candidates
        .iter()
        .find(|candidate| available.contains(&strip(candidate.as_str())))
        .map(String::as_str)
}

/// Pick the model to use for the life of the process.
///
/// Asks the provider which generation-capable models exist and applies
/// [`select_model`]. If the listing fails, times out or matches nothing, the
/// first candidate is used. Returns `None` only when `candidates` is empty.
pub async fn resolve_model(
    provider: &dyn VisionProvider,
    candidates: &[String],
    timeout: Duration,
) -> Option<String> {
    let first = candidates.first()?;

    let available = match tokio::time::timeout(timeout, provider.list_models()).await {
        Ok(Ok(models)) => models
            .iter()
            .filter(|m| m.supports_generate_content())
            .map(|m| m.short_name().to_string())
            .collect::<Vec<_>>(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, fallback = %first, "Model listing failed, using first candidate");
            return Some(first.clone());
        }
        Err(_) => {
            tracing::warn!(fallback = %first, "Model listing timed out, using first candidate");
            return Some(first.clone());
        }
    };

    match select_model(candidates, &available) {
        Some(model) => Some(model.to_string()),
        None => {
            tracing::warn!(
                candidates = ?candidates,
                fallback = %first,
                "No candidate model is listed by the provider, using first candidate"
            );
            Some(first.clone())
        }
    }
}

/// Generation-capable models, as reported by the provider.
pub async fn available_models(
    provider: &dyn VisionProvider,
    timeout: Duration,
) -> Result<Vec<ModelInfo>, ProviderError> {
    let models = tokio::time::timeout(timeout, provider.list_models())
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;

    Ok(models
        .into_iter()
        .filter(ModelInfo::supports_generate_content)
        .collect())
}

/// Runs one bounded provider call per upload and cleans the result.
pub struct Summarizer {
    provider: Arc<dyn VisionProvider>,
    model: String,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn VisionProvider>, model: String, timeout: Duration) -> Self {
        Self {
            provider,
            model,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn summarize(&self, image: &ImageUpload) -> Result<String, ProviderError> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            self.timeout,
            self.provider
                .describe_image(&self.model, image, SUMMARY_PROMPT),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        let elapsed = start.elapsed();
        let outcome = match &result {
            Ok(_) => "success",
            Err(ProviderError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };

        counter!(
            "provider_requests_total",
            "model" => self.model.clone(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!("provider_request_duration_seconds", "model" => self.model.clone())
            .record(elapsed.as_secs_f64());

        let raw = result?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = elapsed.as_millis() as u64,
            raw_chars = raw.len(),
            "Provider returned description"
        );

        Ok(clean_text(&raw))
    }
}
