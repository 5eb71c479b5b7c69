//! Vision model provider abstractions and implementations.
//!
//! The gateway only needs two things from a provider: turn an image plus a
//! prompt into text, and report which models exist. Keeping that behind a
//! trait lets the HTTP layer be exercised against [`mock::MockVisionProvider`].

pub mod gemini;
pub mod mock;

use crate::models::ImageUpload;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Content blocked by provider safety filters")]
    ContentFiltered,

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider did not respond within {0:?}")]
    Timeout(Duration),
}

/// A model as reported by the provider's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Fully qualified name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            name: name.into(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Name without the `models/` resource prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Trait for image-to-text providers (e.g., Gemini).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Describe `image` following `prompt`, using `model`.
    async fn describe_image(
        &self,
        model: &str,
        image: &ImageUpload,
        prompt: &str,
    ) -> Result<String, ProviderError>;

    /// List the models the provider currently exposes.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;
}
