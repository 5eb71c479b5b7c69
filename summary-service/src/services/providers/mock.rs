//! Mock provider for testing.
//!
//! Returns canned responses without network access and counts how often it
//! was asked to describe an image.

use super::{ModelInfo, ProviderError, VisionProvider};
use crate::models::ImageUpload;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the mock does when asked to describe an image.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this text.
    Reply(String),
    /// Fail with an API error carrying this message.
    Fail(String),
    /// Sleep this long before replying, to exercise timeouts.
    Hang(Duration),
}

pub struct MockVisionProvider {
    behavior: MockBehavior,
    models: Option<Vec<ModelInfo>>,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            models: Some(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    pub fn hanging(delay: Duration) -> Self {
        Self::new(MockBehavior::Hang(delay))
    }

    /// Models reported by [`VisionProvider::list_models`].
    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = Some(models);
        self
    }

    /// Make model listing fail.
    pub fn without_model_listing(mut self) -> Self {
        self.models = None;
        self
    }

    /// Number of `describe_image` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn describe_image(
        &self,
        model: &str,
        image: &ImageUpload,
        _prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Fail(message) => Err(ProviderError::ApiError(message.clone())),
            MockBehavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(format!(
                    "Mock description of {} ({}) from {}",
                    image.filename, image.mime_type, model
                ))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        self.models.clone().ok_or_else(|| {
            ProviderError::NetworkError("Mock model listing unavailable".to_string())
        })
    }
}
