//! Feedback service boundary
//!
//! The text-generation oracle is consumed behind a trait so the pipeline can
//! run against the real chat-completions client or a test double. Its
//! response is treated as one opaque free-text string.

mod openai;

pub use openai::{OpenAiFeedback, ServiceConfig};

use crate::error::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque text-generation oracle: prompt in, critique out
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[async_trait]
impl<T: FeedbackService + ?Sized> FeedbackService for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        (**self).generate(prompt).await
    }
}
