//! AI provider layer
//!
//! Handles communication with hosted completion endpoints (Gemini, OpenAI,
//! Anthropic, OpenRouter). Agents only see the [`CompletionModel`] seam.

pub mod client;
pub mod error;
pub mod providers;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use client::{AiClient, AiClientConfig};
pub use error::CompletionError;
pub use providers::{ApiFormat, AuthHeader, ProviderId};

/// A text-completion capability: rendered prompt in, completion text out.
///
/// `AiClient` is the production implementation. Tests substitute a scripted
/// model so agents and the pipeline run without network access.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}
