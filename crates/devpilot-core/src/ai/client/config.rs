//! AI Client configuration
//!
//! Provider-agnostic configuration for AI API clients.

use crate::ai::providers::{ApiFormat, AuthHeader, ProviderId};
use crate::constants;

/// Configuration for the AI client
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    /// Which provider this config is for
    pub provider_id: ProviderId,
    /// Model ID to use for API calls
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: usize,
    /// Sampling temperature, fixed for every agent call
    pub temperature: f32,
    /// Optional base URL override (defaults to provider default)
    pub base_url: Option<String>,
}

impl Default for AiClientConfig {
    fn default() -> Self {
        Self {
            provider_id: ProviderId::default(),
            model: constants::ai::DEFAULT_MODEL.to_string(),
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            temperature: constants::ai::DEFAULT_TEMPERATURE,
            base_url: None,
        }
    }
}

impl AiClientConfig {
    /// Config for a provider using that provider's default model
    pub fn for_provider(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            model: provider_id.default_model().to_string(),
            ..Self::default()
        }
    }

    /// Get the API URL to use
    ///
    /// Gemini embeds the model in the path; a `{model}` placeholder in an
    /// override URL is substituted the same way.
    pub fn api_url(&self) -> String {
        let template = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.provider_id.default_api_url());
        template.replace("{model}", &self.model)
    }

    pub fn api_format(&self) -> ApiFormat {
        self.provider_id.api_format()
    }

    pub fn auth_header(&self) -> AuthHeader {
        self.provider_id.auth_header()
    }
}
