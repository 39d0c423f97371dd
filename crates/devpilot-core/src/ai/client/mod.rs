//! HTTP client for hosted completion endpoints
//!
//! No pipeline awareness: renders nothing, parses nothing beyond pulling the
//! completion text out of each provider's response envelope.

mod config;
mod simple;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

pub use config::AiClientConfig;

use super::error::CompletionError;
use super::providers::{AuthHeader, ProviderId, GENERIC_API_KEY_ENV};
use super::CompletionModel;

/// Maximum length for error bodies carried in `CompletionError::Api`
const MAX_ERROR_BODY_LEN: usize = 500;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for a single provider/model pair.
///
/// Constructed once at startup and shared by every agent through
/// `Arc<dyn CompletionModel>`.
pub struct AiClient {
    http: Client,
    config: AiClientConfig,
    api_key: String,
}

impl std::fmt::Debug for AiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiClient")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AiClient {
    pub fn new(config: AiClientConfig, api_key: String) -> Self {
        Self {
            http: Client::new(),
            config,
            api_key,
        }
    }

    /// Create a client reading the API key from the environment.
    ///
    /// `DEVPILOT_API_KEY` wins over the provider-specific variable.
    pub fn from_env(config: AiClientConfig) -> Result<Self, CompletionError> {
        let api_key = resolve_api_key(config.provider_id, |name| std::env::var(name).ok())?;
        Ok(Self::new(config, api_key))
    }

    pub fn config(&self) -> &AiClientConfig {
        &self.config
    }

    pub fn provider_id(&self) -> ProviderId {
        self.config.provider_id
    }

    /// POST builder with auth and provider headers applied
    fn build_request(&self, url: &str) -> RequestBuilder {
        let request = self
            .http
            .post(url)
            .header("content-type", "application/json");

        let request = match self.config.auth_header() {
            AuthHeader::GoogApiKey => request.header("x-goog-api-key", &self.api_key),
            AuthHeader::Bearer => request.bearer_auth(&self.api_key),
            AuthHeader::XApiKey => request.header("x-api-key", &self.api_key),
        };

        if self.config.provider_id == ProviderId::Anthropic {
            request.header("anthropic-version", ANTHROPIC_VERSION)
        } else {
            request
        }
    }

    /// Turn non-success statuses into `CompletionError::Api`
    async fn handle_error_response(&self, response: Response) -> Result<Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
        debug!(
            "{} returned HTTP {}: {} bytes of error body",
            self.config.provider_id,
            status.as_u16(),
            body.len()
        );
        Err(CompletionError::Api {
            status: status.as_u16(),
            message: truncate_chars(&body, MAX_ERROR_BODY_LEN),
        })
    }
}

#[async_trait]
impl CompletionModel for AiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.call_simple(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Pick the API key for a provider from an environment lookup
pub(crate) fn resolve_api_key(
    provider: ProviderId,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, CompletionError> {
    [GENERIC_API_KEY_ENV, provider.api_key_env()]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            CompletionError::MissingApiKey(format!(
                "set {} or {}",
                provider.api_key_env(),
                GENERIC_API_KEY_ENV
            ))
        })
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
