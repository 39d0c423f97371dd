//! Simple (non-streaming) API calls
//!
//! Every agent sends one user prompt and reads back one text completion, so
//! this is the only call shape the client needs. Routes to the request/response
//! format of the configured provider.

use serde_json::Value;
use tracing::debug;

use super::AiClient;
use crate::ai::error::CompletionError;
use crate::ai::providers::ApiFormat;

fn collect_anthropic_text(blocks: &[Value]) -> String {
    let mut text = String::new();
    for block in blocks {
        // Thinking blocks may precede the text blocks
        if block.get("type").and_then(|t| t.as_str()) != Some("text") {
            continue;
        }
        if let Some(chunk) = block.get("text").and_then(|t| t.as_str()) {
            text.push_str(chunk);
        }
    }
    text
}

impl AiClient {
    /// Make a simple non-streaming API call
    ///
    /// Returns the completion text, trimmed.
    pub async fn call_simple(&self, prompt: &str) -> Result<String, CompletionError> {
        let config = self.config();
        let body = match config.api_format() {
            ApiFormat::Google => google_body(prompt, config.temperature, config.max_tokens),
            ApiFormat::OpenAI => {
                openai_body(&config.model, prompt, config.temperature, config.max_tokens)
            }
            ApiFormat::Anthropic => {
                anthropic_body(&config.model, prompt, config.temperature, config.max_tokens)
            }
        };

        debug!(
            "{} simple call to model {} ({} prompt bytes)",
            config.provider_id,
            config.model,
            prompt.len()
        );

        let request = self.build_request(&config.api_url());
        let response = request.json(&body).send().await?;
        let response = self.handle_error_response(response).await?;

        let json: Value = response.json().await?;
        extract_text(config.api_format(), &json)
    }
}

pub(crate) fn google_body(prompt: &str, temperature: f32, max_tokens: usize) -> Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": prompt}]
        }],
        "generationConfig": {
            "temperature": temperature,
            "maxOutputTokens": max_tokens
        }
    })
}

pub(crate) fn openai_body(model: &str, prompt: &str, temperature: f32, max_tokens: usize) -> Value {
    serde_json::json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": [
            {"role": "user", "content": prompt}
        ]
    })
}

pub(crate) fn anthropic_body(
    model: &str,
    prompt: &str,
    temperature: f32,
    max_tokens: usize,
) -> Value {
    serde_json::json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": [{
            "role": "user",
            "content": prompt
        }]
    })
}

/// Pull the completion text out of a provider response envelope
pub(crate) fn extract_text(format: ApiFormat, json: &Value) -> Result<String, CompletionError> {
    let text = match format {
        ApiFormat::Google => json
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            }),
        ApiFormat::OpenAI => json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|t| t.as_str())
            .map(str::to_string),
        ApiFormat::Anthropic => json
            .get("content")
            .and_then(|c| c.as_array())
            .map(|arr| collect_anthropic_text(arr)),
    };

    text.map(|t| t.trim().to_string()).ok_or_else(|| {
        CompletionError::InvalidResponse(format!(
            "no completion text in {:?} response",
            format
        ))
    })
}
