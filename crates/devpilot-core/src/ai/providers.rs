//! AI provider configuration
//!
//! Defines the supported completion providers, the wire format each one
//! speaks, and where its credentials come from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Google Generative Language API; `{model}` is substituted per request
pub const GEMINI_API: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

/// Standard OpenAI API for API key users (Chat Completions)
pub const OPENAI_CHAT_API: &str = "https://api.openai.com/v1/chat/completions";

pub const ANTHROPIC_MESSAGES_API: &str = "https://api.anthropic.com/v1/messages";

pub const OPENROUTER_CHAT_API: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Provider-independent override for the API key
pub const GENERIC_API_KEY_ENV: &str = "DEVPILOT_API_KEY";

/// Request/response shape spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Google,
    OpenAI,
    Anthropic,
}

/// How to send the API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHeader {
    /// `x-goog-api-key: <key>`
    GoogApiKey,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    XApiKey,
}

/// Unique identifier for each supported provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    Gemini,
    OpenAI,
    Anthropic,
    OpenRouter,
}

impl ProviderId {
    /// Get all available provider IDs
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Gemini, // Default provider, always first
            ProviderId::OpenAI,
            ProviderId::Anthropic,
            ProviderId::OpenRouter,
        ]
    }

    /// Key used in config files and on the command line
    pub fn storage_key(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenRouter => "openrouter",
        }
    }

    pub fn api_format(&self) -> ApiFormat {
        match self {
            ProviderId::Gemini => ApiFormat::Google,
            ProviderId::OpenAI | ProviderId::OpenRouter => ApiFormat::OpenAI,
            ProviderId::Anthropic => ApiFormat::Anthropic,
        }
    }

    pub fn auth_header(&self) -> AuthHeader {
        match self {
            ProviderId::Gemini => AuthHeader::GoogApiKey,
            ProviderId::OpenAI | ProviderId::OpenRouter => AuthHeader::Bearer,
            ProviderId::Anthropic => AuthHeader::XApiKey,
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            ProviderId::Gemini => GEMINI_API,
            ProviderId::OpenAI => OPENAI_CHAT_API,
            ProviderId::Anthropic => ANTHROPIC_MESSAGES_API,
            ProviderId::OpenRouter => OPENROUTER_CHAT_API,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Gemini => crate::constants::ai::DEFAULT_MODEL,
            ProviderId::OpenAI => "gpt-4o-mini",
            ProviderId::Anthropic => "claude-sonnet-4-5",
            ProviderId::OpenRouter => "google/gemini-2.0-flash-001",
        }
    }

    /// Provider-specific environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "GEMINI_API_KEY",
            ProviderId::OpenAI => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderId::Gemini => "Google Gemini",
            ProviderId::OpenAI => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::OpenRouter => "OpenRouter",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProviderId::all()
            .iter()
            .copied()
            .find(|p| p.storage_key() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = ProviderId::all().iter().map(|p| p.storage_key()).collect();
                format!("unknown provider '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_is_gemini() {
        assert_eq!(ProviderId::default(), ProviderId::Gemini);
        assert_eq!(ProviderId::all()[0], ProviderId::Gemini);
    }

    #[test]
    fn test_parse_provider_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderId>(), Ok(ProviderId::OpenAI));
        assert_eq!(" gemini ".parse::<ProviderId>(), Ok(ProviderId::Gemini));
        let err = "bard".parse::<ProviderId>().unwrap_err();
        assert!(err.contains("openrouter"));
    }

    #[test]
    fn test_openrouter_speaks_openai_format() {
        assert_eq!(ProviderId::OpenRouter.api_format(), ApiFormat::OpenAI);
        assert_eq!(ProviderId::OpenRouter.auth_header(), AuthHeader::Bearer);
        assert_eq!(ProviderId::Anthropic.auth_header(), AuthHeader::XApiKey);
    }

    #[test]
    fn test_serde_uses_storage_key() {
        for provider in ProviderId::all() {
            let json = serde_json::to_string(provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.storage_key()));
        }
    }
}
