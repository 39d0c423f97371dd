//! User configuration
//!
//! Loaded from `~/.devpilot/config.toml` (or an explicit path). Every field
//! has a default, so a missing file or a missing section is not an error.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::agents::AgentSettings;
use crate::ai::{AiClientConfig, ProviderId};
use crate::constants;
use crate::paths;
use crate::pipeline::PipelineConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevPilotConfig {
    pub model: ModelSettings,
    pub pipeline: PipelineSettings,
}

/// `[model]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: ProviderId,
    /// Model ID; the provider's default when unset
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ProviderId::default(),
            model: None,
            temperature: constants::ai::DEFAULT_TEMPERATURE,
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            timeout_secs: constants::ai::DEFAULT_TIMEOUT_SECS,
            base_url: None,
        }
    }
}

/// `[pipeline]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub max_attempts: usize,
    pub pass_threshold: f64,
    pub readiness_threshold: f64,
    pub generate_tests: bool,
    /// Used when the ticket names no language
    pub default_language: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_attempts: constants::pipeline::MAX_ATTEMPTS,
            pass_threshold: constants::pipeline::PASS_THRESHOLD,
            readiness_threshold: constants::pipeline::READINESS_THRESHOLD,
            generate_tests: true,
            default_language: constants::pipeline::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl DevPilotConfig {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `~/.devpilot/config.toml`
    pub fn load_default() -> Result<Self> {
        Self::load(&paths::config_path())
    }

    /// Check ranges. Call again after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_attempts == 0 {
            anyhow::bail!("pipeline.max_attempts must be at least 1");
        }
        let max = constants::pipeline::MAX_SCORE;
        for (name, value) in [
            ("pipeline.pass_threshold", self.pipeline.pass_threshold),
            ("pipeline.readiness_threshold", self.pipeline.readiness_threshold),
        ] {
            if !(0.0..=max).contains(&value) {
                anyhow::bail!("{} must be between 0 and {}, got {}", name, max, value);
            }
        }
        Ok(())
    }

    pub fn client_config(&self) -> AiClientConfig {
        let base = AiClientConfig::for_provider(self.model.provider);
        AiClientConfig {
            model: self.model.model.clone().unwrap_or(base.model),
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
            base_url: self.model.base_url.clone(),
            provider_id: self.model.provider,
        }
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            timeout: Duration::from_secs(self.model.timeout_secs),
            readiness_threshold: self.pipeline.readiness_threshold,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_attempts: self.pipeline.max_attempts,
            pass_threshold: self.pipeline.pass_threshold,
            generate_tests: self.pipeline.generate_tests,
            default_language: self.pipeline.default_language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = DevPilotConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, DevPilotConfig::default());
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.pipeline.pass_threshold, 7.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nprovider = \"anthropic\"\ntimeout_secs = 5\n").unwrap();

        let config = DevPilotConfig::load(&path).unwrap();
        assert_eq!(config.model.provider, ProviderId::Anthropic);
        assert_eq!(config.model.timeout_secs, 5);
        assert_eq!(config.pipeline, PipelineSettings::default());

        let client = config.client_config();
        assert_eq!(client.model, ProviderId::Anthropic.default_model());
        assert_eq!(config.agent_settings().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_pipeline_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[pipeline]\nmax_attempts = 5\npass_threshold = 6.5\ngenerate_tests = false\n",
        )
        .unwrap();

        let pipeline = DevPilotConfig::load(&path).unwrap().pipeline_config();
        assert_eq!(pipeline.max_attempts, 5);
        assert_eq!(pipeline.pass_threshold, 6.5);
        assert!(!pipeline.generate_tests);
        assert_eq!(pipeline.default_language, "Python");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[pipeline]\nmax_attempts = 0\n").unwrap();
        assert!(DevPilotConfig::load(&path).is_err());

        std::fs::write(&path, "[pipeline]\npass_threshold = 11.0\n").unwrap();
        assert!(DevPilotConfig::load(&path).is_err());

        std::fs::write(&path, "not toml [").unwrap();
        let err = DevPilotConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
