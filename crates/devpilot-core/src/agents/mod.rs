//! Prompt-response agents
//!
//! Each agent renders one prompt template, makes one completion call, and
//! parses the free-form reply into a typed result:
//!
//! - `classify` - ticket text → [`Ticket`]
//! - `generate` - summary/category/language (+ review feedback) → [`CodeArtifact`]
//! - `review` - code → [`ReviewResult`] (score + readiness)
//! - `generate_tests` - code → [`TestBundle`]
//! - `improve` - code + feedback → improved code
//! - `explain` - code → explanation
//!
//! Agents never return errors. Transport problems, timeouts, and replies that
//! don't follow the requested format all come back as
//! [`AgentOutcome::Failure`] carrying the raw reply for the operator.

pub mod developer;
pub mod explainer;
pub mod improver;
pub mod prompts;
pub mod reviewer;
pub mod sections;
pub mod tester;
pub mod ticket;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::ai::{CompletionError, CompletionModel};
use crate::constants;

pub use developer::CodeArtifact;
pub use reviewer::{Readiness, ReadinessSource, ReviewResult, ScoreSource};
pub use tester::TestBundle;
pub use ticket::{Category, Ticket, Urgency};

/// Why an agent invocation produced no usable result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The completion call did not complete
    Transport,
    /// The completion call exceeded the configured timeout
    Timeout,
    /// The reply lacked the structure the prompt asked for
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Parse => write!(f, "parse"),
        }
    }
}

/// A failed agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind} failure: {detail}")]
pub struct AgentFailure {
    pub kind: FailureKind,
    pub detail: String,
    /// The model's reply exactly as received (empty when nothing came back)
    pub raw: String,
}

impl AgentFailure {
    pub fn parse(detail: impl Into<String>, raw: &str) -> Self {
        Self {
            kind: FailureKind::Parse,
            detail: detail.into(),
            raw: raw.to_string(),
        }
    }

    fn from_completion(err: CompletionError) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Transport
        };
        Self {
            kind,
            detail: err.to_string(),
            raw: String::new(),
        }
    }
}

/// Result of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AgentOutcome<T> {
    Success(T),
    Failure(AgentFailure),
}

impl<T> AgentOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AgentOutcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            AgentOutcome::Success(value) => Some(value),
            AgentOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AgentFailure> {
        match self {
            AgentOutcome::Success(_) => None,
            AgentOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, AgentFailure> {
        match self {
            AgentOutcome::Success(value) => Ok(value),
            AgentOutcome::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, AgentFailure>> for AgentOutcome<T> {
    fn from(result: Result<T, AgentFailure>) -> Self {
        match result {
            Ok(value) => AgentOutcome::Success(value),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }
}

/// Settings shared by every agent
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Upper bound on a single completion call
    pub timeout: Duration,
    /// Reviewer-owned threshold for inferring readiness from a bare score
    pub readiness_threshold: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(constants::ai::DEFAULT_TIMEOUT_SECS),
            readiness_threshold: constants::pipeline::READINESS_THRESHOLD,
        }
    }
}

/// The six agents, sharing one injected completion model.
#[derive(Clone)]
pub struct Agents {
    model: Arc<dyn CompletionModel>,
    settings: AgentSettings,
}

impl Agents {
    pub fn new(model: Arc<dyn CompletionModel>, settings: AgentSettings) -> Self {
        Self { model, settings }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub async fn classify(&self, ticket_text: &str) -> AgentOutcome<Ticket> {
        let prompt = ticket::prompt(ticket_text);
        match self.call_model("classifier", prompt).await {
            Ok(reply) => ticket::parse(ticket_text, &reply).into(),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    pub async fn generate(
        &self,
        summary: &str,
        category: &str,
        language: &str,
        feedback: Option<&str>,
    ) -> AgentOutcome<CodeArtifact> {
        let prompt = developer::prompt(summary, category, language, feedback);
        match self.call_model("generator", prompt).await {
            Ok(reply) => developer::parse(&reply, language).into(),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    pub async fn review(&self, code: &str, language: &str) -> AgentOutcome<ReviewResult> {
        let prompt = reviewer::prompt(code, language);
        match self.call_model("reviewer", prompt).await {
            Ok(reply) => {
                AgentOutcome::Success(reviewer::parse(&reply, self.settings.readiness_threshold))
            }
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    pub async fn generate_tests(&self, code: &str, language: &str) -> AgentOutcome<TestBundle> {
        let prompt = tester::prompt(code, language);
        match self.call_model("test generator", prompt).await {
            Ok(reply) => tester::parse(&reply).into(),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    pub async fn improve(
        &self,
        code: &str,
        feedback: &str,
        language: &str,
    ) -> AgentOutcome<String> {
        let prompt = improver::prompt(code, feedback, language);
        match self.call_model("improver", prompt).await {
            Ok(reply) => AgentOutcome::Success(improver::clean(&reply)),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    pub async fn explain(&self, code: &str, language: &str) -> AgentOutcome<String> {
        let prompt = explainer::prompt(code, language);
        match self.call_model("explainer", prompt).await {
            Ok(reply) => AgentOutcome::Success(reply.trim().to_string()),
            Err(failure) => AgentOutcome::Failure(failure),
        }
    }

    /// One completion call under the configured timeout
    async fn call_model(
        &self,
        agent: &'static str,
        prompt: String,
    ) -> Result<String, AgentFailure> {
        info!(agent, model = self.model.model_name(), "Invoking agent");

        let result =
            tokio::time::timeout(self.settings.timeout, self.model.complete(&prompt)).await;
        let failure = match result {
            Ok(Ok(reply)) => return Ok(reply),
            Ok(Err(err)) => AgentFailure::from_completion(err),
            Err(_) => {
                AgentFailure::from_completion(CompletionError::Timeout(self.settings.timeout))
            }
        };

        warn!(agent, kind = %failure.kind, "Agent call failed: {}", failure.detail);
        Err(failure)
    }
}
