//! Event protocol for a pipeline run.
//!
//! The pipeline emits `PipelineEvent`s over an unbounded channel as it goes.
//! Front-ends (the CLI renderer, JSON output) map them to their own
//! presentation.

use serde::Serialize;
use uuid::Uuid;

use super::report::RunOutcome;
use super::stage::PipelineStage;
use crate::agents::{AgentFailure, CodeArtifact, ReviewResult, TestBundle, Ticket};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    // ── Run lifecycle ──────────────────────────────────────────────────
    /// A run began.
    RunStarted { run_id: Uuid, ticket: String },

    /// The state machine moved.
    StageChanged {
        from: PipelineStage,
        to: PipelineStage,
    },

    // ── Agent outputs ──────────────────────────────────────────────────
    /// The ticket was classified.
    Classified { ticket: Ticket, language: String },

    /// An attempt produced code.
    CodeGenerated {
        attempt: usize,
        artifact: CodeArtifact,
    },

    /// An attempt's code was reviewed.
    Reviewed {
        attempt: usize,
        review: ReviewResult,
        /// Whether this attempt is now the best one
        is_best: bool,
    },

    /// Tests were generated for the passing artifact.
    TestsGenerated { bundle: TestBundle },

    /// An agent call failed. `attempt` is `None` outside the retry loop.
    AgentFailed {
        agent: String,
        attempt: Option<usize>,
        failure: AgentFailure,
    },

    /// The run ended.
    Finished {
        outcome: RunOutcome,
        best_score: Option<f64>,
    },
}
