//! What a pipeline run produced

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::stage::PipelineStage;
use crate::agents::{AgentOutcome, CodeArtifact, ReviewResult, TestBundle, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// An attempt met the pass threshold
    Passed { attempt: usize },
    /// Every attempt fell short; the best one is still reported
    Exhausted,
    /// The ticket could not be classified
    ClassificationFailed,
}

/// One generate/review cycle
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    /// 1-based
    pub attempt: usize,
    pub generation: AgentOutcome<CodeArtifact>,
    /// `None` when generation failed and review was skipped
    pub review: Option<AgentOutcome<ReviewResult>>,
    /// Review score, or 0.0 when generation or review failed
    pub score: f64,
}

impl AttemptRecord {
    pub fn artifact(&self) -> Option<&CodeArtifact> {
        self.generation.success()
    }

    pub fn review_result(&self) -> Option<&ReviewResult> {
        self.review.as_ref().and_then(AgentOutcome::success)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ticket_text: String,
    pub classification: AgentOutcome<Ticket>,
    /// Language the code was generated in
    pub language: String,
    pub attempts: Vec<AttemptRecord>,
    /// Index into `attempts`
    pub best: Option<usize>,
    /// Present only when an attempt passed and test generation is enabled
    pub tests: Option<AgentOutcome<TestBundle>>,
    pub outcome: RunOutcome,
    pub final_stage: PipelineStage,
}

impl PipelineReport {
    pub fn ticket(&self) -> Option<&Ticket> {
        self.classification.success()
    }

    pub fn best_attempt(&self) -> Option<&AttemptRecord> {
        self.best.and_then(|idx| self.attempts.get(idx))
    }

    pub fn best_artifact(&self) -> Option<&CodeArtifact> {
        self.best_attempt().and_then(AttemptRecord::artifact)
    }

    pub fn best_review(&self) -> Option<&ReviewResult> {
        self.best_attempt().and_then(AttemptRecord::review_result)
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_attempt().map(|a| a.score)
    }

    pub fn test_bundle(&self) -> Option<&TestBundle> {
        self.tests.as_ref().and_then(AgentOutcome::success)
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Passed { .. })
    }
}
