//! Ticket-to-code pipeline
//!
//! `Pipeline` drives the agents through an explicit state machine:
//! classify the ticket, then generate and review up to `max_attempts` times,
//! feeding each review back into the next generation, until an attempt meets
//! the pass threshold. A passing attempt optionally gets unit tests.
//!
//! Every stage change is logged and emitted as a [`PipelineEvent`]; the run
//! ends with a [`PipelineReport`]. Agent failures never abort the run. Only
//! an internal state-machine bug surfaces as [`PipelineError`].

pub mod events;
pub mod report;
pub mod stage;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{AgentFailure, AgentOutcome, Agents};
use crate::constants;
use crate::language;

pub use events::PipelineEvent;
pub use report::{AttemptRecord, PipelineReport, RunOutcome};
pub use stage::PipelineStage;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("illegal stage transition: {from} -> {to}")]
    IllegalTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
}

/// Loop settings owned by the caller
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_attempts: usize,
    /// Minimum review score that ends the loop
    pub pass_threshold: f64,
    pub generate_tests: bool,
    /// Used when the ticket names no language
    pub default_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::pipeline::MAX_ATTEMPTS,
            pass_threshold: constants::pipeline::PASS_THRESHOLD,
            generate_tests: true,
            default_language: constants::pipeline::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    agents: Agents,
    config: PipelineConfig,
}

/// Current stage plus the event sink; all transitions go through `advance`.
struct StageTracker<'a> {
    stage: PipelineStage,
    run_id: Uuid,
    events: &'a mpsc::UnboundedSender<PipelineEvent>,
}

impl StageTracker<'_> {
    fn advance(&mut self, to: PipelineStage) -> Result<(), PipelineError> {
        let from = self.stage;
        if !from.can_transition_to(&to) {
            return Err(PipelineError::IllegalTransition { from, to });
        }
        info!(run_id = %self.run_id, %from, %to, "Pipeline stage changed");
        self.stage = to;
        self.emit(PipelineEvent::StageChanged { from, to });
        Ok(())
    }

    fn emit(&self, event: PipelineEvent) {
        let _ = self.events.send(event);
    }

    fn agent_failed(&self, agent: &str, attempt: Option<usize>, failure: &AgentFailure) {
        self.emit(PipelineEvent::AgentFailed {
            agent: agent.to_string(),
            attempt,
            failure: failure.clone(),
        });
    }
}

impl Pipeline {
    pub fn new(agents: Agents, config: PipelineConfig) -> Self {
        Self { agents, config }
    }

    pub fn agents(&self) -> &Agents {
        &self.agents
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on a spawned task.
    ///
    /// Returns the event receiver and a handle resolving to the report.
    pub fn spawn(
        &self,
        ticket_text: String,
    ) -> (
        mpsc::UnboundedReceiver<PipelineEvent>,
        JoinHandle<Result<PipelineReport, PipelineError>>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let pipeline = self.clone();

        let handle = tokio::spawn(async move { pipeline.run(&ticket_text, &event_tx).await });

        (event_rx, handle)
    }

    /// Run the pipeline to completion, emitting events along the way.
    pub async fn run(
        &self,
        ticket_text: &str,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut tracker = StageTracker {
            stage: PipelineStage::Classifying,
            run_id,
            events,
        };

        info!(%run_id, max_attempts = self.config.max_attempts, "Pipeline run started");
        tracker.emit(PipelineEvent::RunStarted {
            run_id,
            ticket: ticket_text.to_string(),
        });

        let classification = self.agents.classify(ticket_text).await;
        let ticket = match classification.success().cloned() {
            Some(ticket) => ticket,
            None => {
                if let Some(failure) = classification.failure() {
                    tracker.agent_failed("classifier", None, failure);
                }
                tracker.advance(PipelineStage::Failed)?;
                tracker.emit(PipelineEvent::Finished {
                    outcome: RunOutcome::ClassificationFailed,
                    best_score: None,
                });
                return Ok(PipelineReport {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    ticket_text: ticket_text.to_string(),
                    classification,
                    language: self.config.default_language.clone(),
                    attempts: Vec::new(),
                    best: None,
                    tests: None,
                    outcome: RunOutcome::ClassificationFailed,
                    final_stage: tracker.stage,
                });
            }
        };

        let language =
            language::resolve(&ticket.language, &self.config.default_language).to_string();
        tracker.emit(PipelineEvent::Classified {
            ticket: ticket.clone(),
            language: language.clone(),
        });

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(max_attempts);
        let mut best: Option<usize> = None;
        let mut feedback: Option<String> = None;
        let mut passed_attempt = None;

        for attempt in 1..=max_attempts {
            tracker.advance(PipelineStage::Generating { attempt })?;

            let generation = self
                .agents
                .generate(
                    &ticket.summary,
                    ticket.category.as_str(),
                    &language,
                    feedback.as_deref(),
                )
                .await;

            let artifact = match generation.success().cloned() {
                Some(artifact) => {
                    tracker.emit(PipelineEvent::CodeGenerated {
                        attempt,
                        artifact: artifact.clone(),
                    });
                    artifact
                }
                None => {
                    warn!(%run_id, attempt, "Generation failed, attempt consumed");
                    if let Some(failure) = generation.failure() {
                        tracker.agent_failed("generator", Some(attempt), failure);
                    }
                    attempts.push(AttemptRecord {
                        attempt,
                        generation,
                        review: None,
                        score: 0.0,
                    });
                    self.fall_short(&mut tracker, attempt, max_attempts)?;
                    continue;
                }
            };

            tracker.advance(PipelineStage::Reviewing { attempt })?;
            let review = self.agents.review(&artifact.code, &language).await;
            let score = review.success().map(|r| r.score).unwrap_or(0.0);
            let met = review.is_success() && score >= self.config.pass_threshold;

            // First reviewed attempt is best; later ones must beat it strictly.
            // A passing attempt always becomes best.
            let is_best = met || best.map_or(true, |idx| score > attempts[idx].score);
            if is_best {
                best = Some(attempts.len());
            }

            match &review {
                AgentOutcome::Success(result) => {
                    tracker.emit(PipelineEvent::Reviewed {
                        attempt,
                        review: result.clone(),
                        is_best,
                    });
                    feedback = Some(result.body.clone());
                }
                AgentOutcome::Failure(failure) => {
                    tracker.agent_failed("reviewer", Some(attempt), failure);
                }
            }

            attempts.push(AttemptRecord {
                attempt,
                generation,
                review: Some(review),
                score,
            });

            if met {
                info!(%run_id, attempt, score, "Pass threshold met");
                tracker.advance(PipelineStage::ThresholdMet { attempt })?;
                passed_attempt = Some(attempt);
                break;
            }
            self.fall_short(&mut tracker, attempt, max_attempts)?;
        }

        let mut tests = None;
        if passed_attempt.is_some() && self.config.generate_tests {
            tracker.advance(PipelineStage::Testing)?;
            let passed = passed_attempt.and_then(|n| attempts.iter().find(|a| a.attempt == n));
            if let Some(artifact) = passed.and_then(AttemptRecord::artifact) {
                let outcome = self.agents.generate_tests(&artifact.code, &language).await;
                match &outcome {
                    AgentOutcome::Success(bundle) => tracker.emit(PipelineEvent::TestsGenerated {
                        bundle: bundle.clone(),
                    }),
                    AgentOutcome::Failure(failure) => {
                        tracker.agent_failed("test generator", None, failure)
                    }
                }
                tests = Some(outcome);
            }
        }

        tracker.advance(PipelineStage::Done)?;

        let outcome = match passed_attempt {
            Some(attempt) => RunOutcome::Passed { attempt },
            None => RunOutcome::Exhausted,
        };
        let best_score = best.map(|idx| attempts[idx].score);
        info!(%run_id, ?outcome, ?best_score, attempts = attempts.len(), "Pipeline run finished");
        tracker.emit(PipelineEvent::Finished { outcome, best_score });

        Ok(PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            ticket_text: ticket_text.to_string(),
            classification,
            language,
            attempts,
            best,
            tests,
            outcome,
            final_stage: tracker.stage,
        })
    }

    /// Attempt `attempt` missed the threshold: retry, or stop after the last one.
    fn fall_short(
        &self,
        tracker: &mut StageTracker<'_>,
        attempt: usize,
        max_attempts: usize,
    ) -> Result<(), PipelineError> {
        if attempt < max_attempts {
            tracker.advance(PipelineStage::Retry { attempt })
        } else {
            warn!(run_id = %tracker.run_id, "All {} attempts fell short", max_attempts);
            tracker.advance(PipelineStage::Exhausted)
        }
    }
}
