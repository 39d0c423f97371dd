//! Terminal output
//!
//! Human-readable text by default; with `--json`, one JSON object per line
//! (pipeline events as they happen, then the final report).

use serde::Serialize;

use devpilot_core::agents::{AgentFailure, ReviewResult, TestBundle, Ticket};
use devpilot_core::pipeline::{PipelineEvent, PipelineReport, PipelineStage, RunOutcome};

const RULE: &str = "────────────────────────────────────────";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn event(&self, event: &PipelineEvent) {
        if self.json {
            self.json_line(event);
            return;
        }

        match event {
            PipelineEvent::RunStarted { run_id, .. } => println!("▶ DevPilot run {}", run_id),
            PipelineEvent::StageChanged { to, .. } => match to {
                PipelineStage::Generating { attempt } => {
                    println!("\n⚙ Attempt {}: generating code", attempt)
                }
                PipelineStage::Reviewing { attempt } => {
                    println!("🔍 Attempt {}: reviewing", attempt)
                }
                PipelineStage::Retry { attempt } => {
                    println!("↻ Attempt {} fell short, retrying with review feedback", attempt)
                }
                PipelineStage::Exhausted => {
                    println!("\n✗ Attempts exhausted, keeping the best one")
                }
                PipelineStage::Testing => println!("\n🧪 Generating unit tests"),
                PipelineStage::Failed => println!("✗ Run failed"),
                _ => {}
            },
            PipelineEvent::Classified { ticket, language } => {
                self.ticket(ticket);
                if language != &ticket.language {
                    println!("  (generating in {})", language);
                }
            }
            PipelineEvent::CodeGenerated { artifact, .. } => {
                println!("  {} ({} lines)", artifact.filename, artifact.code.lines().count());
            }
            PipelineEvent::Reviewed { review, is_best, .. } => {
                let marker = if *is_best { " ★ best so far" } else { "" };
                println!("  Score: {:.1}/10{}", review.score, marker);
            }
            PipelineEvent::TestsGenerated { bundle } => {
                println!("  Framework: {}", bundle.framework)
            }
            PipelineEvent::AgentFailed { agent, failure, .. } => self.failure(agent, failure),
            PipelineEvent::Finished { .. } => {}
        }
    }

    pub fn report(&self, report: &PipelineReport) {
        if self.json {
            self.json_line(report);
            return;
        }

        println!("\n{}", RULE);
        match report.outcome {
            RunOutcome::Passed { attempt } => println!("✓ Passed on attempt {}", attempt),
            RunOutcome::Exhausted => println!("✗ No attempt met the pass threshold"),
            RunOutcome::ClassificationFailed => {
                println!("✗ The ticket could not be classified");
                return;
            }
        }

        let Some(best) = report.best_attempt() else {
            println!("No attempt produced code.");
            return;
        };
        if let Some(artifact) = best.artifact() {
            section(&format!("{} (attempt {})", artifact.filename, best.attempt), &artifact.code);
            if !artifact.explanation.is_empty() {
                section("Explanation", &artifact.explanation);
            }
        }
        if let Some(review) = best.review_result() {
            self.review(review);
        }
        if let Some(bundle) = report.test_bundle() {
            self.tests(bundle);
        }
    }

    pub fn ticket(&self, ticket: &Ticket) {
        if self.json {
            self.json_line(ticket);
            return;
        }
        println!("Category: {}", ticket.category);
        println!("Urgency:  {}", ticket.urgency);
        println!("Language: {}", ticket.language);
        println!("Summary:  {}", ticket.summary);
    }

    pub fn review(&self, review: &ReviewResult) {
        if self.json {
            self.json_line(review);
            return;
        }
        section("Review", &review.body);
        println!(
            "Score: {:.1}/10    Ready for deployment: {}",
            review.score, review.readiness
        );
    }

    pub fn tests(&self, bundle: &TestBundle) {
        if self.json {
            self.json_line(bundle);
            return;
        }
        section(&format!("Tests ({})", bundle.framework), &bundle.test_code);
        if !bundle.explanation.is_empty() {
            println!("{}", bundle.explanation);
        }
    }

    /// Free text such as improved code or an explanation
    pub fn text(&self, title: &str, body: &str) {
        if self.json {
            self.json_line(&serde_json::json!({ "title": title, "body": body }));
            return;
        }
        section(title, body);
    }

    pub fn failure(&self, agent: &str, failure: &AgentFailure) {
        if self.json {
            self.json_line(&serde_json::json!({ "agent": agent, "failure": failure }));
            return;
        }
        eprintln!("  ⚠ {} {}", agent, failure);
        if !failure.raw.is_empty() {
            eprintln!("  Raw reply:\n{}", indent(&failure.raw));
        }
    }

    fn json_line<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize output: {}", e),
        }
    }
}

fn section(title: &str, body: &str) {
    println!("\n── {} ──", title);
    println!("{}", body);
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
