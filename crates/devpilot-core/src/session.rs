//! Interactive session state
//!
//! `DevSession` is what a front-end holds between user actions: the last
//! pipeline report plus the code the user is working on. The working code
//! starts as the run's best artifact and can be replaced by hand; follow-up
//! actions (re-review, improve, explain, export) operate on it.

use tokio::sync::mpsc;
use tracing::info;

use crate::agents::{AgentOutcome, ReviewResult};
use crate::export::{self, ExportBundle, ExportError};
use crate::pipeline::{Pipeline, PipelineError, PipelineEvent, PipelineReport};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no code to work on yet: run a ticket or provide code first")]
    NoCode,

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone)]
struct WorkingCode {
    code: String,
    filename: String,
    language: String,
}

pub struct DevSession {
    pipeline: Pipeline,
    report: Option<PipelineReport>,
    working: Option<WorkingCode>,
    review: Option<ReviewResult>,
    improved_code: Option<String>,
    explanation: Option<String>,
}

impl DevSession {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            report: None,
            working: None,
            review: None,
            improved_code: None,
            explanation: None,
        }
    }

    /// Run the pipeline on `ticket` and replace all session state with its
    /// results.
    pub async fn run(
        &mut self,
        ticket: &str,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> Result<&PipelineReport, SessionError> {
        let report = self.pipeline.run(ticket, events).await?;

        self.working = report.best_artifact().map(|artifact| WorkingCode {
            code: artifact.code.clone(),
            filename: artifact.filename.clone(),
            language: report.language.clone(),
        });
        self.review = report.best_review().cloned();
        self.improved_code = None;
        self.explanation = None;

        Ok(self.report.insert(report))
    }

    /// Replace the working code. Clears everything derived from the old code.
    pub fn edit_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        match &mut self.working {
            Some(working) => working.code = code,
            None => {
                // No run yet, so name the file after the default language
                let language = self.pipeline.config().default_language.clone();
                self.working = Some(WorkingCode {
                    code,
                    filename: default_filename(&language),
                    language,
                });
            }
        }
        self.review = None;
        self.improved_code = None;
        self.explanation = None;
    }

    /// Start from existing code instead of a pipeline run
    pub fn load_code(
        &mut self,
        code: impl Into<String>,
        filename: impl Into<String>,
        language: impl Into<String>,
    ) {
        self.report = None;
        self.working = Some(WorkingCode {
            code: code.into(),
            filename: filename.into(),
            language: language.into(),
        });
        self.review = None;
        self.improved_code = None;
        self.explanation = None;
    }

    /// Review the working code. A successful review becomes the latest review.
    pub async fn rereview(&mut self) -> Result<AgentOutcome<ReviewResult>, SessionError> {
        let working = self.working.as_ref().ok_or(SessionError::NoCode)?;
        let outcome = self
            .pipeline
            .agents()
            .review(&working.code, &working.language)
            .await;
        if let Some(review) = outcome.success() {
            info!(score = review.score, "Working code re-reviewed");
            self.review = Some(review.clone());
        }
        Ok(outcome)
    }

    /// Improve the working code. Blank `feedback` falls back to the latest
    /// review body.
    pub async fn improve(&mut self, feedback: &str) -> Result<AgentOutcome<String>, SessionError> {
        let working = self.working.as_ref().ok_or(SessionError::NoCode)?;
        let feedback = if feedback.trim().is_empty() {
            self.review.as_ref().map(|r| r.body.as_str()).unwrap_or_default()
        } else {
            feedback
        };

        let outcome = self
            .pipeline
            .agents()
            .improve(&working.code, feedback, &working.language)
            .await;
        if let Some(improved) = outcome.success() {
            self.improved_code = Some(improved.clone());
        }
        Ok(outcome)
    }

    pub async fn explain(&mut self) -> Result<AgentOutcome<String>, SessionError> {
        let working = self.working.as_ref().ok_or(SessionError::NoCode)?;
        let outcome = self
            .pipeline
            .agents()
            .explain(&working.code, &working.language)
            .await;
        if let Some(explanation) = outcome.success() {
            self.explanation = Some(explanation.clone());
        }
        Ok(outcome)
    }

    /// Package working code, the run's tests, the latest review, and any
    /// improved code.
    pub fn export(&self) -> Result<Vec<u8>, SessionError> {
        let bundle = self.bundle()?;
        Ok(export::export(&bundle)?)
    }

    pub fn bundle(&self) -> Result<ExportBundle<'_>, SessionError> {
        let working = self.working.as_ref().ok_or(SessionError::NoCode)?;
        Ok(ExportBundle {
            code: &working.code,
            filename: &working.filename,
            language: &working.language,
            test_code: self
                .report
                .as_ref()
                .and_then(PipelineReport::test_bundle)
                .map(|bundle| bundle.test_code.as_str()),
            review: self.review.as_ref().map(|r| r.body.as_str()),
            improved_code: self.improved_code.as_deref(),
        })
    }

    pub fn report(&self) -> Option<&PipelineReport> {
        self.report.as_ref()
    }

    pub fn working_code(&self) -> Option<&str> {
        self.working.as_ref().map(|w| w.code.as_str())
    }

    pub fn review(&self) -> Option<&ReviewResult> {
        self.review.as_ref()
    }

    pub fn improved_code(&self) -> Option<&str> {
        self.improved_code.as_deref()
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }
}

fn default_filename(language: &str) -> String {
    let ext = crate::language::extension_for(language)
        .unwrap_or(crate::constants::export::FALLBACK_EXTENSION);
    format!("main{}", ext)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::{AgentSettings, Agents};
    use crate::ai::testing::{code_reply, review_reply, tests_reply, ticket_reply, ScriptedModel};
    use crate::pipeline::PipelineConfig;

    fn session(model: ScriptedModel) -> (DevSession, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let agents = Agents::new(model.clone(), AgentSettings::default());
        let pipeline = Pipeline::new(agents, PipelineConfig::default());
        (DevSession::new(pipeline), model)
    }

    #[tokio::test]
    async fn test_actions_before_code_fail() {
        let (mut session, model) = session(ScriptedModel::texts(Vec::<String>::new()));
        assert!(matches!(session.rereview().await, Err(SessionError::NoCode)));
        assert!(matches!(session.improve("x").await, Err(SessionError::NoCode)));
        assert!(matches!(session.explain().await, Err(SessionError::NoCode)));
        assert!(matches!(session.export(), Err(SessionError::NoCode)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_then_edit_then_export() {
        let (mut session, _) = session(ScriptedModel::texts([
            ticket_reply(),
            code_reply("search.py", "def search(): pass"),
            review_reply(8.0),
            tests_reply(),
        ]));
        let (tx, _rx) = mpsc::unbounded_channel();
        let report = session.run("Add a search bar", &tx).await.unwrap();
        assert!(report.passed());
        assert_eq!(session.working_code(), Some("def search(): pass"));
        assert!(session.review().is_some());

        session.edit_code("def search(q): return q");
        assert!(session.review().is_none());

        let names = export::entry_names(&session.bundle().unwrap()).unwrap();
        assert_eq!(names, vec!["search.py", "search_test.py"]);
        assert!(!session.export().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_improve_falls_back_to_review_body() {
        let (mut session, model) = session(ScriptedModel::texts([
            "Review:\nRename the variable.\nScore: 5/10".to_string(),
            "```python\nvalue = 1\n```".to_string(),
        ]));
        session.load_code("x = 1", "a.py", "Python");

        let review = session.rereview().await.unwrap();
        assert_eq!(review.success().unwrap().score, 5.0);

        let improved = session.improve("  ").await.unwrap();
        assert_eq!(improved.success().unwrap(), "value = 1");
        assert!(model.prompts()[1].contains("Rename the variable."));
        assert_eq!(session.improved_code(), Some("value = 1"));

        let names = export::entry_names(&session.bundle().unwrap()).unwrap();
        assert_eq!(names, vec!["a.py", "a_improved.py", "review.txt"]);
    }

    #[tokio::test]
    async fn test_explain_keeps_result() {
        let (mut session, _) = session(ScriptedModel::texts(["Assigns one to x."]));
        session.edit_code("x = 1");
        let outcome = session.explain().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(session.explanation(), Some("Assigns one to x."));
        assert_eq!(session.bundle().unwrap().filename, "main.py");
    }
}
