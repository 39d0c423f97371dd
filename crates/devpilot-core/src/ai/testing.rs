//! Scripted completion model for tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionError, CompletionModel};

/// One scripted reply
pub(crate) enum Reply {
    Text(String),
    /// Transport failure with an HTTP status
    Fail(u16),
    /// Reply after sleeping, for timeout tests
    Slow(Duration, String),
}

/// Returns scripted replies in order and records every prompt it receives.
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Reply::Text(t.into())).collect())
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(status)) => Err(CompletionError::Api {
                status,
                message: "scripted failure".into(),
            }),
            Some(Reply::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(CompletionError::InvalidResponse(
                "scripted model has no replies left".into(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Well-formed generator reply
pub(crate) fn code_reply(filename: &str, code: &str) -> String {
    format!(
        "---FILENAME---\n{}\n---CODE---\n{}\n---EXPLANATION---\nDoes the thing.",
        filename, code
    )
}

/// Reviewer reply with an explicit score and no readiness line
pub(crate) fn review_reply(score: f64) -> String {
    format!("Review:\nLooks reasonable, add input validation.\nScore: {}/10", score)
}

pub(crate) fn ticket_reply() -> String {
    "Category: Feature\nUrgency: Medium\nLanguage: Python\nSummary: Add a search bar to filter products by name."
        .to_string()
}

pub(crate) fn tests_reply() -> String {
    "---FRAMEWORK---\npytest\n---TEST CODE---\ndef test_search():\n    assert search([], 'a') == []\n---EXPLANATION---\nCovers the empty case."
        .to_string()
}
