//! Unit test generator

use std::sync::LazyLock;

use serde::Serialize;

use super::prompts::{render, TEST_PROMPT};
use super::sections::SectionGrammar;
use super::AgentFailure;

static GRAMMAR: LazyLock<SectionGrammar> = LazyLock::new(|| {
    SectionGrammar::new(&[
        ("framework", "---FRAMEWORK---"),
        ("test_code", "---TEST CODE---"),
        ("explanation", "---EXPLANATION---"),
    ])
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestBundle {
    pub framework: String,
    pub test_code: String,
    pub explanation: String,
}

pub fn prompt(code: &str, language: &str) -> String {
    render(TEST_PROMPT, &[("code", code), ("language", language)])
}

pub fn parse(reply: &str) -> Result<TestBundle, AgentFailure> {
    let sections = GRAMMAR.parse(reply).ok_or_else(|| {
        AgentFailure::parse(format!("expected sections {}", GRAMMAR.describe()), reply)
    })?;

    let test_code = sections.get("test_code");
    if test_code.is_empty() {
        return Err(AgentFailure::parse("empty test code section", reply));
    }

    Ok(TestBundle {
        framework: sections.get("framework").to_string(),
        test_code: test_code.to_string(),
        explanation: sections.get("explanation").to_string(),
    })
}
