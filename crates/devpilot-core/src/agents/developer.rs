//! Code generator

use std::sync::LazyLock;

use serde::Serialize;

use super::prompts::{render, DEV_FEEDBACK_SECTION, DEV_PROMPT};
use super::sections::SectionGrammar;
use super::AgentFailure;

static GRAMMAR: LazyLock<SectionGrammar> = LazyLock::new(|| {
    SectionGrammar::new(&[
        ("filename", "---FILENAME---"),
        ("code", "---CODE---"),
        ("explanation", "---EXPLANATION---"),
    ])
    .unwrap()
});

/// One generated code file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeArtifact {
    pub filename: String,
    pub code: String,
    pub explanation: String,
    pub language: String,
}

pub fn prompt(summary: &str, category: &str, language: &str, feedback: Option<&str>) -> String {
    let feedback_section = match feedback.map(str::trim) {
        Some(feedback) if !feedback.is_empty() => {
            render(DEV_FEEDBACK_SECTION, &[("feedback", feedback)])
        }
        _ => String::new(),
    };

    render(
        DEV_PROMPT,
        &[
            ("summary", summary),
            ("category", category),
            ("language", language),
            ("feedback_section", &feedback_section),
        ],
    )
}

pub fn parse(reply: &str, language: &str) -> Result<CodeArtifact, AgentFailure> {
    let Some(sections) = GRAMMAR.parse(reply) else {
        return Err(AgentFailure::parse(
            format!("expected sections {}", GRAMMAR.describe()),
            reply,
        ));
    };

    // Models sometimes wrap the filename in backticks
    let filename = sections.get("filename").trim_matches('`').trim();
    let code = sections.get("code");
    if filename.is_empty() {
        return Err(AgentFailure::parse("empty filename", reply));
    }
    if code.is_empty() {
        return Err(AgentFailure::parse("empty code section", reply));
    }

    Ok(CodeArtifact {
        filename: filename.to_string(),
        code: code.to_string(),
        explanation: sections.get("explanation").to_string(),
        language: language.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = "Here it is.\n---FILENAME---\nsearch.py\n---CODE---\ndef search(items, q):\n    return [i for i in items if q in i]\n---EXPLANATION---\nFilters by substring.";
        let artifact = parse(reply, "Python").unwrap();
        assert_eq!(artifact.filename, "search.py");
        assert!(artifact.code.starts_with("def search"));
        assert_eq!(artifact.explanation, "Filters by substring.");
        assert_eq!(artifact.language, "Python");
    }

    #[test]
    fn test_missing_explanation_marker_fails() {
        let reply = "---FILENAME---\na.py\n---CODE---\nprint(1)";
        let failure = parse(reply, "Python").unwrap_err();
        assert!(failure.detail.contains("---EXPLANATION---"));
        assert_eq!(failure.raw, reply);
    }

    #[test]
    fn test_empty_filename_or_code_fails() {
        let no_name = "---FILENAME---\n\n---CODE---\nprint(1)\n---EXPLANATION---\nx";
        assert_eq!(parse(no_name, "Python").unwrap_err().detail, "empty filename");

        let no_code = "---FILENAME---\na.py\n---CODE---\n  \n---EXPLANATION---\nx";
        assert_eq!(parse(no_code, "Python").unwrap_err().detail, "empty code section");
    }

    #[test]
    fn test_prompt_feedback_section() {
        let without = prompt("Add search", "Feature", "Python", None);
        assert!(!without.contains("---PREVIOUS REVIEW---"));

        let blank = prompt("Add search", "Feature", "Python", Some("   "));
        assert!(!blank.contains("---PREVIOUS REVIEW---"));

        let with = prompt("Add search", "Feature", "Python", Some("Validate the query"));
        assert!(with.contains("---PREVIOUS REVIEW---"));
        assert!(with.contains("Validate the query"));
        assert!(with.contains("Add search"));
    }
}
