//! Ticket classifier
//!
//! Reads `Key: value` lines for category, urgency, language, and summary.
//! Keys are matched case-insensitively and may carry markdown emphasis
//! (`**Category:** Bug`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::prompts::{render, TICKET_PROMPT};
use super::AgentFailure;
use crate::constants::pipeline::UNKNOWN_LANGUAGE;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t>*#-]*(?P<key>category|urgency|language|summary)[* \t]*:[* \t]*(?P<value>.*?)[* \t]*$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Bug,
    Feature,
    Documentation,
    Enhancement,
}

impl Category {
    /// Parse the model's category word. Returns `None` outside the fixed set.
    pub fn parse(value: &str) -> Option<Self> {
        let word = value
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .to_ascii_lowercase();
        if word.starts_with("bug") {
            Some(Category::Bug)
        } else if word.starts_with("feature") {
            Some(Category::Feature)
        } else if word.starts_with("doc") {
            Some(Category::Documentation)
        } else if word.starts_with("enhancement") || word.starts_with("improvement") {
            Some(Category::Enhancement)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "Bug",
            Category::Feature => "Feature",
            Category::Documentation => "Documentation",
            Category::Enhancement => "Enhancement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown,
}

impl Urgency {
    pub fn parse(value: &str) -> Self {
        let word = value
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .to_ascii_lowercase();
        match word.as_str() {
            "low" => Urgency::Low,
            "medium" | "moderate" => Urgency::Medium,
            "high" => Urgency::High,
            "critical" | "urgent" => Urgency::Critical,
            _ => Urgency::Unknown,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
            Urgency::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A classified ticket. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    /// The ticket as the user wrote it
    pub text: String,
    pub category: Category,
    pub urgency: Urgency,
    /// Language named by the ticket, or "Unknown"
    pub language: String,
    pub summary: String,
}

pub fn prompt(ticket_text: &str) -> String {
    render(TICKET_PROMPT, &[("ticket_text", ticket_text)])
}

pub fn parse(ticket_text: &str, reply: &str) -> Result<Ticket, AgentFailure> {
    let mut category = None;
    let mut urgency = None;
    let mut language = None;
    let mut summary = None;

    for caps in FIELD_RE.captures_iter(reply) {
        let value = caps.name("value").map_or("", |m| m.as_str()).trim();
        if value.is_empty() {
            continue;
        }
        let slot = match caps["key"].to_ascii_lowercase().as_str() {
            "category" => &mut category,
            "urgency" => &mut urgency,
            "language" => &mut language,
            _ => &mut summary,
        };
        // First occurrence wins
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    let Some(category_value) = category else {
        return Err(AgentFailure::parse("reply has no Category line", reply));
    };
    let Some(category) = Category::parse(category_value) else {
        return Err(AgentFailure::parse(
            format!("unrecognized category '{}'", category_value),
            reply,
        ));
    };
    let Some(summary) = summary else {
        return Err(AgentFailure::parse("reply has no Summary line", reply));
    };

    Ok(Ticket {
        text: ticket_text.to_string(),
        category,
        urgency: urgency.map(Urgency::parse).unwrap_or_default(),
        language: language.unwrap_or(UNKNOWN_LANGUAGE).to_string(),
        summary: summary.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::FailureKind;

    #[test]
    fn test_parse_plain_reply() {
        let reply = "Category: Bug\nUrgency: High\nLanguage: Python\nSummary: App crashes on large PNG uploads.";
        let ticket = parse("crash", reply).unwrap();
        assert_eq!(ticket.category, Category::Bug);
        assert_eq!(ticket.urgency, Urgency::High);
        assert_eq!(ticket.language, "Python");
        assert_eq!(ticket.summary, "App crashes on large PNG uploads.");
        assert_eq!(ticket.text, "crash");
    }

    #[test]
    fn test_parse_markdown_and_case() {
        let reply = "Here you go:\n**category:** feature\n**URGENCY**: low\n- Summary: Add a search bar.\n";
        let ticket = parse("t", reply).unwrap();
        assert_eq!(ticket.category, Category::Feature);
        assert_eq!(ticket.urgency, Urgency::Low);
        assert_eq!(ticket.summary, "Add a search bar.");
        assert_eq!(ticket.language, "Unknown");
    }

    #[test]
    fn test_unknown_urgency_is_lenient() {
        let reply = "Category: Enhancement\nUrgency: soonish\nSummary: Faster export.";
        let ticket = parse("t", reply).unwrap();
        assert_eq!(ticket.urgency, Urgency::Unknown);
        assert_eq!(ticket.category, Category::Enhancement);
    }

    #[test]
    fn test_missing_summary_fails_with_raw() {
        let reply = "Category: Bug\nUrgency: High";
        let failure = parse("t", reply).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Parse);
        assert_eq!(failure.raw, reply);
        assert!(failure.detail.contains("Summary"));
    }

    #[test]
    fn test_category_outside_fixed_set_fails() {
        let failure = parse("t", "Category: Question\nSummary: Why?").unwrap_err();
        assert!(failure.detail.contains("Question"));
    }

    #[test]
    fn test_prompt_embeds_ticket() {
        assert!(prompt("Login page doesn't redirect").contains("Login page doesn't redirect"));
    }
}
