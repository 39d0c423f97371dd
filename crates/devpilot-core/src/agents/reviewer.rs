//! Code reviewer
//!
//! The reply is free text with two machine-readable lines:
//!
//! ```text
//! Score: 7.5/10
//! Ready for deployment: Yes
//! ```
//!
//! A missing or unparseable score becomes 0.0 ([`ScoreSource::Defaulted`]).
//! A missing readiness line is inferred from the score.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::prompts::{render, REVIEW_PROMPT};
use crate::constants::pipeline::MAX_SCORE;

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t>*#-]*score[* \t]*:[* \t]*(?P<score>-?\d+(?:\.\d+)?)(?:[ \t]*/[ \t]*(?P<out_of>\d+(?:\.\d+)?))?",
    )
    .unwrap()
});

static READY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t>*#-]*ready for deployment[* \t]*:[* \t]*(?P<ready>yes|no)\b").unwrap()
});

static SCORE_OR_READY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t>*#-]*(score|ready)\b").unwrap());

static REVIEW_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t>*#-]*review[* \t]*:[* \t]*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Readiness {
    Yes,
    No,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Yes => write!(f, "Yes"),
            Readiness::No => write!(f, "No"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Parsed,
    /// The reply had no usable score line
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessSource {
    Explicit,
    /// Derived from the score against the readiness threshold
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewResult {
    pub body: String,
    /// Always within 0.0..=10.0
    pub score: f64,
    pub score_source: ScoreSource,
    pub readiness: Readiness,
    pub readiness_source: ReadinessSource,
}

pub fn prompt(code: &str, language: &str) -> String {
    render(REVIEW_PROMPT, &[("code", code), ("language", language)])
}

/// Parse a review reply. Never fails; see module docs for the defaults.
pub fn parse(reply: &str, readiness_threshold: f64) -> ReviewResult {
    let parsed_score = SCORE_RE
        .captures(reply)
        .and_then(|caps| scaled_score(&caps))
        .filter(|score| score.is_finite());

    let (score, score_source) = match parsed_score {
        Some(score) => (score.clamp(0.0, MAX_SCORE), ScoreSource::Parsed),
        None => {
            warn!("Review reply has no valid score, defaulting to 0.0");
            (0.0, ScoreSource::Defaulted)
        }
    };

    let explicit = READY_RE.captures(reply).map(|caps| {
        if caps["ready"].eq_ignore_ascii_case("yes") {
            Readiness::Yes
        } else {
            Readiness::No
        }
    });

    let (readiness, readiness_source) = match explicit {
        Some(readiness) => (readiness, ReadinessSource::Explicit),
        None if score >= readiness_threshold => (Readiness::Yes, ReadinessSource::Inferred),
        None => (Readiness::No, ReadinessSource::Inferred),
    };

    ReviewResult {
        body: body(reply),
        score,
        score_source,
        readiness,
        readiness_source,
    }
}

/// `85/100` → 8.5. A bare number or a zero denominator is taken as out of 10.
fn scaled_score(caps: &regex::Captures<'_>) -> Option<f64> {
    let score = caps.name("score")?.as_str().parse::<f64>().ok()?;
    let out_of = caps
        .name("out_of")
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|out_of| *out_of > 0.0)
        .unwrap_or(MAX_SCORE);
    Some(score * MAX_SCORE / out_of)
}

/// The reply minus score/readiness lines and a leading `Review:` header
fn body(reply: &str) -> String {
    let mut lines: Vec<&str> = reply
        .lines()
        .filter(|line| !SCORE_OR_READY_LINE_RE.is_match(line))
        .collect();

    if let Some(idx) = lines.iter().position(|line| !line.trim().is_empty()) {
        if let Some(header) = REVIEW_HEADER_RE.find(lines[idx]) {
            lines[idx] = &lines[idx][header.end()..];
        }
    }

    lines.join("\n").trim().to_string()
}
