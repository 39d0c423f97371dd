//! Application-wide constants

pub mod ai {
    /// Default model for the default provider (Gemini)
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    /// Sampling temperature shared by every agent
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const MAX_OUTPUT_TOKENS: usize = 4096;
    /// Per-call timeout for the completion endpoint
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

pub mod pipeline {
    pub const MAX_ATTEMPTS: usize = 3;
    /// Caller-owned threshold: a review at or above this ends the retry loop
    pub const PASS_THRESHOLD: f64 = 7.0;
    /// Reviewer-owned threshold used to infer readiness when the model omits it
    pub const READINESS_THRESHOLD: f64 = 8.0;
    pub const MAX_SCORE: f64 = 10.0;
    pub const DEFAULT_LANGUAGE: &str = "Python";
    /// Language value the classifier reports when a ticket names none
    pub const UNKNOWN_LANGUAGE: &str = "Unknown";
}

pub mod export {
    pub const REVIEW_FILE_NAME: &str = "review.txt";
    pub const TEST_SUFFIX: &str = "_test";
    pub const IMPROVED_SUFFIX: &str = "_improved";
    pub const FALLBACK_EXTENSION: &str = ".txt";
}

pub mod ui {
    pub const CONFIG_DIR_NAME: &str = ".devpilot";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const LOG_FILE_NAME: &str = "devpilot.log";
}
