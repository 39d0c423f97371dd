//! DevPilot core library
//!
//! Turns a free-text development ticket into a reviewed code artifact:
//! classification, generation, review with feedback-driven retries, test
//! generation, and zip export. Presentation layers (the CLI) sit on top of
//! [`pipeline::Pipeline`] and [`session::DevSession`].

pub mod agents;
pub mod ai;
pub mod config;
pub mod constants;
pub mod export;
pub mod language;
pub mod paths;
pub mod pipeline;
pub mod session;

pub use agents::{AgentFailure, AgentOutcome, Agents, FailureKind};
pub use ai::{AiClient, CompletionError, CompletionModel};
pub use config::DevPilotConfig;
pub use export::{export, ExportBundle, ExportError};
pub use pipeline::{Pipeline, PipelineEvent, PipelineReport, PipelineStage};
pub use session::{DevSession, SessionError};
