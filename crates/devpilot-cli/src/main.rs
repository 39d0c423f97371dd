//! DevPilot - ticket in, reviewed code out
//!
//! Classifies a development ticket, generates code for it, reviews and
//! retries until the code clears the pass threshold, writes unit tests, and
//! packages everything as a zip. The single-step subcommands run one agent
//! against an existing file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use devpilot_core::agents::Agents;
use devpilot_core::ai::ProviderId;
use devpilot_core::export::{self, ExportBundle};
use devpilot_core::{
    language, paths, AgentOutcome, AiClient, DevPilotConfig, DevSession, Pipeline,
};

mod render;

use render::Renderer;

/// DevPilot - AI development ticket assistant
#[derive(Parser)]
#[command(name = "devpilot")]
#[command(
    about = "Turn a development ticket into reviewed, tested, exportable code",
    long_about = None
)]
struct Cli {
    /// Config file (defaults to ~/.devpilot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model provider: gemini, openai, anthropic, openrouter
    #[arg(long, global = true)]
    provider: Option<ProviderId>,

    /// Model ID (defaults to the provider's default)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: classify, generate, review (with retries), test
    Run {
        #[command(flatten)]
        ticket: TicketInput,

        /// Maximum generate/review attempts
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Review score (0-10) that ends the retry loop
        #[arg(long)]
        threshold: Option<f64>,

        /// Skip unit test generation
        #[arg(long)]
        no_tests: bool,

        /// Write a zip of the results into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a zip of the results into ~/.devpilot/exports
        #[arg(long)]
        export: bool,
    },

    /// Classify a ticket without generating code
    Classify {
        #[command(flatten)]
        ticket: TicketInput,
    },

    /// Review a code file
    Review {
        #[command(flatten)]
        code: CodeInput,
    },

    /// Generate unit tests for a code file
    Tests {
        #[command(flatten)]
        code: CodeInput,
    },

    /// Improve a code file from feedback (reviews it first when none is given)
    Improve {
        #[command(flatten)]
        code: CodeInput,

        /// What to change
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Explain a code file
    Explain {
        #[command(flatten)]
        code: CodeInput,
    },

    /// Package a code file with optional tests, review, and improved code
    Package {
        /// Main code file
        file: PathBuf,

        #[arg(long)]
        tests: Option<PathBuf>,

        #[arg(long)]
        review: Option<PathBuf>,

        #[arg(long)]
        improved: Option<PathBuf>,

        /// Language for derived file extensions
        #[arg(short, long)]
        language: Option<String>,

        /// Output directory (defaults to ~/.devpilot/exports)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Ticket text from an argument, a file, or stdin
#[derive(Args)]
struct TicketInput {
    /// Ticket text
    text: Option<String>,

    /// Read the ticket from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct CodeInput {
    /// Code file
    file: PathBuf,

    /// Language (inferred from the extension when omitted)
    #[arg(short, long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = load_config(&cli)?;
    let renderer = Renderer::new(cli.json);
    tracing::info!(provider = %config.model.provider, "DevPilot starting");

    match cli.command {
        Commands::Run {
            ticket,
            max_attempts,
            threshold,
            no_tests,
            output,
            export,
        } => {
            let mut config = config;
            apply_run_overrides(&mut config, max_attempts, threshold, no_tests)?;
            let export_dir = match (output, export) {
                (Some(dir), _) => Some(dir),
                (None, true) => {
                    Some(paths::ensure_exports_dir().context("failed to create exports dir")?)
                }
                (None, false) => None,
            };
            run_pipeline(&config, &ticket.read()?, export_dir, renderer).await
        }
        Commands::Classify { ticket } => {
            let text = ticket.read()?;
            let agents = build_agents(&config)?;
            let ticket = finish("classifier", agents.classify(&text).await, renderer)?;
            renderer.ticket(&ticket);
            Ok(())
        }
        Commands::Review { code } => {
            let mut session = session_with_code(&config, &code)?;
            let review = finish("reviewer", session.rereview().await?, renderer)?;
            renderer.review(&review);
            Ok(())
        }
        Commands::Tests { code } => {
            let (source, language) = code.read(&config)?;
            let agents = build_agents(&config)?;
            let outcome = agents.generate_tests(&source, &language).await;
            let bundle = finish("test generator", outcome, renderer)?;
            renderer.tests(&bundle);
            Ok(())
        }
        Commands::Improve { code, feedback } => {
            let mut session = session_with_code(&config, &code)?;
            let feedback = feedback.unwrap_or_default();
            if feedback.trim().is_empty() {
                let review = finish("reviewer", session.rereview().await?, renderer)?;
                renderer.review(&review);
            }
            let improved = finish("improver", session.improve(&feedback).await?, renderer)?;
            renderer.text("Improved code", &improved);
            Ok(())
        }
        Commands::Explain { code } => {
            let mut session = session_with_code(&config, &code)?;
            let explanation = finish("explainer", session.explain().await?, renderer)?;
            renderer.text("Explanation", &explanation);
            Ok(())
        }
        Commands::Package {
            file,
            tests,
            review,
            improved,
            language,
            output,
        } => {
            let code = read_file(&file)?;
            let tests = tests.as_deref().map(read_file).transpose()?;
            let review = review.as_deref().map(read_file).transpose()?;
            let improved = improved.as_deref().map(read_file).transpose()?;
            let filename = file_name(&file)?;
            let language = language
                .or_else(|| language::from_filename(&filename).map(str::to_string))
                .unwrap_or_else(|| config.pipeline.default_language.clone());

            let bundle = ExportBundle {
                code: &code,
                filename: &filename,
                language: &language,
                test_code: tests.as_deref(),
                review: review.as_deref(),
                improved_code: improved.as_deref(),
            };
            let dir = match output {
                Some(dir) => dir,
                None => paths::ensure_exports_dir().context("failed to create exports dir")?,
            };
            let path = export::write_archive(&bundle, &dir)?;
            renderer.text("Archive", &path.display().to_string());
            Ok(())
        }
    }
}

async fn run_pipeline(
    config: &DevPilotConfig,
    ticket: &str,
    export_dir: Option<PathBuf>,
    renderer: Renderer,
) -> Result<()> {
    let pipeline = Pipeline::new(build_agents(config)?, config.pipeline_config());
    let mut session = DevSession::new(pipeline);

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    let render_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            renderer.event(&event);
        }
    });

    let result = session.run(ticket, &event_tx).await.cloned();
    drop(event_tx);
    render_task.await.context("event renderer panicked")?;

    let report = result?;
    renderer.report(&report);

    if let Some(dir) = export_dir {
        if session.working_code().is_none() {
            bail!("nothing to export: no attempt produced code");
        }
        let bundle = session.bundle()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = export::write_archive(&bundle, &dir)?;
        renderer.text("Archive", &path.display().to_string());
    }
    Ok(())
}

/// Unwrap an agent outcome, printing the failure (and raw reply) first.
fn finish<T>(agent: &str, outcome: AgentOutcome<T>, renderer: Renderer) -> Result<T> {
    match outcome {
        AgentOutcome::Success(value) => Ok(value),
        AgentOutcome::Failure(failure) => {
            renderer.failure(agent, &failure);
            Err(failure).with_context(|| format!("{} failed", agent))
        }
    }
}

fn load_config(cli: &Cli) -> Result<DevPilotConfig> {
    let mut config = match &cli.config {
        Some(path) => DevPilotConfig::load(path)?,
        None => DevPilotConfig::load_default()?,
    };
    if let Some(provider) = cli.provider {
        if provider != config.model.provider {
            // A model ID from the file belongs to the old provider
            config.model.model = None;
            config.model.base_url = None;
        }
        config.model.provider = provider;
    }
    if let Some(model) = &cli.model {
        config.model.model = Some(model.clone());
    }
    Ok(config)
}

/// Apply `run` flags on top of the loaded config and re-check ranges.
fn apply_run_overrides(
    config: &mut DevPilotConfig,
    max_attempts: Option<usize>,
    threshold: Option<f64>,
    no_tests: bool,
) -> Result<()> {
    if let Some(max_attempts) = max_attempts {
        config.pipeline.max_attempts = max_attempts;
    }
    if let Some(threshold) = threshold {
        config.pipeline.pass_threshold = threshold;
    }
    if no_tests {
        config.pipeline.generate_tests = false;
    }
    config.validate().context("invalid run options")
}

fn build_agents(config: &DevPilotConfig) -> Result<Agents> {
    let client = AiClient::from_env(config.client_config()).with_context(|| {
        format!(
            "set {} (or DEVPILOT_API_KEY) to use {}",
            config.model.provider.api_key_env(),
            config.model.provider
        )
    })?;
    Ok(Agents::new(Arc::new(client), config.agent_settings()))
}

fn session_with_code(config: &DevPilotConfig, input: &CodeInput) -> Result<DevSession> {
    let (code, language) = input.read(config)?;
    let pipeline = Pipeline::new(build_agents(config)?, config.pipeline_config());
    let mut session = DevSession::new(pipeline);
    session.load_code(code, file_name(&input.file)?, language);
    Ok(session)
}

impl TicketInput {
    fn read(&self) -> Result<String> {
        let text = match (&self.text, &self.file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => read_file(path)?,
            (None, None) => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read ticket from stdin")?;
                buf
            }
        };
        if text.trim().is_empty() {
            bail!("ticket is empty");
        }
        Ok(text)
    }
}

impl CodeInput {
    /// File contents and the language to treat them as
    fn read(&self, config: &DevPilotConfig) -> Result<(String, String)> {
        let code = read_file(&self.file)?;
        let language = self
            .language
            .clone()
            .or_else(|| language::from_filename(&self.file.to_string_lossy()).map(str::to_string))
            .unwrap_or_else(|| config.pipeline.default_language.clone());
        Ok((code, language))
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

/// Log to ~/.devpilot/logs/devpilot.log; stdout is reserved for output.
fn init_logging() -> Result<()> {
    let log_dir = paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory: {}", e);
    }

    #[cfg(unix)]
    let null_device = "/dev/null";
    #[cfg(windows)]
    let null_device = "NUL";

    let log_path = log_dir.join(devpilot_core::constants::ui::LOG_FILE_NAME);
    let log_file = match std::fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to create log file: {}, falling back to null device", e);
            std::fs::File::create(null_device)
                .with_context(|| format!("failed to open null device {}", null_device))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "devpilot",
            "--provider",
            "anthropic",
            "run",
            "Add a search bar",
            "--max-attempts",
            "2",
            "--no-tests",
        ])
        .unwrap();
        assert_eq!(cli.provider, Some(ProviderId::Anthropic));
        match cli.command {
            Commands::Run {
                ticket,
                max_attempts,
                no_tests,
                ..
            } => {
                assert_eq!(ticket.text.as_deref(), Some("Add a search bar"));
                assert_eq!(max_attempts, Some(2));
                assert!(no_tests);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_provider_override_resets_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nprovider = \"openai\"\nmodel = \"gpt-4o\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "devpilot",
            "--config",
            path.to_str().unwrap(),
            "--provider",
            "gemini",
            "classify",
            "x",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.model.provider, ProviderId::Gemini);
        assert_eq!(config.model.model, None);
    }

    #[test]
    fn test_run_overrides_are_validated() {
        let mut config = DevPilotConfig::default();
        apply_run_overrides(&mut config, Some(2), Some(6.0), true).unwrap();
        assert_eq!(config.pipeline.max_attempts, 2);
        assert_eq!(config.pipeline.pass_threshold, 6.0);
        assert!(!config.pipeline.generate_tests);

        let mut config = DevPilotConfig::default();
        assert!(apply_run_overrides(&mut config, None, Some(11.0), false).is_err());

        let mut config = DevPilotConfig::default();
        assert!(apply_run_overrides(&mut config, Some(0), None, false).is_err());
    }

    #[test]
    fn test_code_input_infers_language() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "fn main() {}").unwrap();
        let input = CodeInput {
            file,
            language: None,
        };
        let (code, language) = input.read(&DevPilotConfig::default()).unwrap();
        assert_eq!(code, "fn main() {}");
        assert_eq!(language, "Rust");
    }

    #[test]
    fn test_ticket_file_conflicts_with_text() {
        assert!(Cli::try_parse_from(["devpilot", "classify", "x", "--file", "t.txt"]).is_err());
    }
}
