//! JSON Extractor CLI.
//!
//! `shell` runs the interactive form, `extract` handles a single message,
//! `records` prints the stored log.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use json_extractor::config::Config;
use json_extractor::credentials::{load_credentials, require_openai_key};
use json_extractor::extract::{ExtractOutcome, ExtractionSettings, Strategy};
use json_extractor::logging;
use json_extractor::providers::openai::OpenAiProvider;
use json_extractor::session::Session;
use json_extractor::shell::{render_outcome, Shell};
use json_extractor::store::RecordLog;

/// Extract name, email and phone from free text with an LLM.
#[derive(Debug, Parser)]
#[command(name = "json-extractor", version, about)]
struct Cli {
    /// Config file (default: $JSON_EXTRACTOR_CONFIG or ./config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extraction method (overrides `shell.default_mode`).
    #[arg(long, global = true, value_enum)]
    mode: Option<Strategy>,

    /// `.env` file holding OPENAI_API_KEY.
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive form (default).
    Shell,
    /// Extract from one message and exit.
    Extract {
        /// Message containing a name, email and phone number.
        text: String,
    },
    /// Print every stored record, one JSON object per line.
    Records,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let strategy = cli.mode.unwrap_or(config.shell.default_mode);
    let sink = RecordLog::new(config.storage.log_file.clone());

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Records => {
            logging::init_cli(&config.logging.level);
            report_config_warnings(&config);
            print_records(&sink)
        }
        Commands::Extract { text } => {
            logging::init_cli(&config.logging.level);
            report_config_warnings(&config);
            let provider = build_provider(&config, &cli.env_file)?;
            let mut session = Session::new(strategy, settings(&config));
            let Some(outcome) = session.submit(&provider, &sink, &text).await else {
                return Ok(ExitCode::SUCCESS);
            };
            let mut stdout = std::io::stdout().lock();
            render_outcome(&outcome, &mut stdout)?;
            Ok(match outcome {
                ExtractOutcome::Success(_) => ExitCode::SUCCESS,
                ExtractOutcome::Failure { .. } => ExitCode::FAILURE,
            })
        }
        Commands::Shell => {
            let _guard = match &config.logging.dir {
                Some(dir) => Some(logging::init_file(dir, &config.logging.level)?),
                None => {
                    logging::init_cli(&config.logging.level);
                    None
                }
            };
            report_config_warnings(&config);
            let provider = build_provider(&config, &cli.env_file)?;
            let session = Session::new(strategy, settings(&config));
            info!(session = %session.id(), strategy = %strategy, log = %sink.path().display(), "shell starting");

            let mut shell = Shell::new(&provider, sink, session);
            let stdin = std::io::stdin().lock();
            let stdout = std::io::stdout().lock();
            shell.run(stdin, stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config loads before logging exists; replay what it skipped.
fn report_config_warnings(config: &Config) {
    for warning in config.warnings() {
        warn!("{warning}");
    }
}

/// Resolve the API key once, failing fast when it is absent.
fn build_provider(config: &Config, env_file: &Path) -> Result<OpenAiProvider> {
    let credentials = load_credentials(env_file)?;
    let api_key = require_openai_key(&credentials, |key| std::env::var(key).ok())?;
    Ok(OpenAiProvider::new(
        config.openai.base_url.clone(),
        config.openai.model.clone(),
        api_key,
    ))
}

fn settings(config: &Config) -> ExtractionSettings {
    ExtractionSettings {
        max_tokens: config.openai.max_tokens,
        temperature: config.openai.temperature,
    }
}

fn print_records(sink: &RecordLog) -> Result<ExitCode> {
    let records = sink
        .read_all()
        .with_context(|| format!("failed to read {}", sink.path().display()))?;
    for record in &records {
        println!("{}", record.to_json_line()?);
    }
    Ok(ExitCode::SUCCESS)
}
