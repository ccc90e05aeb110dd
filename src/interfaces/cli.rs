//! Command-line front end.
//!
//! ```bash
//! req2test serve
//! req2test generate requirements.docx --mode remote --csv out.csv
//! echo "$KEY" | req2test set-key openai
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::app_config::AppConfig;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMProvider;
use crate::domain::test_case::{GenerationMode, GenerationReport};
use crate::infrastructure::config::ConfigService;
use crate::infrastructure::export;
use crate::interfaces::http;
use crate::interfaces::state::AppState;

const ENVIRONMENT_HELP: &str = "\
Documents:
  .docx files are read paragraph by paragraph; .txt and .md files line by line.

Environment:
  OPENAI_API_KEY    API key for remote mode
  REQ2TEST_CONFIG   Config file path (default: req2test.toml)
  REQ2TEST_MODE     Default mode when --mode is not given
  RUST_LOG          Log filter (default: info)";

#[derive(Parser, Debug)]
#[command(
    name = "req2test",
    version,
    about = "Turn requirement documents into traceable test cases",
    arg_required_else_help = true,
    after_help = ENVIRONMENT_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP API
    Serve,
    /// Extract requirements and synthesize test cases
    #[command(alias = "gen")]
    Generate {
        /// Requirements document (.docx, .txt or .md)
        document: PathBuf,
        /// Synthesis strategy; defaults to the configured mode
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
        /// Write the result table as CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// Write the result table as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// Store an API key read from stdin in the system keyring
    SetKey {
        #[arg(value_enum)]
        provider: ProviderArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Placeholder test cases, no network
    #[value(alias = "mock")]
    Local,
    /// One LLM request per requirement
    #[value(aliases = ["ai", "openai"])]
    Remote,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => GenerationMode::Local,
            ModeArg::Remote => GenerationMode::Remote,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    Openai,
    #[value(alias = "google")]
    Gemini,
}

impl From<ProviderArg> for LLMProvider {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => LLMProvider::OpenAI,
            ProviderArg::Gemini => LLMProvider::Gemini,
        }
    }
}

pub async fn execute(command: Command, config: AppConfig) -> ExitCode {
    let outcome = match command {
        Command::Serve => serve(config).await,
        Command::Generate {
            document,
            mode,
            csv,
            json,
        } => generate(config, document, mode.map(GenerationMode::from), csv, json).await,
        Command::SetKey { provider } => set_key(provider.into()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let host = config.http.host.clone();
    let port = config.http.port;
    let state = Arc::new(AppState::with_router(config));
    let logs = Arc::new(Mutex::new(Vec::new()));

    http::add_log(
        &logs,
        "INFO",
        "Server",
        &format!("Listening on http://{}:{}", host, port),
    );
    http::start_server(state, logs, &host, port)?.await?;
    Ok(())
}

async fn generate(
    config: AppConfig,
    document: PathBuf,
    mode: Option<GenerationMode>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let state = AppState::with_router(config);
    let use_case = &state.generate_use_case;
    let mode = mode.unwrap_or_else(|| use_case.default_mode());

    let report = use_case.execute_document(&document, mode).await?;
    print_summary(&report);

    if let Some(path) = csv {
        std::fs::write(&path, export::write_csv(&report.result_set)?)?;
        println!("CSV written to: {}", path.display());
    }
    if let Some(path) = json {
        std::fs::write(&path, export::write_json(&report.result_set)?)?;
        println!("JSON written to: {}", path.display());
    }

    Ok(())
}

fn set_key(provider: LLMProvider) -> Result<()> {
    println!("Paste the {} API key and press Enter:", provider.key_name());
    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;

    ConfigService::new().save_api_key(provider, &key)?;
    println!("Stored {} key in the system keyring", provider.key_name());
    Ok(())
}

fn print_summary(report: &GenerationReport) {
    let result_set = &report.result_set;
    println!(
        "Generated {} test cases ({} mode)",
        result_set.len(),
        result_set.mode.as_str()
    );
    println!();
    println!("{}", result_set.columns().join(" | "));
    for record in &result_set.records {
        println!("{}", record.cells().join(" | "));
    }

    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} requirements:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  #{} {}", skipped.position + 1, skipped.reason);
        }
    }
}
