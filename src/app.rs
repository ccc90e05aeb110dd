use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::ConfigService;
use crate::interfaces::cli::{self, Cli};

pub fn run() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // Help, version and usage errors exit here, before any config is read.
    let cli = Cli::parse();

    let config = match ConfigService::new().load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // The actix system hosts both the HTTP workers and the remote synthesis calls.
    actix_web::rt::System::new().block_on(cli::execute(cli.command, config))
}
