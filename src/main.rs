mod config;
mod error_handler;
mod shell;
mod startup;
mod telemetry;

use std::io;
use std::process::ExitCode;

use ai_llm_service::config::env_source::ProcessEnv;
use colored::Colorize;
use tokio::io::BufReader;
use tracing::{error, info};

use crate::error_handler::StartupError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "site-qa stopped");
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // A missing .env is fine; a broken one is not.
    let dotenv = match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => return Err(e.into()),
    };
    telemetry::init()?;
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    startup::run_with(
        &ProcessEnv,
        BufReader::new(tokio::io::stdin()),
        &mut io::stdout(),
    )
    .await
}
