// src/main.rs
//
// Binary entry point: logging setup, argument parsing, and the mapping
// from run outcome to process exit status.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use uartpass::cli::{self, Cli};
use uartpass::error::ExitStatus;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uartpass=info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders help and usage itself; only the exit status is
            // ours to pick.
            let status = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Success,
                _ => ExitStatus::Argument,
            };
            let _ = e.print();
            return status.into();
        }
    };

    match cli::run(cli).await {
        Ok(()) => ExitStatus::Success.into(),
        Err(e) => {
            error!("{}", e);
            ExitStatus::from(&e).into()
        }
    }
}
