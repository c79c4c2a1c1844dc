use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use zcoins::adapter::inbound::cli::{self, output, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    output::configure(output::OutputConfig::new(cli.json));

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    config.logging.init();
    info!(version = env!("CARGO_PKG_VERSION"), "zcoins starting");

    tokio::select! {
        result = cli::run(&cli, &config) => {
            if let Err(e) = result {
                error!(error = %e, "Command failed");
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    ExitCode::SUCCESS
}
