//! Atelier CLI binary.
//!
//! This binary provides command-line access to the stylist:
//! - Ask questions and categorize clothing photos
//! - Suggest outfits and shopping picks from a wardrobe export
//! - Generate images and style videos
//! - Show the request lane's cooldown countdowns

use std::process::ExitCode;

use atelier::{LoggingConfig, init_logging};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    use cli::{App, Cli, report_error};

    // Load GEMINI_API_KEY from .env if present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let logging = LoggingConfig::new()
        .verbose(cli.verbose)
        .with_json(cli.json_logs);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    // Execute the requested command
    let result = match App::load() {
        Ok(app) => app.execute(cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
