//! FinLight CLI - Transaction categorization service
//!
//! Usage:
//!   finlight serve --port 8000                     Start the REST API
//!   finlight predict "uber trip"                   Categorize a description
//!   finlight feedback add "uber trip" -c Fuel      Record a correction
//!   finlight retrain                               Refit on recorded feedback
//!   finlight extract slip.txt                      Parse a receipt

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::resolve_config(cli.config.as_deref(), cli.model_dir.as_deref())?;

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(config, host, port).await,
        Commands::Predict {
            description,
            amount,
            direction,
        } => commands::cmd_predict(&config, &description, amount, &direction),
        Commands::Feedback { action } => match action {
            None => commands::cmd_feedback_list(&config, 20),
            Some(FeedbackAction::List { limit }) => commands::cmd_feedback_list(&config, limit),
            Some(FeedbackAction::Add {
                description,
                correct,
                predicted,
                amount,
            }) => commands::cmd_feedback_add(
                &config,
                &description,
                &correct,
                predicted.as_deref(),
                amount,
            ),
        },
        Commands::Retrain => commands::cmd_retrain(&config),
        Commands::Status => commands::cmd_status(&config),
        Commands::Extract {
            file,
            document_type,
            json,
        } => commands::cmd_extract(&file, &document_type, json),
    }
}
