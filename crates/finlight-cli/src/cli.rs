//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinLight - Transaction categorization and receipt extraction
#[derive(Parser)]
#[command(name = "finlight")]
#[command(about = "AI service for categorizing small-business transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/finlight/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the model artifact and feedback log
    ///
    /// Overrides storage.model_dir from the config file and FINLIGHT_MODEL_DIR.
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (defaults to server.port, 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to server.host, 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },

    /// Categorize a transaction description
    Predict {
        /// Transaction description, e.g. "uber trip"
        description: String,

        /// Transaction amount
        #[arg(short, long, default_value = "0")]
        amount: f64,

        /// Debit or Credit
        #[arg(short, long, default_value = "debit")]
        direction: String,
    },

    /// Record or list categorization corrections
    Feedback {
        #[command(subcommand)]
        action: Option<FeedbackAction>,
    },

    /// Retrain the categorizer on all recorded feedback
    Retrain,

    /// Show model and feedback status
    Status,

    /// Extract receipt or invoice fields from a text document
    Extract {
        /// Document to read
        file: PathBuf,

        /// Document type: receipt, invoice
        #[arg(short = 't', long, default_value = "receipt")]
        document_type: String,

        /// Print the extracted data as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Record a correction
    Add {
        /// Transaction description
        description: String,

        /// The category the transaction should have had
        #[arg(short, long)]
        correct: String,

        /// The category the model predicted (runs the model when omitted)
        #[arg(short, long)]
        predicted: Option<String>,

        /// Transaction amount
        #[arg(short, long, default_value = "0")]
        amount: f64,
    },

    /// List recorded corrections (most recent first)
    List {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}
