//! Training command implementation

use anyhow::{Context, Result};
use finlight_core::{FeedbackStore, RetrainOutcome, ServiceConfig};

use super::open_categorizer;

pub fn cmd_retrain(config: &ServiceConfig) -> Result<()> {
    let (categorizer, _) = open_categorizer(config)?;
    let store = FeedbackStore::new(config.feedback_path());

    println!("🧠 Retraining categorizer from feedback...");

    match categorizer.retrain(&store).context("Retraining failed")? {
        RetrainOutcome::Retrained {
            training_sample_count,
            skipped_records,
        } => {
            println!("✅ Model retrained on {} samples", training_sample_count);
            if skipped_records > 0 {
                println!(
                    "   ⚠️  Ignored {} record(s) with unknown categories",
                    skipped_records
                );
            }
            println!("   Saved to {}", categorizer.model_path().display());
        }
        RetrainOutcome::Skipped { reason } => {
            println!("⏭️  Skipped: {}", reason);
        }
    }

    Ok(())
}
