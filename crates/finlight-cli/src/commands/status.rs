//! Status command implementation

use anyhow::Result;
use finlight_core::{FeedbackStore, ServiceConfig};

use super::open_categorizer;

pub fn cmd_status(config: &ServiceConfig) -> Result<()> {
    println!();
    println!("📊 FinLight Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Model:    {}", config.model_path().display());
    println!("   Feedback: {}", config.feedback_path().display());

    match open_categorizer(config) {
        Ok((categorizer, _)) => {
            let info = categorizer.model_info();
            println!();
            println!("   ✅ Categorizer: {}", info.source);
            println!("   Categories: {}", info.class_count);
            println!("   Features: {}", info.feature_count);
            println!("   Training samples: {}", info.training_sample_count);
            if let Some(at) = info.trained_at {
                println!("   Trained at: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        Err(e) => {
            println!();
            println!("   ❌ Categorizer unavailable: {}", e);
        }
    }

    let store = FeedbackStore::new(config.feedback_path());
    match store.count() {
        Ok(count) => {
            println!();
            println!(
                "   Feedback records: {} (retrain needs {})",
                count, config.retrain.min_feedback
            );
        }
        Err(e) => println!("   ❌ Error reading feedback log: {}", e),
    }

    println!();
    Ok(())
}
