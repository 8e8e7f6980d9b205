//! Feedback command implementations (add, list)

use anyhow::{bail, Context, Result};
use finlight_core::{Categorizer, Category, Direction, FeedbackStore, NewFeedback, ServiceConfig};

use super::{open_categorizer, truncate};

pub fn cmd_feedback_add(
    config: &ServiceConfig,
    description: &str,
    correct: &str,
    predicted: Option<&str>,
    amount: f64,
) -> Result<()> {
    if description.trim().is_empty() {
        bail!("Description must not be empty");
    }
    let correct_category: Category = match correct.parse() {
        Ok(c) => c,
        Err(e) => {
            let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
            bail!("{}. Valid categories: {}", e, names.join(", "));
        }
    };

    let predicted_category = match predicted {
        Some(p) => p.to_string(),
        None => {
            let (categorizer, _) = open_categorizer(config)?;
            categorizer
                .predict(description, amount, Direction::Debit)?
                .category
                .to_string()
        }
    };

    let store = FeedbackStore::new(config.feedback_path());
    store
        .append(&NewFeedback {
            description: description.to_string(),
            predicted_category: predicted_category.clone(),
            correct_category: correct_category.to_string(),
            amount,
        })
        .context("Failed to record feedback")?;

    println!(
        "✅ Recorded: \"{}\" {} → {}",
        description, predicted_category, correct_category
    );
    let usable = Categorizer::usable_feedback_count(&store.read_all()?);
    if usable < config.retrain.min_feedback {
        println!(
            "   {} of {} corrections needed before retraining",
            usable, config.retrain.min_feedback
        );
    } else {
        println!("   Run 'finlight retrain' to apply {} corrections", usable);
    }

    Ok(())
}

pub fn cmd_feedback_list(config: &ServiceConfig, limit: usize) -> Result<()> {
    let store = FeedbackStore::new(config.feedback_path());
    let records = store.read_all().context("Failed to read feedback log")?;

    if records.is_empty() {
        println!("No feedback recorded yet.");
        return Ok(());
    }

    println!();
    println!(
        "{:<17} {:<36} {:<22} {:<22} {:>10}",
        "Recorded", "Description", "Predicted", "Correct", "Amount"
    );
    println!("{}", "─".repeat(111));

    for record in records.iter().rev().take(limit) {
        println!(
            "{:<17} {:<36} {:<22} {:<22} {:>10.2}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            truncate(&record.description, 36),
            truncate(&record.predicted_category, 22),
            truncate(&record.correct_category, 22),
            record.amount
        );
    }

    println!();
    println!("Showing {} of {} records", records.len().min(limit), records.len());

    Ok(())
}
