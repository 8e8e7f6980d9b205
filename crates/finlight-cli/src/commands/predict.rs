//! Prediction command implementation

use anyhow::{anyhow, Result};
use finlight_core::{Direction, ServiceConfig};

use super::open_categorizer;

pub fn cmd_predict(
    config: &ServiceConfig,
    description: &str,
    amount: f64,
    direction: &str,
) -> Result<()> {
    let direction: Direction = direction.parse().map_err(|e: String| anyhow!(e))?;
    let (categorizer, _) = open_categorizer(config)?;

    let prediction = categorizer.predict(description, amount, direction)?;

    println!();
    println!("🏷️  {}", description);
    println!(
        "   Category:   {} ({:.1}%)",
        prediction.category,
        prediction.confidence * 100.0
    );
    for alt in &prediction.alternatives {
        println!(
            "   Alternative: {} ({:.1}%)",
            alt.category,
            alt.confidence * 100.0
        );
    }
    println!();

    Ok(())
}
