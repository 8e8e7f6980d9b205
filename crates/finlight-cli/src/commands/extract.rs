//! Document extraction command implementation

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use finlight_core::{process_document, DocumentType, PlainTextExtractor};

pub fn cmd_extract(file: &Path, document_type: &str, json: bool) -> Result<()> {
    let document_type: DocumentType = document_type.parse().map_err(|e: String| anyhow!(e))?;
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;

    let data = process_document(&PlainTextExtractor, &bytes, document_type)
        .with_context(|| format!("Failed to extract {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!();
    println!("🧾 {} ({})", file.display(), document_type);
    println!("   Vendor: {}", data.vendor);
    if let Some(number) = &data.invoice_number {
        println!("   Invoice: {}", number);
    }
    match data.amount {
        Some(amount) => println!("   Total:  R {:.2}", amount),
        None => println!("   Total:  (not found)"),
    }
    if let Some(vat) = data.vat_amount {
        println!("   VAT:    R {:.2}", vat);
    }
    println!("   Date:   {}", data.date.as_deref().unwrap_or("(not found)"));

    if !data.items.is_empty() {
        println!();
        for item in &data.items {
            println!(
                "   {:<32} {:>4} x {:>9.2} = {:>9.2}",
                super::truncate(&item.description, 32),
                item.quantity,
                item.unit_price,
                item.total
            );
        }
    }

    println!();
    println!("   Confidence: {:.0}%", data.confidence * 100.0);
    Ok(())
}
