//! Receipt and invoice extraction
//!
//! Text extraction is pluggable through [`TextExtractor`]. The bundled
//! [`PlainTextExtractor`] handles documents that already are text; image OCR
//! engines plug in behind the same trait.
//!
//! Structured fields are pulled out of the extracted text with regex
//! heuristics tuned for South African till slips (Rand amounts, VAT lines,
//! day-first dates).

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Turns an uploaded document into plain text
pub trait TextExtractor: Send + Sync {
    /// Short identifier for logs and status output
    fn name(&self) -> &'static str;

    /// Whether image documents can be read (real OCR is wired in)
    fn is_available(&self) -> bool;

    /// Extract the text content of a document
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Extractor for documents that are already text (exported till slips,
/// OCR output produced elsewhere). Binary payloads are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::InvalidData("Document is empty".into()));
        }

        let text = std::str::from_utf8(bytes).map_err(|_| {
            Error::OcrUnavailable("No OCR engine configured for image documents".into())
        })?;
        let is_binary = text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'));
        if is_binary {
            return Err(Error::OcrUnavailable(
                "No OCR engine configured for image documents".into(),
            ));
        }

        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Receipt,
    Invoice,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Invoice => "invoice",
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(Self::Receipt),
            "invoice" => Ok(Self::Invoice),
            _ => Err(format!("Unknown document type: {}", s)),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line item from a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

/// Structured fields extracted from a receipt or invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    pub vendor: String,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub vat_amount: Option<f64>,
    pub items: Vec<ReceiptItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub raw_text: String,
    /// Fraction of vendor, amount and date that were found
    pub confidence: f64,
}

const UNKNOWN_VENDOR: &str = "Unknown";

struct Patterns {
    total: Regex,
    rand_prefix: Regex,
    zar_suffix: Regex,
    money: Regex,
    date_dmy: Regex,
    date_ymd: Regex,
    vat: Regex,
    summary: Regex,
    heading: Regex,
    item_with_qty: Regex,
    item_single: Regex,
    invoice_code: Regex,
    invoice_label: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        total: Regex::new(r"(?i)\btotal\b[:\s]+R?\s*(\d+[.,]\d{2})\b").expect("valid regex"),
        rand_prefix: Regex::new(r"\bR\s*(\d+[.,]\d{2})\b").expect("valid regex"),
        zar_suffix: Regex::new(r"(?i)\b(\d+[.,]\d{2})\s*ZAR\b").expect("valid regex"),
        money: Regex::new(r"\b(\d+[.,]\d{2})\b").expect("valid regex"),
        date_dmy: Regex::new(r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b").expect("valid regex"),
        date_ymd: Regex::new(r"\b(\d{4}[/-]\d{1,2}[/-]\d{1,2})\b").expect("valid regex"),
        vat: Regex::new(r"(?i)\bvat\b").expect("valid regex"),
        summary: Regex::new(
            r"(?i)\b(sub\s*-?\s*total|total|vat|tax|change|cash|card|balance|due|tendered)\b",
        )
        .expect("valid regex"),
        heading: Regex::new(r"(?i)^\s*(tax\s+)?(invoice|receipt|till\s+slip)\b")
            .expect("valid regex"),
        item_with_qty: Regex::new(
            r"^(?P<desc>.*?[[:alpha:]].*?)\s+(?P<qty>\d+)\s*[xX@]\s*R?\s*(?P<price>\d+[.,]\d{2})$",
        )
        .expect("valid regex"),
        item_single: Regex::new(r"^(?P<desc>.*?[[:alpha:]].*?)\s+R?\s*(?P<price>\d+[.,]\d{2})$")
            .expect("valid regex"),
        invoice_code: Regex::new(r"(?i)\b(INV-?\d+)\b").expect("valid regex"),
        invoice_label: Regex::new(
            r"(?i)\binvoice\s*(?:no\.?|number|#)\s*:?\s*([A-Za-z0-9][A-Za-z0-9-]*)",
        )
        .expect("valid regex"),
    })
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.replace(',', ".").parse().ok()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Find the document total. Prefers an explicit "Total" line, then a Rand
/// prefixed amount, then a ZAR suffixed amount.
pub fn parse_amount(text: &str) -> Option<f64> {
    let p = patterns();
    [&p.total, &p.rand_prefix, &p.zar_suffix]
        .into_iter()
        .find_map(|re| re.captures(text).and_then(|c| parse_decimal(&c[1])))
}

/// Find the first date, day-first forms before year-first forms
pub fn parse_date(text: &str) -> Option<String> {
    let p = patterns();
    [&p.date_dmy, &p.date_ymd]
        .into_iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()))
}

/// VAT amount: the last money value on the first VAT line that has one
pub fn parse_vat(text: &str) -> Option<f64> {
    let p = patterns();
    text.lines()
        .filter(|line| p.vat.is_match(line))
        .find_map(|line| {
            p.money
                .captures_iter(line)
                .last()
                .and_then(|c| parse_decimal(&c[1]))
        })
}

pub fn parse_invoice_number(text: &str) -> Option<String> {
    let p = patterns();
    if let Some(c) = p.invoice_code.captures(text) {
        return Some(c[1].to_uppercase());
    }
    p.invoice_label.captures(text).map(|c| c[1].to_string())
}

fn is_metadata_line(line: &str) -> bool {
    let p = patterns();
    p.summary.is_match(line)
        || p.heading.is_match(line)
        || p.date_dmy.is_match(line)
        || p.date_ymd.is_match(line)
        || p.invoice_code.is_match(line)
        || p.invoice_label.is_match(line)
}

fn parse_vendor(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| {
        !line.is_empty() && line.chars().any(char::is_alphabetic) && !is_metadata_line(line)
    })
}

fn parse_item(line: &str) -> Option<ReceiptItem> {
    let p = patterns();
    if let Some(c) = p.item_with_qty.captures(line) {
        let quantity: f64 = c["qty"].parse().ok()?;
        let unit_price = parse_decimal(&c["price"])?;
        return Some(ReceiptItem {
            description: c["desc"].trim().to_string(),
            quantity,
            unit_price,
            total: round_cents(quantity * unit_price),
        });
    }
    let c = p.item_single.captures(line)?;
    let price = parse_decimal(&c["price"])?;
    Some(ReceiptItem {
        description: c["desc"].trim().to_string(),
        quantity: 1.0,
        unit_price: price,
        total: price,
    })
}

/// Parse extracted receipt text into structured fields
pub fn parse_receipt_text(text: &str) -> ReceiptData {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let vendor_line = parse_vendor(&lines);

    let items = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| Some(*i) != vendor_line && !line.is_empty() && !is_metadata_line(line))
        .filter_map(|(_, line)| parse_item(line))
        .collect();

    let vendor = vendor_line.map(|i| lines[i].to_string());
    let amount = parse_amount(text);
    let date = parse_date(text);

    let found = [vendor.is_some(), amount.is_some(), date.is_some()]
        .iter()
        .filter(|f| **f)
        .count();

    let data = ReceiptData {
        vendor: vendor.unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
        amount,
        date,
        vat_amount: parse_vat(text),
        items,
        invoice_number: None,
        raw_text: text.to_string(),
        confidence: found as f64 / 3.0,
    };

    debug!(
        vendor = %data.vendor,
        items = data.items.len(),
        confidence = data.confidence,
        "Parsed receipt text"
    );
    data
}

/// Parse extracted text for the given document type
pub fn parse_document_text(text: &str, document_type: DocumentType) -> ReceiptData {
    let mut data = parse_receipt_text(text);
    if document_type == DocumentType::Invoice {
        data.invoice_number = parse_invoice_number(text);
    }
    data
}

/// Extract and parse a document in one step
pub fn process_document(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    document_type: DocumentType,
) -> Result<ReceiptData> {
    let text = extractor.extract_text(bytes)?;
    Ok(parse_document_text(&text, document_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAR_SLIP: &str = "SPAR Rosebank\n\
        Date: 14/03/2024\n\
        Bread 2 x R 15.99\n\
        Milk 2L R 32.50\n\
        Eggs 6 pack 41.00\n\
        Subtotal R 105.48\n\
        VAT 15% R 13.76\n\
        Total: R 105.48\n\
        Card R 105.48\n";

    #[test]
    fn test_parse_full_receipt() {
        let data = parse_receipt_text(SPAR_SLIP);
        assert_eq!(data.vendor, "SPAR Rosebank");
        assert_eq!(data.amount, Some(105.48));
        assert_eq!(data.date.as_deref(), Some("14/03/2024"));
        assert_eq!(data.vat_amount, Some(13.76));
        assert!((data.confidence - 1.0).abs() < 1e-9);
        assert_eq!(data.invoice_number, None);

        assert_eq!(data.items.len(), 3);
        assert_eq!(
            data.items[0],
            ReceiptItem {
                description: "Bread".to_string(),
                quantity: 2.0,
                unit_price: 15.99,
                total: 31.98,
            }
        );
        assert_eq!(data.items[1].description, "Milk 2L");
        assert_eq!(data.items[1].quantity, 1.0);
        assert_eq!(data.items[2].total, 41.0);
    }

    #[test]
    fn test_amount_pattern_priority() {
        assert_eq!(parse_amount("Coffee R 30.00\nTOTAL 45,50"), Some(45.5));
        assert_eq!(parse_amount("Paid R12.00"), Some(12.0));
        assert_eq!(parse_amount("Amount 99.95 ZAR"), Some(99.95));
        assert_eq!(parse_amount("Water 12.00"), None);
        assert_eq!(parse_amount("nothing here"), None);
    }

    #[test]
    fn test_date_patterns() {
        assert_eq!(parse_date("on 3-7-24 at noon").as_deref(), Some("3-7-24"));
        assert_eq!(parse_date("Issued 2024-03-15").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("no date"), None);
    }

    #[test]
    fn test_vat_takes_amount_not_rate() {
        assert_eq!(parse_vat("VAT (15.00%) 13.04"), Some(13.04));
        assert_eq!(parse_vat("Total 100.00"), None);
    }

    #[test]
    fn test_missing_fields_lower_confidence() {
        let data = parse_receipt_text("Total: R 20.00");
        assert_eq!(data.vendor, UNKNOWN_VENDOR);
        assert_eq!(data.amount, Some(20.0));
        assert_eq!(data.date, None);
        assert!((data.confidence - 1.0 / 3.0).abs() < 1e-9);
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(parse_invoice_number("Ref inv-0042").as_deref(), Some("INV-0042"));
        assert_eq!(parse_invoice_number("Invoice #123").as_deref(), Some("123"));
        assert_eq!(parse_invoice_number("Invoice No: A-77").as_deref(), Some("A-77"));
        assert_eq!(parse_invoice_number("Receipt"), None);
    }

    #[test]
    fn test_invoice_document() {
        let text = "TAX INVOICE\nAcme Plumbing\nInvoice #981\n2024-02-01\nCall-out fee R 450.00\nTotal R 517.50\nVAT 67.50";
        let data = parse_document_text(text, DocumentType::Invoice);
        assert_eq!(data.vendor, "Acme Plumbing");
        assert_eq!(data.invoice_number.as_deref(), Some("981"));
        assert_eq!(data.amount, Some(517.5));
        assert_eq!(data.vat_amount, Some(67.5));
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].description, "Call-out fee");

        let as_receipt = parse_document_text(text, DocumentType::Receipt);
        assert_eq!(as_receipt.invoice_number, None);
    }

    #[test]
    fn test_plain_text_extractor() {
        let extractor = PlainTextExtractor;
        assert!(!extractor.is_available());
        assert_eq!(extractor.extract_text(b"Total R 1.00").unwrap(), "Total R 1.00");

        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        assert!(matches!(
            extractor.extract_text(&png),
            Err(Error::OcrUnavailable(_))
        ));
        assert!(matches!(
            extractor.extract_text(b""),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_process_document() {
        let data = process_document(&PlainTextExtractor, SPAR_SLIP.as_bytes(), DocumentType::Receipt)
            .unwrap();
        assert_eq!(data.vendor, "SPAR Rosebank");
    }

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("Invoice".parse::<DocumentType>().unwrap(), DocumentType::Invoice);
        assert_eq!(" receipt ".parse::<DocumentType>().unwrap(), DocumentType::Receipt);
        assert!("statement".parse::<DocumentType>().is_err());
        assert_eq!(DocumentType::default().to_string(), "receipt");
    }
}
