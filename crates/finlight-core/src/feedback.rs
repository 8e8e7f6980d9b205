//! Append-only feedback log
//!
//! Corrections are stored as CSV rows with the columns
//! `description,predicted_category,correct_category,amount,timestamp`.
//! The header is written when the file is first created; later appends only
//! add rows. Rows are never rewritten or removed.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{FeedbackRecord, NewFeedback};

/// Column order of the feedback log
pub const FEEDBACK_HEADER: [&str; 5] = [
    "description",
    "predicted_category",
    "correct_category",
    "amount",
    "timestamp",
];

/// Raw CSV row, before timestamp parsing
#[derive(Debug, Serialize, Deserialize)]
struct FeedbackRow {
    description: String,
    predicted_category: String,
    correct_category: String,
    amount: f64,
    timestamp: String,
}

impl From<&FeedbackRecord> for FeedbackRow {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            description: record.description.clone(),
            predicted_category: record.predicted_category.clone(),
            correct_category: record.correct_category.clone(),
            amount: record.amount,
            timestamp: record.timestamp.to_rfc3339(),
        }
    }
}

impl FeedbackRow {
    fn into_record(self, line: u64) -> Result<FeedbackRecord> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            Error::MalformedFeedbackRecord {
                line,
                reason: format!("invalid timestamp '{}'", self.timestamp),
            }
        })?;
        if !self.amount.is_finite() {
            return Err(Error::MalformedFeedbackRecord {
                line,
                reason: "amount is not a finite number".into(),
            });
        }
        Ok(FeedbackRecord {
            description: self.description,
            predicted_category: self.predicted_category,
            correct_category: self.correct_category,
            amount: self.amount,
            timestamp,
        })
    }
}

/// Parse an ISO-8601 timestamp. Offset-less values are taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Durable store of user corrections
pub struct FeedbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    /// Open (lazily) a feedback log at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a correction stamped with the current UTC time
    pub fn append(&self, feedback: &NewFeedback) -> Result<FeedbackRecord> {
        if !feedback.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Amount must be a finite number, got {}",
                feedback.amount
            )));
        }

        let record = FeedbackRecord {
            description: feedback.description.clone(),
            predicted_category: feedback.predicted_category.clone(),
            correct_category: feedback.correct_category.clone(),
            amount: feedback.amount,
            timestamp: Utc::now(),
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Persistence("Feedback log lock poisoned".into()))?;

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                Error::Persistence(format!(
                    "Failed to create feedback directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                Error::Persistence(format!(
                    "Failed to open feedback log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        let len = file.metadata()?.len();
        // A torn final row must not swallow the next one
        let needs_newline = len > 0 && {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            last[0] != b'\n'
        };
        if needs_newline {
            file.write_all(b"\n")?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if len == 0 {
            writer.write_record(FEEDBACK_HEADER)?;
        }
        writer.serialize(FeedbackRow::from(&record))?;
        writer.flush()?;

        let mut file = writer
            .into_inner()
            .map_err(|e| Error::Persistence(format!("Failed to flush feedback log: {}", e)))?;
        file.flush()?;
        file.sync_data()?;

        debug!(
            correct_category = %record.correct_category,
            "Appended feedback record"
        );
        Ok(record)
    }

    /// Read every well-formed record in insertion order
    ///
    /// Rows that fail to parse are logged and skipped. A missing log is an
    /// empty log.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Persistence(format!(
                    "Failed to open feedback log {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<FeedbackRow>().enumerate() {
            // Header is line 1
            let fallback_line = i as u64 + 2;
            let parsed = row
                .map_err(|e| Error::MalformedFeedbackRecord {
                    line: e
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(fallback_line),
                    reason: e.to_string(),
                })
                .and_then(|r| r.into_record(fallback_line));

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping malformed feedback row"),
            }
        }

        Ok(records)
    }

    /// Number of well-formed records
    pub fn count(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn feedback(description: &str, correct: &str) -> NewFeedback {
        NewFeedback {
            description: description.to_string(),
            predicted_category: "Transport".to_string(),
            correct_category: correct.to_string(),
            amount: 50.0,
        }
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.csv"));
        assert!(store.read_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_then_read_all() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.csv"));

        let before = Utc::now();
        let written = store.append(&feedback("uber trip", "Fuel")).unwrap();
        let records = store.read_all().unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.description, "uber trip");
        assert_eq!(r.predicted_category, "Transport");
        assert_eq!(r.correct_category, "Fuel");
        assert_eq!(r.amount, 50.0);
        assert!(r.timestamp >= before);
        assert_eq!(r.timestamp, written.timestamp);
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let store = FeedbackStore::new(&path);

        store.append(&feedback("taxi fare", "Transport")).unwrap();
        store.append(&feedback("diesel", "Fuel")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FEEDBACK_HEADER.join(","));
        assert_eq!(content.matches("description,").count(), 1);
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("nested").join("feedback.csv"));
        store.append(&feedback("printer paper", "Office Supplies")).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_preserves_insertion_order_and_quoting() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.csv"));

        store
            .append(&feedback("lunch, with \"client\"", "Meals & Entertainment"))
            .unwrap();
        store.append(&feedback("second", "Other")).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records[0].description, "lunch, with \"client\"");
        assert_eq!(records[0].correct_category, "Meals & Entertainment");
        assert_eq!(records[1].description, "second");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        fs::write(
            &path,
            "description,predicted_category,correct_category,amount,timestamp\n\
             good row,Transport,Fuel,10.5,2024-03-01T10:00:00+00:00\n\
             bad amount,Transport,Fuel,lots,2024-03-01T10:00:00+00:00\n\
             bad time,Transport,Fuel,1.0,yesterday\n\
             short row,Transport\n\
             legacy row,Rent,Rent,100,2024-03-01T10:00:00.123456\n",
        )
        .unwrap();

        let store = FeedbackStore::new(&path);
        let records = store.read_all().unwrap();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["good row", "legacy row"]);
    }

    #[test]
    fn test_append_after_existing_rows_keeps_them() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        fs::write(
            &path,
            "description,predicted_category,correct_category,amount,timestamp\n\
             existing,Rent,Rent,1,2024-01-01T00:00:00Z\n",
        )
        .unwrap();

        let store = FeedbackStore::new(&path);
        store.append(&feedback("new", "Fuel")).unwrap();
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "existing");
        assert_eq!(records[1].description, "new");
    }

    #[test]
    fn test_append_after_row_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        fs::write(
            &path,
            "description,predicted_category,correct_category,amount,timestamp\n\
             existing,Rent,Rent,1,2024-01-01T00:00:00Z",
        )
        .unwrap();

        let store = FeedbackStore::new(&path);
        store.append(&feedback("new", "Fuel")).unwrap();
        let records = store.read_all().unwrap();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["existing", "new"]);
        assert!(fs::read_to_string(&path).unwrap().ends_with('\n'));
    }

    #[test]
    fn test_append_rejects_non_finite_amount() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.csv"));
        let mut bad = feedback("uber trip", "Fuel");
        bad.amount = f64::NAN;
        assert!(matches!(store.append(&bad), Err(Error::InvalidData(_))));
        bad.amount = f64::INFINITY;
        assert!(matches!(store.append(&bad), Err(Error::InvalidData(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00.5+02:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-03-01 10:00:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
