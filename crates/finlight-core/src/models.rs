//! Data models for FinLight

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Expense category, the closed label set of the categorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Rent,
    Utilities,
    Fuel,
    Transport,
    OfficeSupplies,
    Marketing,
    Salaries,
    Inventory,
    MealsAndEntertainment,
    ProfessionalFees,
    Insurance,
    Maintenance,
    Technology,
    BankCharges,
    Taxes,
    Other,
}

impl Category {
    /// Number of categories
    pub const COUNT: usize = 16;

    /// Display name (as shown to users and stored in the feedback log)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Utilities => "Utilities",
            Self::Fuel => "Fuel",
            Self::Transport => "Transport",
            Self::OfficeSupplies => "Office Supplies",
            Self::Marketing => "Marketing",
            Self::Salaries => "Salaries",
            Self::Inventory => "Inventory",
            Self::MealsAndEntertainment => "Meals & Entertainment",
            Self::ProfessionalFees => "Professional Fees",
            Self::Insurance => "Insurance",
            Self::Maintenance => "Maintenance",
            Self::Technology => "Technology",
            Self::BankCharges => "Bank Charges",
            Self::Taxes => "Taxes",
            Self::Other => "Other",
        }
    }

    /// snake_case key, accepted as an alternate spelling when parsing
    pub fn key(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Utilities => "utilities",
            Self::Fuel => "fuel",
            Self::Transport => "transport",
            Self::OfficeSupplies => "office_supplies",
            Self::Marketing => "marketing",
            Self::Salaries => "salaries",
            Self::Inventory => "inventory",
            Self::MealsAndEntertainment => "meals_and_entertainment",
            Self::ProfessionalFees => "professional_fees",
            Self::Insurance => "insurance",
            Self::Maintenance => "maintenance",
            Self::Technology => "technology",
            Self::BankCharges => "bank_charges",
            Self::Taxes => "taxes",
            Self::Other => "other",
        }
    }

    /// All categories in declaration order (the classifier's class order)
    pub fn all() -> &'static [Category] {
        &[
            Self::Rent,
            Self::Utilities,
            Self::Fuel,
            Self::Transport,
            Self::OfficeSupplies,
            Self::Marketing,
            Self::Salaries,
            Self::Inventory,
            Self::MealsAndEntertainment,
            Self::ProfessionalFees,
            Self::Insurance,
            Self::Maintenance,
            Self::Technology,
            Self::BankCharges,
            Self::Taxes,
            Self::Other,
        ]
    }

    /// Position in `Category::all()`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::all()
            .iter()
            .find(|c| c.as_str().to_lowercase() == needle || c.key() == needle)
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Direction of money movement on a bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction submitted for categorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub direction: Direction,
}

/// A runner-up category with its posterior probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub category: Category,
    pub confidence: f64,
}

/// Result of categorizing a single transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: Category,
    /// Raw posterior of the chosen category (not calibrated)
    pub confidence: f64,
    /// 2nd and 3rd most likely categories, descending
    pub alternatives: Vec<Alternative>,
}

/// Batch categorization row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionWithPrediction {
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    pub predicted_category: Category,
    pub confidence: f64,
}

/// A correction submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeedback {
    pub description: String,
    pub predicted_category: String,
    pub correct_category: String,
    pub amount: f64,
}

/// A stored correction (one row of the feedback log)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub description: String,
    pub predicted_category: String,
    /// Free text; validated against `Category` only at retrain time
    pub correct_category: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Where the in-memory classifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Deserialized from the persisted artifact
    Loaded,
    /// Fit from the bundled seed corpus
    Seeded,
    /// Fit from accumulated feedback
    Retrained,
    /// No model available
    Unavailable,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Seeded => "seeded",
            Self::Retrained => "retrained",
            Self::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a retrain request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrainOutcome {
    /// Classifier was refit and persisted
    Retrained {
        training_sample_count: usize,
        /// Rows ignored because their correct_category is not a known category
        skipped_records: usize,
    },
    /// Not enough feedback; nothing changed
    Skipped { reason: String },
}

impl RetrainOutcome {
    pub fn is_retrained(&self) -> bool {
        matches!(self, Self::Retrained { .. })
    }
}

/// Snapshot of the engine state for health/status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub ready: bool,
    pub source: ModelSource,
    pub class_count: usize,
    pub feature_count: usize,
    pub training_sample_count: usize,
    pub trained_at: Option<DateTime<Utc>>,
}
