//! Bundled bootstrap corpus
//!
//! Used to fit the first classifier when no persisted model exists. Covers
//! every category at least twice.

use crate::models::Category;

pub const SEED_CORPUS: &[(&str, Category)] = &[
    ("monthly rent payment", Category::Rent),
    ("office space rental", Category::Rent),
    ("electricity bill", Category::Utilities),
    ("water and sanitation", Category::Utilities),
    ("internet service provider", Category::Utilities),
    ("petrol station", Category::Fuel),
    ("diesel fuel", Category::Fuel),
    ("uber trip", Category::Transport),
    ("taxi fare", Category::Transport),
    ("bus ticket", Category::Transport),
    ("printer paper", Category::OfficeSupplies),
    ("stationery store", Category::OfficeSupplies),
    ("google ads", Category::Marketing),
    ("facebook advertising", Category::Marketing),
    ("salary payment", Category::Salaries),
    ("staff wages", Category::Salaries),
    ("stock purchase", Category::Inventory),
    ("supplier payment", Category::Inventory),
    ("restaurant", Category::MealsAndEntertainment),
    ("coffee shop", Category::MealsAndEntertainment),
    ("accountant fees", Category::ProfessionalFees),
    ("legal services", Category::ProfessionalFees),
    ("business insurance", Category::Insurance),
    ("vehicle insurance", Category::Insurance),
    ("repair services", Category::Maintenance),
    ("building maintenance", Category::Maintenance),
    ("software subscription", Category::Technology),
    ("cloud hosting", Category::Technology),
    ("bank service fee", Category::BankCharges),
    ("transaction fee", Category::BankCharges),
    ("vat payment", Category::Taxes),
    ("income tax", Category::Taxes),
    ("miscellaneous expense", Category::Other),
    ("sundry items", Category::Other),
    ("charity donation", Category::Other),
];
