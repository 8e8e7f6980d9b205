//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config resolution, opening the categorizer)
//! - `extract` - Receipt/invoice extraction
//! - `feedback` - Feedback log commands (add, list)
//! - `predict` - Single-description categorization
//! - `serve` - Web server command
//! - `status` - Model and feedback status
//! - `training` - Retraining from feedback

pub mod core;
pub mod extract;
pub mod feedback;
pub mod predict;
pub mod serve;
pub mod status;
pub mod training;

// Re-export command functions for main.rs
pub use core::*;
pub use extract::*;
pub use feedback::*;
pub use predict::*;
pub use serve::*;
pub use status::*;
pub use training::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
