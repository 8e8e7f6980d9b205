//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod categorize;
pub mod documents;
pub mod feedback;
pub mod health;
pub mod training;

// Re-export all handlers for use in router
pub use categorize::*;
pub use documents::*;
pub use feedback::*;
pub use health::*;
pub use training::*;
