//! Shared utilities for command implementations
//!
//! This module contains:
//! - `resolve_config` - Layer CLI flags over the service configuration
//! - `open_categorizer` - Load (or seed) the categorization model

use std::path::Path;

use anyhow::{bail, Context, Result};
use finlight_core::{Categorizer, ModelSource, ServiceConfig};

/// Resolve configuration: defaults < config file < environment < CLI flags
pub fn resolve_config(config_path: Option<&Path>, model_dir: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(dir) = model_dir {
        config.storage.model_dir = dir.to_path_buf();
    }
    Ok(config)
}

/// Open the categorizer, seeding a new model on first use
pub fn open_categorizer(config: &ServiceConfig) -> Result<(Categorizer, ModelSource)> {
    let categorizer = Categorizer::from_config(config);
    let source = categorizer.load_or_initialize();
    if source == ModelSource::Unavailable {
        bail!(
            "Categorization model unavailable (model dir: {})",
            config.storage.model_dir.display()
        );
    }
    Ok((categorizer, source))
}
