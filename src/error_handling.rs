// src/error_handling.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while ingesting, comparing, or persisting catalog data.
///
/// Scoring and grouping never fail; everything that can go wrong happens at the
/// system boundary (loading records, reading files, building a comparison).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    #[error("Catalog source unavailable ({source_name}): {message}")]
    Unavailable { source_name: String, message: String },

    #[error("Malformed catalog file {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Comparison already holds the maximum of {max} entries")]
    ComparisonFull { max: usize },

    #[error("No catalog entry matches '{0}'")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CatalogError {
    /// Shorthand used by the ingestion code.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidEntry {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::{Context, Result, Error};
