//! Unified error handling for the cleaning pipeline.
//!
//! Malformed vendor data and collaborator failures are fatal and propagate
//! unchanged through `?`. An empty result is never an error.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Errors produced by the pipeline and its I/O collaborators.
#[derive(Debug, Error)]
pub enum CleanError {
    /// A vendor record carried a missing or non-numeric field.
    #[error("malformed field `{field}` in record {record}: {reason}")]
    DataFormat {
        field: String,
        record: usize,
        reason: String,
    },

    /// The vendor point fetch failed. Propagated unchanged; retry policy
    /// belongs to the caller, not this layer.
    #[error("vendor fetch failed: {0}")]
    Fetch(String),

    /// The elevation lookup failed, or a grid was required but not supplied.
    #[error("elevation lookup failed: {0}")]
    Elevation(String),

    /// A configuration value could not be interpreted.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleanError {
    /// Shorthand for [`CleanError::DataFormat`].
    pub fn data_format(field: &str, record: usize, reason: impl Into<String>) -> Self {
        CleanError::DataFormat {
            field: field.to_string(),
            record,
            reason: reason.into(),
        }
    }
}
