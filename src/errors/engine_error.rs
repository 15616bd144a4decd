//! Custom error types for the engine

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Provider call timed out after {timeout:?}: {context}")]
    Timeout {
        context: String,
        timeout: Duration,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No security data for {trace_id}")]
    NoSecurityData {
        trace_id: String,
    },

    #[error("Audit log write failed: {message}")]
    Audit {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Missing or unreachable third-party data, as opposed to a local fault.
    ///
    /// Bridge-pool lookups degrade these to an empty result; startup
    /// validation skips the token.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            EngineError::Network { .. }
                | EngineError::Timeout { .. }
                | EngineError::DataParsing { .. }
                | EngineError::NoSecurityData { .. }
        )
    }
}

/// Failures of the validation pipeline itself, kept apart from rule rejections.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Validation failed for {trace_id}: {message}")]
    Fault {
        trace_id: String,
        message: String,
    },

    #[error("Asset {trace_id} is not approved for trading")]
    NotApproved {
        trace_id: String,
    },

    #[error("Audit trail unavailable for {trace_id}")]
    Audit {
        trace_id: String,
        #[source]
        source: EngineError,
    },
}
