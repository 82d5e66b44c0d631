//! Crate-wide error type.

use std::fmt;

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"generation.coal"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("invalid configuration:{}", format_config_errors(.0))]
    Config(Vec<ConfigError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("an optimization is already in progress")]
    OptimizerBusy,

    #[error("optimization did not complete: {0}")]
    OptimizationFailed(String),

    #[error("optimization notification failed: {0}")]
    Notification(String),
}

impl From<ConfigError> for GridError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn format_config_errors(errors: &[ConfigError]) -> String {
    errors.iter().map(|e| format!("\n  {e}")).collect()
}

pub type GridResult<T> = Result<T, GridError>;
