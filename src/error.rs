//! Error types for Reading Insight
//!
//! The insight core itself is total; these errors only surface at the
//! boundaries (parsing sessions and config, replaying event logs, render sinks).

use thiserror::Error;

/// Errors that can occur around the insight engine
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid block id: {0}")]
    InvalidBlockId(String),

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Invalid reading session: {0}")]
    InvalidSession(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Render sink failure: {0}")]
    RenderError(String),
}
