//! Error handling
//!
//! Errors that can escape to the composition root. Everything inside the
//! per-event pipeline recovers locally and never surfaces here.

use std::path::PathBuf;
use thiserror::Error;

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Config file unreadable
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `AgentConfig`
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config loaded but values are inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reference pool file could not be loaded
    #[error("failed to load reference pool {path}: {reason}")]
    ReferencePool { path: PathBuf, reason: String },

    /// HTTP client construction failed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
