//! One-Shield DLP Agent
//!
//! Fingerprints downloaded files, fuses similarity scores into an
//! ALLOW / WARN / BLOCK decision and enforces it.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{AgentError, AgentResult};
pub use logic::config::AgentConfig;
pub use logic::pipeline::{DownloadEvent, EventPipeline, EventRejected, PipelineOutcome};
