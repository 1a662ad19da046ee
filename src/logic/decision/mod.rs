//! Decision Module
//!
//! Quyết định ALLOW / WARN / BLOCK dựa trên similarity scores.
//! Backend chỉ trả scores - quyết định luôn nằm ở agent.
//!
//! ## Structure
//! - `types`: Decision, Rule, BestScores, DecisionResult
//! - `config`: Thresholds
//! - `engine`: Precedence chain
//! - `explain`: Human-readable explanation

pub mod types;
pub mod config;
pub mod engine;
pub mod explain;

pub use types::{BestScores, Decision, DecisionResult, Evidence, Rule};
pub use config::DecisionThresholds;
pub use engine::DecisionEngine;
pub use explain::render_explanation;
