//! Logic Module - DLP Engines
//!
//! Chứa các stages xử lý download events.
//!
//! ## Architecture
//! - `features/` - Fingerprint extraction (exact, fuzzy, semantic)
//! - `similarity/` - Matching against references
//! - `decision/` - ALLOW / WARN / BLOCK
//! - `enforcement/` - Notifications & user confirmation
//! - `backend/` - Scoring lookup & audit feedback clients
//! - `pipeline/` - Per-event orchestration

pub mod config;

pub mod features;
pub mod similarity;
pub mod decision;
pub mod enforcement;
pub mod backend;
pub mod pipeline;
