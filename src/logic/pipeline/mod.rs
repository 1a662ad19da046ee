//! Pipeline Module
//!
//! Điều phối 4 stages cho mỗi download event:
//! FingerprintExtractor -> SimilarityOrchestrator -> DecisionEngine -> EnforcementController
//! rồi gửi feedback (fire-and-forget).

pub mod events;
pub mod runner;

pub use events::{DownloadData, DownloadEvent, EventRejected, FILE_DOWNLOAD};
pub use runner::{EventPipeline, PipelineOutcome};
