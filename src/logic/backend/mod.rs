//! Backend Module
//!
//! HTTP clients cho scoring service (lookup) và audit feedback.
//! Lỗi mạng không bao giờ lan ra ngoài - lookup lỗi = không có matches.

pub mod lookup;
pub mod feedback;


pub use lookup::{
    lookup_or_none, validate_lookup_response, HttpScoringClient, LookupFailure, LookupRequest,
    LookupResponse, MatchEntry, ScoringService,
};
pub use feedback::{send_and_log, FeedbackError, FeedbackRecord, FeedbackSink, HttpFeedbackClient};
