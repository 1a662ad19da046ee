//! Audit Feedback
//!
//! One record per processed event, sent fire-and-forget.
//! Never retried, never persisted.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::error::AgentResult;
use crate::logic::decision::{Decision, DecisionResult};
use crate::logic::enforcement::{EnforcementResult, UserResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub agent_id: String,
    pub event_id: String,
    pub decision: Decision,
    pub user_action: UserResponse,
    pub reason_code: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}

impl FeedbackRecord {
    /// Normalizes user_action: NONE for ALLOW/BLOCK, PROCEED|CANCEL for WARN
    pub fn from_outcome(
        agent_id: &str,
        decision: &DecisionResult,
        enforcement: &EnforcementResult,
        now: DateTime<Utc>,
    ) -> Self {
        let user_action = match decision.decision {
            Decision::Allow | Decision::Block => UserResponse::None,
            Decision::Warn => match enforcement.user_response {
                UserResponse::Proceed => UserResponse::Proceed,
                UserResponse::Cancel | UserResponse::None => UserResponse::Cancel,
            },
        };

        Self {
            agent_id: agent_id.to_string(),
            event_id: decision.event_id.clone(),
            decision: decision.decision,
            user_action,
            reason_code: decision.reason_code(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn validate(&self) -> Result<(), FeedbackError> {
        let invalid = |msg: &str| Err(FeedbackError::InvalidPayload(msg.to_string()));

        if self.agent_id.trim().is_empty() {
            return invalid("agent_id must be non-empty");
        }
        if self.event_id.trim().is_empty() {
            return invalid("event_id must be non-empty");
        }
        match (self.decision, self.user_action) {
            (Decision::Allow | Decision::Block, UserResponse::None) => {}
            (Decision::Allow | Decision::Block, _) => {
                return invalid("ALLOW and BLOCK must have user_action NONE");
            }
            (Decision::Warn, UserResponse::Proceed | UserResponse::Cancel) => {}
            (Decision::Warn, UserResponse::None) => {
                return invalid("WARN must have user_action PROCEED or CANCEL");
            }
        }
        if self.reason_code.trim().is_empty() {
            return invalid("reason_code must be non-empty");
        }
        if DateTime::parse_from_rfc3339(&self.timestamp).is_err() {
            return invalid("timestamp must be RFC 3339");
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("invalid feedback payload: {0}")]
    InvalidPayload(String),
    #[error("feedback timed out")]
    Timeout,
    #[error("feedback transport failed: {0}")]
    Transport(String),
    #[error("backend rejected feedback with HTTP {0}")]
    Rejected(u16),
}

impl From<reqwest::Error> for FeedbackError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedbackError::Timeout
        } else {
            FeedbackError::Transport(e.to_string())
        }
    }
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn send(&self, record: &FeedbackRecord) -> Result<(), FeedbackError>;
}

/// POST {base}/api/v1/agent/feedback
pub struct HttpFeedbackClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpFeedbackClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> AgentResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: format!("{}/api/v1/agent/feedback", base_url.trim_end_matches('/')),
            api_key,
            http_client,
        })
    }
}

#[async_trait]
impl FeedbackSink for HttpFeedbackClient {
    async fn send(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        record.validate()?;

        let mut builder = self.http_client.post(&self.endpoint).json(record);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if response.status().is_success() {
            log::info!(
                "[FEEDBACK] Sent {} {} {}",
                record.event_id,
                record.decision,
                record.user_action
            );
            Ok(())
        } else {
            Err(FeedbackError::Rejected(response.status().as_u16()))
        }
    }
}

/// Send and log; the outcome never reaches the caller
pub async fn send_and_log(sink: &dyn FeedbackSink, record: &FeedbackRecord) {
    if let Err(e) = sink.send(record).await {
        log::warn!("[FEEDBACK] {} not delivered: {}", record.event_id, e);
    }
}
