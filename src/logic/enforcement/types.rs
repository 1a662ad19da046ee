//! Enforcement Types
//!
//! Core types cho enforcement state machine.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::logic::decision::Decision;

// ============================================================================
// USER RESPONSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserResponse {
    Proceed,
    Cancel,
    /// No question was asked (ALLOW / BLOCK)
    None,
}

impl UserResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserResponse::Proceed => "PROCEED",
            UserResponse::Cancel => "CANCEL",
            UserResponse::None => "NONE",
        }
    }
}

impl std::fmt::Display for UserResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// STATE MACHINE
// ============================================================================

/// PENDING -> {ALLOWED, BLOCKED, AWAITING_USER -> {PROCEEDED, CANCELLED}}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementState {
    Pending,
    Allowed,
    Blocked,
    AwaitingUser,
    Proceeded,
    Cancelled,
}

impl EnforcementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementState::Pending => "PENDING",
            EnforcementState::Allowed => "ALLOWED",
            EnforcementState::Blocked => "BLOCKED",
            EnforcementState::AwaitingUser => "AWAITING_USER",
            EnforcementState::Proceeded => "PROCEEDED",
            EnforcementState::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EnforcementState::Allowed
                | EnforcementState::Blocked
                | EnforcementState::Proceeded
                | EnforcementState::Cancelled
        )
    }

    /// Legal transitions only
    pub fn can_transition_to(&self, next: EnforcementState) -> bool {
        use EnforcementState::*;
        matches!(
            (self, next),
            (Pending, Allowed)
                | (Pending, Blocked)
                | (Pending, Cancelled)
                | (Pending, AwaitingUser)
                | (AwaitingUser, Proceeded)
                | (AwaitingUser, Cancelled)
        )
    }
}

impl std::fmt::Display for EnforcementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementResult {
    pub event_id: String,
    pub decision: Decision,
    /// true = download may proceed
    pub enforced: bool,
    pub user_response: UserResponse,
    pub notified: bool,
    pub state: EnforcementState,
}

// ============================================================================
// USER INTERACTION
// ============================================================================

/// Answer from a `UserPrompt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Cancel,
    Timeout,
}

/// What the user is asked on a WARN
#[derive(Debug, Clone)]
pub struct ConfirmationPrompt {
    pub event_id: String,
    pub filename: String,
    pub reason: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Critical,
}

impl NotificationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationSeverity::Info => "info",
            NotificationSeverity::Warning => "warning",
            NotificationSeverity::Critical => "critical",
        }
    }

    pub fn for_decision(decision: Decision) -> Self {
        match decision {
            Decision::Allow => NotificationSeverity::Info,
            Decision::Warn => NotificationSeverity::Warning,
            Decision::Block => NotificationSeverity::Critical,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("prompt unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification backend unavailable: {0}")]
    Unavailable(String),
    #[error("notification failed: {0}")]
    Failed(String),
}
