//! Enforcement Controller
//!
//! Turns a decision into a user-facing action.
//!
//! - ALLOW: optional notification, download proceeds
//! - BLOCK: notification, no override
//! - WARN:  notification + confirmation with deadline; anything but an
//!          explicit PROCEED is CANCEL

use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use super::notifier::Notifier;
use super::prompt::UserPrompt;
use super::types::{
    Confirmation, ConfirmationPrompt, EnforcementResult, EnforcementState, NotificationSeverity,
    UserResponse,
};
use crate::constants;
use crate::logic::decision::{Decision, DecisionResult};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Notify on ALLOW
    pub allow_enforcement: bool,
    /// Ask the user on WARN (disabled = cancel without asking)
    pub warn_enforcement: bool,
    /// Notify on BLOCK
    pub block_enforcement: bool,
    pub warn_confirmation_timeout_secs: u64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            allow_enforcement: false,
            warn_enforcement: true,
            block_enforcement: true,
            warn_confirmation_timeout_secs: constants::DEFAULT_WARN_CONFIRMATION_TIMEOUT_SECS,
        }
    }
}

impl EnforcementConfig {
    pub fn warn_confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.warn_confirmation_timeout_secs)
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct EnforcementController {
    config: EnforcementConfig,
    prompt: Arc<dyn UserPrompt>,
    notifier: Arc<dyn Notifier>,
    /// Overrides `warn_confirmation_timeout_secs` (sub-second deadlines)
    deadline: Duration,
}

impl EnforcementController {
    pub fn new(
        config: EnforcementConfig,
        prompt: Arc<dyn UserPrompt>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let deadline = config.warn_confirmation_timeout();
        Self {
            config,
            prompt,
            notifier,
            deadline,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn enforce(&self, decision: &DecisionResult, filename: &str) -> EnforcementResult {
        let event_id = decision.event_id.as_str();
        let mut state = EnforcementState::Pending;

        match decision.decision {
            Decision::Allow => {
                let notified = self.config.allow_enforcement
                    && self.send(
                        event_id,
                        "Download Allowed",
                        &format!("File: {}\nNo threats detected.", filename),
                        Decision::Allow,
                    );
                advance(event_id, &mut state, EnforcementState::Allowed);
                log::info!("[ENFORCE] {} ALLOW (proceeding)", event_id);
                self.result(decision, true, UserResponse::None, notified, state)
            }

            Decision::Block => {
                let notified = self.config.block_enforcement
                    && self.send(
                        event_id,
                        "Download Blocked",
                        &format!(
                            "File: {}\n{}\nThis download has been blocked for safety.",
                            filename, decision.explanation
                        ),
                        Decision::Block,
                    );
                advance(event_id, &mut state, EnforcementState::Blocked);
                log::info!("[ENFORCE] {} BLOCK (immediate block, no override)", event_id);
                self.result(decision, false, UserResponse::None, notified, state)
            }

            Decision::Warn if !self.config.warn_enforcement => {
                advance(event_id, &mut state, EnforcementState::Cancelled);
                log::info!(
                    "[ENFORCE] {} WARN enforcement disabled (defaulting to cancel)",
                    event_id
                );
                self.result(decision, false, UserResponse::Cancel, false, state)
            }

            Decision::Warn => {
                let notified = self.send(
                    event_id,
                    "Download Warning",
                    &format!("File: {}\n{}", filename, decision.explanation),
                    Decision::Warn,
                );
                advance(event_id, &mut state, EnforcementState::AwaitingUser);

                let answer = self.await_confirmation(decision, filename).await;
                let (next, enforced, response) = match answer {
                    Confirmation::Proceed => {
                        (EnforcementState::Proceeded, true, UserResponse::Proceed)
                    }
                    Confirmation::Cancel | Confirmation::Timeout => {
                        (EnforcementState::Cancelled, false, UserResponse::Cancel)
                    }
                };
                advance(event_id, &mut state, next);
                log::info!(
                    "[ENFORCE] {} WARN resolved: {:?} -> {}",
                    event_id,
                    answer,
                    response
                );
                self.result(decision, enforced, response, notified, state)
            }
        }
    }

    /// Spawned prompt bounded by the deadline. Expiry aborts the task.
    async fn await_confirmation(&self, decision: &DecisionResult, filename: &str) -> Confirmation {
        let deadline = self.deadline;
        let request = ConfirmationPrompt {
            event_id: decision.event_id.clone(),
            filename: filename.to_string(),
            reason: decision.explanation.clone(),
            timeout: deadline,
        };
        let prompt = Arc::clone(&self.prompt);
        let mut task = tokio::spawn(async move { prompt.confirm(&request, deadline).await });

        match tokio::time::timeout(deadline, &mut task).await {
            Ok(Ok(Ok(answer))) => answer,
            Ok(Ok(Err(e))) => {
                log::warn!(
                    "[ENFORCE] {} prompt failed, cancelling: {}",
                    decision.event_id,
                    e
                );
                Confirmation::Cancel
            }
            Ok(Err(e)) => {
                log::error!(
                    "[ENFORCE] {} prompt task crashed, cancelling: {}",
                    decision.event_id,
                    e
                );
                Confirmation::Cancel
            }
            Err(_) => {
                task.abort();
                log::warn!(
                    "[ENFORCE] {} no answer within {:?}, cancelling",
                    decision.event_id,
                    deadline
                );
                Confirmation::Timeout
            }
        }
    }

    /// Notification failures (error or panic) never escape
    fn send(&self, event_id: &str, title: &str, body: &str, decision: Decision) -> bool {
        let severity = NotificationSeverity::for_decision(decision);
        let notifier = &self.notifier;

        match catch_unwind(AssertUnwindSafe(|| notifier.notify(title, body, severity))) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                log::warn!("[ENFORCE] {} notification failed: {}", event_id, e);
                false
            }
            Err(_) => {
                log::error!("[ENFORCE] {} notification panicked", event_id);
                false
            }
        }
    }

    fn result(
        &self,
        decision: &DecisionResult,
        enforced: bool,
        user_response: UserResponse,
        notified: bool,
        state: EnforcementState,
    ) -> EnforcementResult {
        EnforcementResult {
            event_id: decision.event_id.clone(),
            decision: decision.decision,
            enforced,
            user_response,
            notified,
            state,
        }
    }
}

fn advance(event_id: &str, state: &mut EnforcementState, next: EnforcementState) {
    debug_assert!(state.can_transition_to(next), "{} -> {}", state, next);
    log::debug!("[ENFORCE] {} {} -> {}", event_id, state, next);
    *state = next;
}
