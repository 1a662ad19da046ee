//! Tests for the enforcement state machine

#[cfg(test)]
mod controller_tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::logic::decision::{BestScores, Decision, DecisionResult, Evidence};
    use crate::logic::enforcement::{
        Confirmation, ConfirmationPrompt, ConsolePrompt, EnforcementConfig, EnforcementController,
        EnforcementState, NotificationSeverity, Notifier, NotifyError, PromptError, UserPrompt,
        UserResponse,
    };

    // ------------------------------------------------------------------------
    // Test doubles
    // ------------------------------------------------------------------------

    enum Script {
        Answer(Confirmation),
        Hang,
        Fail,
        Panic,
    }

    struct ScriptedPrompt {
        script: Script,
        asked: Mutex<u32>,
    }

    impl ScriptedPrompt {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                asked: Mutex::new(0),
            })
        }

        fn asked(&self) -> u32 {
            *self.asked.lock()
        }
    }

    #[async_trait]
    impl UserPrompt for ScriptedPrompt {
        async fn confirm(
            &self,
            _prompt: &ConfirmationPrompt,
            _deadline: Duration,
        ) -> Result<Confirmation, PromptError> {
            *self.asked.lock() += 1;
            match self.script {
                Script::Answer(answer) => Ok(answer),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Confirmation::Proceed)
                }
                Script::Fail => Err(PromptError::Unavailable("no terminal".to_string())),
                Script::Panic => panic!("prompt exploded"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, NotificationSeverity)>>,
        fail: bool,
        panic: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(
            &self,
            title: &str,
            _body: &str,
            severity: NotificationSeverity,
        ) -> Result<(), NotifyError> {
            if self.panic {
                panic!("notifier exploded");
            }
            self.sent.lock().push((title.to_string(), severity));
            if self.fail {
                return Err(NotifyError::Failed("toast service down".to_string()));
            }
            Ok(())
        }
    }

    fn decision(kind: Decision) -> DecisionResult {
        DecisionResult {
            event_id: "evt-enforce".to_string(),
            decision: kind,
            triggered_rules: Vec::new(),
            scores: BestScores::default(),
            evidence: Evidence::Scored,
            explanation: "test explanation".to_string(),
        }
    }

    fn controller(
        config: EnforcementConfig,
        prompt: Arc<ScriptedPrompt>,
        notifier: Arc<RecordingNotifier>,
    ) -> EnforcementController {
        EnforcementController::new(config, prompt, notifier)
            .with_deadline(Duration::from_millis(100))
    }

    // ------------------------------------------------------------------------
    // ALLOW / BLOCK
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_allow_without_notification_by_default() {
        let prompt = ScriptedPrompt::new(Script::Answer(Confirmation::Proceed));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctl = controller(EnforcementConfig::default(), prompt.clone(), notifier.clone());

        let result = ctl.enforce(&decision(Decision::Allow), "a.txt").await;

        assert!(result.enforced);
        assert!(!result.notified);
        assert_eq!(result.user_response, UserResponse::None);
        assert_eq!(result.state, EnforcementState::Allowed);
        assert!(notifier.sent.lock().is_empty());
        assert_eq!(prompt.asked(), 0);
    }

    #[tokio::test]
    async fn test_allow_notification_when_enabled() {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = EnforcementConfig {
            allow_enforcement: true,
            ..Default::default()
        };
        let ctl = controller(config, ScriptedPrompt::new(Script::Fail), notifier.clone());

        let result = ctl.enforce(&decision(Decision::Allow), "a.txt").await;

        assert!(result.notified);
        assert_eq!(
            notifier.sent.lock()[0],
            ("Download Allowed".to_string(), NotificationSeverity::Info)
        );
    }

    #[tokio::test]
    async fn test_block_is_not_overridable() {
        let prompt = ScriptedPrompt::new(Script::Answer(Confirmation::Proceed));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctl = controller(EnforcementConfig::default(), prompt.clone(), notifier.clone());

        let result = ctl.enforce(&decision(Decision::Block), "secret.pdf").await;

        assert!(!result.enforced);
        assert!(result.notified);
        assert_eq!(result.user_response, UserResponse::None);
        assert_eq!(result.state, EnforcementState::Blocked);
        assert_eq!(notifier.sent.lock()[0].1, NotificationSeverity::Critical);
        assert_eq!(prompt.asked(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_is_contained() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let ctl = controller(
            EnforcementConfig::default(),
            ScriptedPrompt::new(Script::Fail),
            notifier,
        );

        let result = ctl.enforce(&decision(Decision::Block), "secret.pdf").await;
        assert!(!result.enforced);
        assert!(!result.notified);
        assert_eq!(result.state, EnforcementState::Blocked);
    }

    #[tokio::test]
    async fn test_notification_panic_is_contained() {
        let notifier = Arc::new(RecordingNotifier {
            panic: true,
            ..Default::default()
        });
        let prompt = ScriptedPrompt::new(Script::Answer(Confirmation::Proceed));
        let ctl = controller(EnforcementConfig::default(), prompt, notifier);

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;
        assert!(!result.notified);
        assert!(result.enforced);
        assert_eq!(result.state, EnforcementState::Proceeded);
    }

    // ------------------------------------------------------------------------
    // WARN
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_warn_proceed() {
        let prompt = ScriptedPrompt::new(Script::Answer(Confirmation::Proceed));
        let notifier = Arc::new(RecordingNotifier::default());
        let ctl = controller(EnforcementConfig::default(), prompt.clone(), notifier.clone());

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;

        assert!(result.enforced);
        assert!(result.notified);
        assert_eq!(result.user_response, UserResponse::Proceed);
        assert_eq!(result.state, EnforcementState::Proceeded);
        assert_eq!(prompt.asked(), 1);
        assert_eq!(notifier.sent.lock()[0].1, NotificationSeverity::Warning);
    }

    #[tokio::test]
    async fn test_warn_cancel() {
        let ctl = controller(
            EnforcementConfig::default(),
            ScriptedPrompt::new(Script::Answer(Confirmation::Cancel)),
            Arc::new(RecordingNotifier::default()),
        );

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;
        assert!(!result.enforced);
        assert_eq!(result.user_response, UserResponse::Cancel);
        assert_eq!(result.state, EnforcementState::Cancelled);
    }

    #[tokio::test]
    async fn test_warn_timeout_cancels() {
        let ctl = controller(
            EnforcementConfig::default(),
            ScriptedPrompt::new(Script::Hang),
            Arc::new(RecordingNotifier::default()),
        );

        let started = std::time::Instant::now();
        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!result.enforced);
        assert_eq!(result.user_response, UserResponse::Cancel);
        assert_eq!(result.state, EnforcementState::Cancelled);
    }

    #[tokio::test]
    async fn test_console_answer_after_timed_out_prompt_proceeds() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let ctl = EnforcementController::new(
            EnforcementConfig::default(),
            Arc::new(ConsolePrompt::from_lines(rx)),
            Arc::new(RecordingNotifier::default()),
        )
        .with_deadline(Duration::from_millis(300));

        // Nobody answers the first question
        let first = ctl.enforce(&decision(Decision::Warn), "first.docx").await;
        assert_eq!(first.user_response, UserResponse::Cancel);

        let typist = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = typist.send(Ok("p".to_string()));
        });
        let second = ctl.enforce(&decision(Decision::Warn), "second.docx").await;

        assert!(second.enforced);
        assert_eq!(second.user_response, UserResponse::Proceed);
        assert_eq!(second.state, EnforcementState::Proceeded);
    }

    #[tokio::test]
    async fn test_warn_prompt_error_cancels() {
        let ctl = controller(
            EnforcementConfig::default(),
            ScriptedPrompt::new(Script::Fail),
            Arc::new(RecordingNotifier::default()),
        );

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;
        assert!(!result.enforced);
        assert_eq!(result.user_response, UserResponse::Cancel);
    }

    #[tokio::test]
    async fn test_warn_prompt_panic_cancels() {
        let ctl = controller(
            EnforcementConfig::default(),
            ScriptedPrompt::new(Script::Panic),
            Arc::new(RecordingNotifier::default()),
        );

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;
        assert!(!result.enforced);
        assert_eq!(result.user_response, UserResponse::Cancel);
        assert_eq!(result.state, EnforcementState::Cancelled);
    }

    #[tokio::test]
    async fn test_warn_enforcement_disabled_skips_prompt() {
        let prompt = ScriptedPrompt::new(Script::Answer(Confirmation::Proceed));
        let notifier = Arc::new(RecordingNotifier::default());
        let config = EnforcementConfig {
            warn_enforcement: false,
            ..Default::default()
        };
        let ctl = controller(config, prompt.clone(), notifier.clone());

        let result = ctl.enforce(&decision(Decision::Warn), "plan.docx").await;

        assert!(!result.enforced);
        assert!(!result.notified);
        assert_eq!(result.user_response, UserResponse::Cancel);
        assert_eq!(result.state, EnforcementState::Cancelled);
        assert_eq!(prompt.asked(), 0);
        assert!(notifier.sent.lock().is_empty());
    }

    #[test]
    fn test_state_transitions() {
        use EnforcementState::*;
        assert!(Pending.can_transition_to(AwaitingUser));
        assert!(AwaitingUser.can_transition_to(Proceeded));
        assert!(!Blocked.can_transition_to(Proceeded));
        assert!(!AwaitingUser.can_transition_to(Allowed));
        assert!(Cancelled.is_terminal());
        assert!(!AwaitingUser.is_terminal());
    }
}
