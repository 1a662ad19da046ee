//! Notifications

use super::types::{NotificationSeverity, NotifyError};
use crate::constants::APP_NAME;

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, severity: NotificationSeverity)
        -> Result<(), NotifyError>;
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(
        &self,
        title: &str,
        body: &str,
        severity: NotificationSeverity,
    ) -> Result<(), NotifyError> {
        let body = body.replace('\n', " | ");
        match severity {
            NotificationSeverity::Info => log::info!("[{}] {}: {}", APP_NAME, title, body),
            NotificationSeverity::Warning => log::warn!("[{}] {}: {}", APP_NAME, title, body),
            NotificationSeverity::Critical => log::error!("[{}] {}: {}", APP_NAME, title, body),
        }
        Ok(())
    }
}
