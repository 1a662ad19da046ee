//! Enforcement Module
//!
//! Thực thi quyết định: thông báo, hỏi user khi WARN (có deadline).
//! Hết hạn / lỗi / input sai -> luôn CANCEL, không bao giờ PROCEED.
//!
//! ## Structure
//! - `types`: UserResponse, EnforcementState, EnforcementResult
//! - `prompt`: UserPrompt (console / silent)
//! - `notifier`: Notifier (log)
//! - `controller`: State machine

pub mod types;
pub mod prompt;
pub mod notifier;
pub mod controller;

#[cfg(test)]
mod tests;

pub use types::{
    Confirmation, ConfirmationPrompt, EnforcementResult, EnforcementState, NotificationSeverity,
    NotifyError, PromptError, UserResponse,
};
pub use prompt::{parse_response, ConsolePrompt, InputLine, SilentPrompt, UserPrompt};
pub use notifier::{LogNotifier, Notifier};
pub use controller::{EnforcementConfig, EnforcementController};
