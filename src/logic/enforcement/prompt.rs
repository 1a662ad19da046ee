//! User Confirmation Prompts
//!
//! `ConsolePrompt` asks on the terminal, `SilentPrompt` never asks.
//! The deadline itself is enforced by the controller.

use async_trait::async_trait;
use std::io::{self, BufRead, BufReader};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

use super::types::{Confirmation, ConfirmationPrompt, PromptError};

#[async_trait]
pub trait UserPrompt: Send + Sync {
    async fn confirm(
        &self,
        prompt: &ConfirmationPrompt,
        deadline: Duration,
    ) -> Result<Confirmation, PromptError>;
}

/// Map one answer line. Anything unrecognised is CANCEL.
pub fn parse_response(line: &str) -> Confirmation {
    match line.trim().to_lowercase().as_str() {
        "p" | "proceed" | "y" | "yes" => Confirmation::Proceed,
        "c" | "cancel" | "n" | "no" => Confirmation::Cancel,
        other => {
            log::debug!("[ENFORCE] Unrecognised answer {:?}, treating as cancel", other);
            Confirmation::Cancel
        }
    }
}

// ============================================================================
// CONSOLE
// ============================================================================

/// One line of user input as delivered by the reader
pub type InputLine = io::Result<String>;

/// Terminal prompt (stderr for the question, stdin for the answer).
///
/// One reader thread owns the input for the whole process and forwards
/// lines over a channel. A prompt abandoned at its deadline only stops
/// waiting on the channel; the next answer still reaches the next prompt.
pub struct ConsolePrompt {
    lines: Mutex<mpsc::UnboundedReceiver<InputLine>>,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(io::stdin()))
    }

    /// Read answers from any line source on a dedicated thread
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::from_lines(spawn_line_reader(reader))
    }

    /// Answers delivered by the caller. Closing the sender is end of input.
    pub fn from_lines(lines: mpsc::UnboundedReceiver<InputLine>) -> Self {
        Self {
            lines: Mutex::new(lines),
        }
    }

    fn render(prompt: &ConfirmationPrompt, deadline: Duration) -> String {
        let rule = "=".repeat(70);
        format!(
            "\n{rule}\nFILE WARNING\n{rule}\nFile: {}\nReason: {}\n\nWhat would you like to do?\n  [p] Proceed with download\n  [c] Cancel download\n\nDefault (no response in {}s): Cancel\n{rule}\n> ",
            prompt.filename,
            prompt.reason,
            deadline.as_secs(),
        )
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Detached thread: never joined, so it cannot hold up runtime shutdown
fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<InputLine>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let spawned = std::thread::Builder::new()
        .name("console-prompt".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
            log::debug!("[ENFORCE] Console input closed");
        });

    // A failed spawn drops the sender: every prompt sees end of input
    if let Err(e) = spawned {
        log::error!("[ENFORCE] Console reader thread failed to start: {}", e);
    }
    rx
}

#[async_trait]
impl UserPrompt for ConsolePrompt {
    async fn confirm(
        &self,
        prompt: &ConfirmationPrompt,
        deadline: Duration,
    ) -> Result<Confirmation, PromptError> {
        let mut lines = self.lines.lock().await;

        // Typed while nobody was asking
        let mut stale = 0usize;
        while lines.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            log::debug!("[ENFORCE] Discarded {} stale input line(s)", stale);
        }

        eprint!("{}", Self::render(prompt, deadline));

        match lines.recv().await {
            Some(Ok(line)) => Ok(parse_response(&line)),
            Some(Err(e)) => Err(PromptError::Io(e)),
            None => {
                log::debug!("[ENFORCE] End of input while waiting for answer");
                Ok(Confirmation::Cancel)
            }
        }
    }
}

// ============================================================================
// SILENT
// ============================================================================

/// Non-interactive mode: every WARN resolves to CANCEL
#[derive(Debug, Default, Clone)]
pub struct SilentPrompt;

#[async_trait]
impl UserPrompt for SilentPrompt {
    async fn confirm(
        &self,
        prompt: &ConfirmationPrompt,
        _deadline: Duration,
    ) -> Result<Confirmation, PromptError> {
        log::info!(
            "[ENFORCE] Non-interactive mode, cancelling {} ({})",
            prompt.event_id,
            prompt.filename
        );
        Ok(Confirmation::Cancel)
    }
}
