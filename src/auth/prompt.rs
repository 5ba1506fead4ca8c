//! User-facing credential prompts
//!
//! Recovery from a rejected secret needs exactly two UI surfaces: a blocking
//! notice that the stored secret was rejected, and a blocking input prompt
//! for its replacement. Both are behind [`CredentialPrompt`] so the
//! interceptor can run headless or under test.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use thiserror::Error;

/// Notice shown when a stored secret was rejected by the server
pub const REJECTED_NOTICE: &str = "Stored bridge API secret was rejected. Please re-enter.";

/// Label of the input prompt for a replacement secret
pub const SECRET_PROMPT: &str = "Bridge API secret:";

/// Errors that can occur while talking to the user
#[derive(Debug, Error)]
pub enum PromptError {
    /// Terminal read or write failed
    #[error("Prompt I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking prompt task did not complete
    #[error("Prompt task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Source of replacement secrets
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Tells the user that the stored secret was rejected
    async fn notify_rejected(&self) -> Result<(), PromptError>;

    /// Asks the user for a new secret
    ///
    /// Returns `None` if the user cancelled.
    async fn request_secret(&self) -> Result<Option<String>, PromptError>;
}

/// Prompt that reads from stdin and writes to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn notify_rejected(&self) -> Result<(), PromptError> {
        tokio::task::spawn_blocking(|| {
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "{}", REJECTED_NOTICE)?;
            stderr.flush()
        })
        .await??;
        Ok(())
    }

    async fn request_secret(&self) -> Result<Option<String>, PromptError> {
        let answer = tokio::task::spawn_blocking(|| {
            let stdin = std::io::stdin();
            read_answer(&mut stdin.lock(), &mut std::io::stderr().lock())
        })
        .await??;
        Ok(answer)
    }
}

/// Prompt for unattended use: never asks, always cancels
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractivePrompt;

#[async_trait]
impl CredentialPrompt for NonInteractivePrompt {
    async fn notify_rejected(&self) -> Result<(), PromptError> {
        tracing::warn!("{}", REJECTED_NOTICE);
        Ok(())
    }

    async fn request_secret(&self) -> Result<Option<String>, PromptError> {
        tracing::debug!("Non-interactive session, not prompting for a bridge secret");
        Ok(None)
    }
}

/// Writes the prompt label and reads one line of input
///
/// End of input counts as a cancel. The answer is returned untrimmed apart
/// from the line terminator; normalization happens in the secret store.
fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> std::io::Result<Option<String>> {
    write!(output, "{} ", SECRET_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }

    let answer = line.trim_end_matches(['\r', '\n']);
    if answer.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_string()))
    }
}
