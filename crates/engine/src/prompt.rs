//! Operator input capabilities.
//!
//! The engine never probes process-global state to decide whether it can
//! prompt; the host selects a variant at startup (typically from
//! `std::io::IsTerminal` on stdin) and injects it.

use async_trait::async_trait;
use tracing::warn;

/// Interactive text solicitation.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Ask the operator for a value. Returns `None` when no input is
    /// available; implementations must report that immediately rather than
    /// block waiting for a channel that does not exist.
    async fn ask(&self, prompt: &str) -> Option<String>;
}

/// Hook the host can register to quiesce its own output (progress bars,
/// variable trackers) while a prompt is on screen. Best-effort; hosts
/// without one simply pass nothing.
pub trait PromptQuiet: Send + Sync {
    fn pause(&self);
    fn resume(&self);
}

/// Prompt variant for interactive terminals, backed by `dialoguer`.
#[derive(Debug, Default)]
pub struct InteractivePrompt;

#[async_trait]
impl OperatorPrompt for InteractivePrompt {
    async fn ask(&self, prompt: &str) -> Option<String> {
        let prompt = prompt.to_string();
        // Terminal interaction blocks; keep it off the async worker thread.
        let answer = tokio::task::spawn_blocking(move || {
            dialoguer::Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(text)) if !text.is_empty() => Some(text),
            Ok(Ok(_)) => None,
            Ok(Err(error)) => {
                warn!(%error, "operator prompt failed");
                None
            }
            Err(error) => {
                warn!(%error, "operator prompt task failed");
                None
            }
        }
    }
}

/// Prompt variant for environments without an interactive channel (CI,
/// piped stdin). Reports "no input" immediately.
#[derive(Debug, Default)]
pub struct NonInteractivePrompt;

#[async_trait]
impl OperatorPrompt for NonInteractivePrompt {
    async fn ask(&self, _prompt: &str) -> Option<String> {
        None
    }
}
