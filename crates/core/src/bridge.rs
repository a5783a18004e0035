//! # Human-Input Bridge
//!
//! How a blocked analyst reaches a human. The capability is injected
//! into the collaborator at construction time: the chat-backed provider
//! publishes the review prompt to the event channel and waits on the
//! session mailbox, while the stdin provider keeps the plain console
//! behavior for CLI runs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::pipeline::{PipelineEvent, PipelineEventKind};
use crate::session::Session;

/// Capability to ask a human one free-text question.
#[async_trait]
pub trait HumanInputProvider: Send + Sync {
    /// Present `prompt` to a human and return their reply.
    async fn ask(&self, prompt: &str) -> Result<String>;
}

/// Chat-backed provider: the prompt goes out as a chat message, the
/// reply comes back through the session mailbox.
pub struct MailboxInputProvider {
    session: Arc<Session>,
    event_tx: mpsc::Sender<PipelineEvent>,
    timeout: Duration,
}

impl MailboxInputProvider {
    pub fn new(
        session: Arc<Session>,
        event_tx: mpsc::Sender<PipelineEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            session,
            event_tx,
            timeout,
        }
    }
}

#[async_trait]
impl HumanInputProvider for MailboxInputProvider {
    async fn ask(&self, prompt: &str) -> Result<String> {
        let _ = self
            .event_tx
            .send(
                PipelineEvent::new(PipelineEventKind::HumanInputRequired, "assistant")
                    .with_text(prompt),
            )
            .await;

        let reply = self
            .session
            .mailbox()
            .take(self.timeout)
            .await
            .context("the review prompt went unanswered")?;

        let _ = self
            .event_tx
            .send(
                PipelineEvent::new(PipelineEventKind::HumanInputReceived, "human")
                    .with_text(&reply),
            )
            .await;

        Ok(reply)
    }
}

/// Console provider for CLI runs: prints the prompt, reads one line.
pub struct StdinInputProvider;

#[async_trait]
impl HumanInputProvider for StdinInputProvider {
    async fn ask(&self, prompt: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\n{prompt}\n> ").as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader
            .read_line(&mut line)
            .await
            .context("failed to read a reply from the terminal")?;
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mailbox_provider_publishes_prompt_then_waits() {
        let session = Arc::new(Session::new());
        let (tx, mut rx) = mpsc::channel(8);
        let provider =
            MailboxInputProvider::new(session.clone(), tx, Duration::from_secs(5));

        let asker = tokio::spawn(async move { provider.ask("Is this draft good?").await });

        // The prompt must reach the channel before any reply exists.
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, PipelineEventKind::HumanInputRequired);
        assert_eq!(event.text.as_deref(), Some("Is this draft good?"));

        session.mailbox().deposit("Approved, please proceed.").await;
        let reply = asker.await.unwrap().unwrap();
        assert_eq!(reply, "Approved, please proceed.");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, PipelineEventKind::HumanInputReceived);
    }

    #[tokio::test]
    async fn test_mailbox_provider_rejection_then_approval_in_order() {
        let session = Arc::new(Session::new());
        let (tx, _rx) = mpsc::channel(8);
        let provider = Arc::new(MailboxInputProvider::new(
            session.clone(),
            tx,
            Duration::from_secs(5),
        ));

        let consumer = {
            let provider = provider.clone();
            tokio::spawn(async move {
                let first = provider.ask("Draft v1 ok?").await.unwrap();
                let second = provider.ask("Draft v2 ok?").await.unwrap();
                (first, second)
            })
        };

        session.mailbox().deposit("Try again.").await;
        // Wait for the first reply to be drained before depositing the next.
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.mailbox().deposit("Approved, please proceed.").await;

        let (first, second) = consumer.await.unwrap();
        assert_eq!(first, "Try again.");
        assert_eq!(second, "Approved, please proceed.");
    }

    #[tokio::test]
    async fn test_mailbox_provider_times_out_without_reply() {
        let session = Arc::new(Session::new());
        let (tx, _rx) = mpsc::channel(8);
        let provider =
            MailboxInputProvider::new(session, tx, Duration::from_millis(50));
        assert!(provider.ask("anyone there?").await.is_err());
    }
}
