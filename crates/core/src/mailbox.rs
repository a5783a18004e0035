//! # Reply Mailbox
//!
//! Single-slot handoff carrying a human's free-text reply from the chat
//! surface to a blocked pipeline stage. Last-write-wins: depositing while
//! a reply is still unconsumed overwrites it, there is no queue.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};

/// No reply arrived before the configured deadline.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no human reply arrived within {0:?}")]
pub struct MailboxTimeout(pub Duration);

/// Single-slot, last-write-wins reply container.
///
/// Shared between the chat-facing context (depositor) and the pipeline's
/// background task (consumer). `deposit` never suspends beyond the slot
/// lock; `take` genuinely waits for a deposit instead of returning an
/// empty sentinel.
#[derive(Default)]
pub struct Mailbox {
    slot: Mutex<Option<String>>,
    bell: Notify,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a reply, replacing any unconsumed one.
    pub async fn deposit(&self, value: impl Into<String>) {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            tracing::warn!("overwriting an unconsumed human reply");
        }
        *slot = Some(value.into());
        self.bell.notify_one();
    }

    /// Wait for a reply and drain the slot.
    ///
    /// Suspends the caller until a deposit arrives, then atomically reads
    /// and clears the slot. A deposit made before the call is consumed
    /// immediately; with nothing deposited by `timeout`, returns
    /// [`MailboxTimeout`] so a stalled session can be aborted.
    pub async fn take(&self, timeout: Duration) -> Result<String, MailboxTimeout> {
        tokio::time::timeout(timeout, async {
            loop {
                if let Some(value) = self.slot.lock().await.take() {
                    return value;
                }
                self.bell.notified().await;
            }
        })
        .await
        .map_err(|_| MailboxTimeout(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const SHORT: Duration = Duration::from_millis(50);
    const LONG: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_take_returns_deposited_value() {
        let mailbox = Mailbox::new();
        mailbox.deposit("Approved, please proceed.").await;
        let reply = mailbox.take(LONG).await.unwrap();
        assert_eq!(reply, "Approved, please proceed.");
    }

    #[tokio::test]
    async fn test_take_waits_for_late_deposit() {
        let mailbox = Arc::new(Mailbox::new());
        let depositor = mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            depositor.deposit("late reply").await;
        });
        let reply = mailbox.take(LONG).await.unwrap();
        assert_eq!(reply, "late reply");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let mailbox = Mailbox::new();
        mailbox.deposit("first").await;
        mailbox.deposit("second").await;
        assert_eq!(mailbox.take(LONG).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_drain_is_idempotent() {
        let mailbox = Mailbox::new();
        mailbox.deposit("only once").await;
        assert_eq!(mailbox.take(LONG).await.unwrap(), "only once");
        // Without a new deposit the slot stays empty and the wait expires.
        assert_eq!(mailbox.take(SHORT).await, Err(MailboxTimeout(SHORT)));
    }

    #[tokio::test]
    async fn test_take_times_out_when_empty() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.take(SHORT).await, Err(MailboxTimeout(SHORT)));
    }

    #[tokio::test]
    async fn test_deposits_consumed_in_order_across_takes() {
        let mailbox = Arc::new(Mailbox::new());
        let depositor = mailbox.clone();
        tokio::spawn(async move {
            depositor.deposit("Try again.").await;
            // Give the consumer time to drain before the second round.
            tokio::time::sleep(Duration::from_millis(20)).await;
            depositor.deposit("Approved, please proceed.").await;
        });
        assert_eq!(mailbox.take(LONG).await.unwrap(), "Try again.");
        assert_eq!(mailbox.take(LONG).await.unwrap(), "Approved, please proceed.");
    }
}
