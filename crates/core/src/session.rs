//! # Session
//!
//! One interactive session: the run-once gate plus the reply mailbox,
//! the only state shared between the chat-facing context and the
//! pipeline's background task.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

use crate::mailbox::Mailbox;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No analysis has started; the next message is a topic.
    Idle,
    /// An analysis is in flight; messages are human replies.
    Running,
    /// The one-shot analysis completed; the session takes no more runs.
    Finished,
}

/// Where an incoming chat message was routed.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// This message won the gate: it is the topic, and the caller must
    /// now spawn the runner.
    StartRun(String),
    /// A run is active; the message was deposited as a human reply.
    HumanReply,
    /// The session's analysis already finished; nothing was started.
    Finished,
}

/// A session owns the gate and the mailbox.
///
/// The phase lives in an atomic so both execution contexts observe a
/// consistent value; the Idle→Running transition is a compare-and-swap,
/// which is what guarantees at most one runner even when first messages
/// race.
#[derive(Default)]
pub struct Session {
    phase: AtomicU8,
    mailbox: Mailbox,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase.load(Ordering::Acquire) {
            RUNNING => SessionPhase::Running,
            FINISHED => SessionPhase::Finished,
            _ => SessionPhase::Idle,
        }
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Route one incoming human message.
    ///
    /// The first message to arrive on an Idle session claims the gate and
    /// becomes the topic; every later message is a reply for the mailbox.
    /// Losers of a racing first message are treated as replies too.
    pub async fn route_message(&self, text: &str) -> Route {
        if self
            .phase
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return Route::StartRun(text.to_string());
        }
        match self.phase() {
            SessionPhase::Finished => Route::Finished,
            _ => {
                self.mailbox.deposit(text).await;
                Route::HumanReply
            }
        }
    }

    /// Mark the one-shot run complete; this session takes no further runs.
    pub fn finish(&self) {
        self.phase.store(FINISHED, Ordering::Release);
    }

    /// Reopen the gate after a failed run so the user can retry.
    pub fn release(&self) {
        let _ = self
            .phase
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_message_starts_run() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        let route = session.route_message("fintech").await;
        assert_eq!(route, Route::StartRun("fintech".to_string()));
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[tokio::test]
    async fn test_later_messages_go_to_mailbox() {
        let session = Session::new();
        session.route_message("fintech").await;
        let route = session.route_message("Try again.").await;
        assert_eq!(route, Route::HumanReply);
        let reply = session.mailbox().take(Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply, "Try again.");
    }

    #[tokio::test]
    async fn test_concurrent_first_messages_start_at_most_one_run() {
        let session = Arc::new(Session::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                session.route_message(&format!("topic-{i}")).await
            }));
        }
        let mut starts = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), Route::StartRun(_)) {
                starts += 1;
            }
        }
        assert_eq!(starts, 1);
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[tokio::test]
    async fn test_finish_is_terminal() {
        let session = Session::new();
        session.route_message("fintech").await;
        session.finish();
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(session.route_message("another topic").await, Route::Finished);
        // release() only applies to the error path, not a finished session
        session.release();
        assert_eq!(session.phase(), SessionPhase::Finished);
    }

    #[tokio::test]
    async fn test_release_reopens_gate_after_failure() {
        let session = Session::new();
        session.route_message("fintech").await;
        session.release();
        assert_eq!(session.phase(), SessionPhase::Idle);
        let route = session.route_message("healthcare").await;
        assert_eq!(route, Route::StartRun("healthcare".to_string()));
    }
}
