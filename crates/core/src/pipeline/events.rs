//! # Pipeline Events
//!
//! Events the runner publishes for the chat surface. Stage results are
//! emitted one by one, in stage order, as they land.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of pipeline event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventKind {
    /// A run started on a topic
    PipelineStarted,
    /// An analyst picked up its stage
    StageStarted,
    /// An analyst finished its stage; the event text is the stage result
    StageCompleted,
    /// An analyst is holding a draft for human review
    HumanInputRequired,
    /// The human's reply was consumed by the waiting analyst
    HumanInputReceived,
    /// The run finished; the event text is the aggregate report
    PipelineCompleted,
    /// The run failed; the gate has been released
    PipelineFailed,
}

/// An event in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: PipelineEventKind,
    /// Slug of the analyst this event concerns ("marketer", "assistant", "system")
    pub analyst: String,
    /// Display text for the chat surface
    #[serde(default)]
    pub text: Option<String>,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PipelineEvent {
    /// Create a new event
    pub fn new(kind: PipelineEventKind, analyst: &str) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            analyst: analyst.to_string(),
            text: None,
            data: None,
        }
    }

    /// Attach display text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Generate a simple unique id (not cryptographic)
fn event_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    let salt = RandomState::new().build_hasher().finish() as u32;
    format!("{:x}-{:x}", nanos, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = PipelineEvent::new(PipelineEventKind::StageCompleted, "marketer")
            .with_text("## Market Report");
        assert_eq!(event.analyst, "marketer");
        assert_eq!(event.text.as_deref(), Some("## Market Report"));
        assert!(!event.id.is_empty());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineEventKind::HumanInputRequired).unwrap();
        assert_eq!(json, "\"human_input_required\"");
    }
}
