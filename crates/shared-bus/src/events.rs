//! # Trigger Events
//!
//! `CommitNotice` travels on the commit queue; `TriggerEvent` reports
//! reaction results on the result bus.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{ObjectId, RecordClass, StoreError};

/// A record that was just committed to the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNotice {
    /// Class of the committed record.
    pub class: RecordClass,
    /// Store identity of the committed row.
    pub object_id: ObjectId,
    /// Business key, for logging.
    pub key: String,
    /// Delivery number of this commit (1 for the first, more for replays).
    pub delivery: u32,
    /// The record exactly as it was written. Later writes to the same row
    /// do not change it.
    pub snapshot: serde_json::Value,
}

impl CommitNotice {
    /// Decode the committed record.
    ///
    /// # Errors
    ///
    /// The snapshot is not a valid `R` document.
    pub fn record<R: DeserializeOwned>(&self) -> Result<R, StoreError> {
        serde_json::from_value(self.snapshot.clone()).map_err(|e| StoreError::Serialization {
            class: self.class,
            reason: e.to_string(),
        })
    }

    /// The same commit, announced once more.
    #[must_use]
    pub fn redelivered(&self) -> Self {
        Self {
            delivery: self.delivery + 1,
            ..self.clone()
        }
    }
}

/// Reaction results published on the result bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// After-save reactions for a commit finished.
    ReactionCompleted {
        /// Commit that was handled.
        notice: CommitNotice,
        /// Human-readable summary of what happened.
        summary: String,
    },

    /// After-save reactions for a commit failed. The commit stands.
    ReactionFailed {
        /// Commit that was handled.
        notice: CommitNotice,
        /// Error description.
        error: String,
    },
}

impl TriggerEvent {
    /// Topic of this result.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ReactionCompleted { .. } => EventTopic::Reactions,
            Self::ReactionFailed { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Commit this result is about.
    #[must_use]
    pub fn notice(&self) -> &CommitNotice {
        match self {
            Self::ReactionCompleted { notice, .. } | Self::ReactionFailed { notice, .. } => notice,
        }
    }
}

/// Result topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Finished reactions.
    Reactions,
    /// Failed reactions.
    DeadLetterQueue,
    /// Everything.
    All,
}

/// Filter for subscribing to specific results.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Record classes to include. Empty means all classes.
    pub classes: Vec<RecordClass>,
}

impl EventFilter {
    /// Accept every result.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept results on `topics`.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            classes: Vec::new(),
        }
    }

    /// Restrict the filter to results about specific record classes.
    #[must_use]
    pub fn with_classes(mut self, classes: Vec<RecordClass>) -> Self {
        self.classes = classes;
        self
    }

    /// Check if a result matches this filter.
    #[must_use]
    pub fn matches(&self, event: &TriggerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let class_match = self.classes.is_empty() || self.classes.contains(&event.notice().class);

        topic_match && class_match
    }
}

#[cfg(test)]
pub(crate) fn notice(class: RecordClass) -> CommitNotice {
    CommitNotice {
        class,
        object_id: ObjectId::new(),
        key: "42".to_string(),
        delivery: 1,
        snapshot: serde_json::json!({ "requestId": "42", "confirmed": false }),
    }
}
