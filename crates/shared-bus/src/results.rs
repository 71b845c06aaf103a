//! # Result Bus
//!
//! Fans reaction results out to any number of observers.
//!
//! Results are reports, not work: an observer that falls more than
//! `capacity` results behind loses the oldest ones and is told so with a
//! warning.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::errors::BusError;
use crate::events::{EventFilter, TriggerEvent};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Publishing side of the result bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a result; returns how many subscribers received it.
    async fn publish(&self, event: TriggerEvent) -> usize;
}

/// Broadcast bus for reaction results.
#[derive(Debug)]
pub struct ResultBus {
    sender: broadcast::Sender<TriggerEvent>,
}

impl ResultBus {
    /// Bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus keeping up to `capacity` unread results per subscriber.
    ///
    /// # Panics
    ///
    /// `capacity` is 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to results matching `filter`, from now on.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New result subscription");
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }
}

impl Default for ResultBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for ResultBus {
    async fn publish(&self, event: TriggerEvent) -> usize {
        let topic = event.topic();
        let class = event.notice().class;
        // No subscribers is normal for results.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(topic = ?topic, class = %class, receivers, "Result published");
        receivers
    }
}

/// A filtered view of the result bus.
pub struct Subscription {
    receiver: broadcast::Receiver<TriggerEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Next matching result; `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<TriggerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Result subscriber lagged, oldest results dropped");
                }
            }
        }
    }

    /// Next matching result if one is already buffered.
    ///
    /// # Errors
    ///
    /// `BusError::Closed` once the bus is dropped.
    pub fn try_recv(&mut self) -> Result<Option<TriggerEvent>, BusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(BusError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Result subscriber lagged, oldest results dropped");
                }
            }
        }
    }
}
