//! Broker engine
//!
//! In-memory topic registry and event publisher:
//! - topics are created lazily on first publish or subscribe and live for the
//!   life of the broker
//! - each topic holds the delivery handles of its live subscribers
//! - publishing serializes an event once and pushes it to a snapshot of the
//!   topic's handles
//!
//! Concurrency notes:
//! - All methods take `&self`; the broker is shared as `Arc<Broker>` by the
//!   catcher and feeds front-ends. Both the registry and each subscriber set
//!   are `DashMap`s, so no outer lock exists.
//! - Delivery never awaits. A subscriber with a full buffer is evicted and a
//!   subscriber whose connection is gone is removed; neither affects the
//!   others or the caller.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::broker::message::{Frame, LinkEvent};
use crate::broker::topic::{SubscriberId, Topic};
use crate::client::{DeliveryError, Subscriber};
use crate::utils::error::RelayError;

/// Outcome of one fan-out. Kept internal: publishing is fire-and-forget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub evicted: usize,
}

#[derive(Debug, Default)]
pub struct Broker {
    topics: DashMap<String, Arc<Topic>>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    /// Returns the topic's subscriber set, creating an empty one if needed.
    pub fn topic(&self, name: &str) -> Arc<Topic> {
        if let Some(topic) = self.topics.get(name) {
            return Arc::clone(topic.value());
        }

        let entry = self.topics.entry(name.to_string()).or_insert_with(|| {
            debug!("Created topic {name}");
            Arc::new(Topic::new(name))
        });
        Arc::clone(entry.value())
    }

    /// Registers a delivery handle in the set of the topic it is bound to.
    pub fn subscribe(&self, subscriber: Subscriber) {
        let topic = self.topic(&subscriber.topic);
        debug!("{} subscribed to {}", subscriber.id, topic.name);
        topic.subscribe(subscriber);
    }

    /// Removes a handle. Safe to call any number of times.
    pub fn unsubscribe(&self, topic: &str, subscriber: &SubscriberId) -> bool {
        match self.topics.get(topic) {
            Some(t) => t.unsubscribe(subscriber),
            None => false,
        }
    }

    /// Publishes an event to every current subscriber of `topic`.
    ///
    /// Fails only if the event is invalid or cannot be serialized. Delivery
    /// failures are logged and swallowed, and no receipt is returned.
    pub fn publish(&self, topic: &str, event: &LinkEvent) -> Result<(), RelayError> {
        event.validate()?;
        let frame = Frame::event(event)?;

        let report = self.fan_out(topic, frame);
        debug!(
            "Published to {topic}: {} attempted, {} delivered, {} evicted",
            report.attempted, report.delivered, report.evicted
        );
        Ok(())
    }

    pub(crate) fn fan_out(&self, topic: &str, frame: Frame) -> DeliveryReport {
        let topic = self.topic(topic);
        let mut report = DeliveryReport::default();

        for subscriber in topic.snapshot() {
            report.attempted += 1;
            match subscriber.deliver(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e @ DeliveryError::Lagging) => {
                    warn!("Evicting {} from {}: {e}", subscriber.id, topic.name);
                    if topic.unsubscribe(&subscriber.id) {
                        report.evicted += 1;
                    }
                }
                Err(e @ DeliveryError::Gone) => {
                    debug!("Dropping {} from {}: {e}", subscriber.id, topic.name);
                    topic.unsubscribe(&subscriber.id);
                }
            }
        }

        report
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map(|t| t.len()).unwrap_or(0)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Drops every delivery handle so all open streams run to completion.
    pub fn close_all(&self) {
        let mut closed = 0;
        for entry in self.topics.iter() {
            closed += entry.value().len();
            entry.value().clear();
        }
        info!("Closed {closed} subscriber(s) across {} topic(s)", self.topics.len());
    }
}
