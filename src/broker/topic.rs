use dashmap::DashMap;

use crate::client::Subscriber;

pub type SubscriberId = String;

/// A named channel of events and the delivery handles of its live subscribers.
///
/// The set is keyed by subscriber id, so a connection appears at most once.
/// Handles are cloned out by [`Topic::snapshot`] before any delivery happens,
/// which lets connections come and go while a publish is in flight.
#[derive(Debug)]
pub struct Topic {
    pub name: String,
    subscribers: DashMap<SubscriberId, Subscriber>,
}

impl Topic {
    /// Creates an empty topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: DashMap::new(),
        }
    }

    /// Adds a subscriber. Re-adding the same id replaces the handle.
    pub fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers.insert(subscriber.id.clone(), subscriber);
    }

    /// Removes a subscriber, returning whether it was present.
    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Copies out the current handles so delivery runs without holding any shard lock.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Drops every handle. Subscribers see their stream end once buffered frames drain.
    pub fn clear(&self) {
        self.subscribers.clear();
    }
}
