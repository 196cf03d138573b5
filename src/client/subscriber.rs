use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::broker::message::Frame;
use crate::broker::topic::SubscriberId;

/// Why a single delivery attempt did not land in a subscriber's buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("subscriber buffer is full")]
    Lagging,
    #[error("subscriber has gone away")]
    Gone,
}

/// Delivery handle for one streaming connection.
///
/// This is what a topic's subscriber set holds. It does not own the
/// connection; it only pushes frames into the connection's bounded buffer.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Unique per connection instance.
    pub id: SubscriberId,

    /// The one topic this connection is bound to.
    pub topic: String,

    sender: Sender<Frame>,
}

impl Subscriber {
    pub fn new(topic: &str, sender: Sender<Frame>) -> Self {
        Self {
            id: format!("sub-{}", Uuid::new_v4()),
            topic: topic.to_string(),
            sender,
        }
    }

    /// Pushes a frame without waiting. A full buffer means the peer has stalled.
    pub fn deliver(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Lagging,
            TrySendError::Closed(_) => DeliveryError::Gone,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
