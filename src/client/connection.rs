//! Lifecycle of one streaming subscriber.
//!
//! A connection goes `Connecting -> Open -> Closed`. Opening registers a
//! delivery handle with the broker; closing removes it, closes the buffer and
//! stops the heartbeat. Closing is idempotent and also runs on drop, which is
//! how a peer disconnect or a failed write reaches us: hyper drops the
//! response body, and with it the stream that owns this connection.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::broker::Broker;
use crate::broker::message::Frame;
use crate::broker::topic::SubscriberId;
use crate::client::Subscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug)]
pub struct SubscriberConnection {
    id: SubscriberId,
    topic: String,
    state: ConnectionState,
    heartbeat: Duration,
    receiver: mpsc::Receiver<Frame>,
    broker: Arc<Broker>,
}

impl SubscriberConnection {
    /// Registers a new subscriber on `topic` and returns the open connection.
    ///
    /// `buffer` bounds how many frames may wait for a slow peer before the
    /// broker evicts it.
    pub fn open(broker: Arc<Broker>, topic: &str, heartbeat: Duration, buffer: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let subscriber = Subscriber::new(topic, sender);

        let mut connection = Self {
            id: subscriber.id.clone(),
            topic: topic.to_string(),
            state: ConnectionState::Connecting,
            heartbeat,
            receiver,
            broker,
        };

        connection.broker.subscribe(subscriber);
        connection.state = ConnectionState::Open;
        info!("{} opened on {}", connection.id, connection.topic);
        connection
    }

    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Releases everything the connection holds. Later calls do nothing.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        self.broker.unsubscribe(&self.topic, &self.id);
        self.receiver.close();
        info!("{} closed on {}", self.id, self.topic);
    }

    /// Turns the connection into the stream of frames to write to the peer.
    ///
    /// The stream interleaves published frames with a heartbeat every
    /// `heartbeat`, the first one a full period after opening. It ends when the
    /// broker drops the delivery handle (eviction or shutdown); dropping it
    /// early closes the connection.
    pub fn into_stream(self) -> impl Stream<Item = Frame> {
        let mut connection = self;

        stream! {
            let period = connection.heartbeat;
            let mut heartbeat = interval_at(Instant::now() + period, period);
            heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while connection.state == ConnectionState::Open {
                let next = tokio::select! {
                    frame = connection.receiver.recv() => frame,
                    _ = heartbeat.tick() => Some(Frame::Heartbeat),
                };

                match next {
                    Some(frame) => yield frame,
                    None => {
                        debug!("{} released by broker", connection.id);
                        break;
                    }
                }
            }

            connection.close();
        }
    }
}

impl Drop for SubscriberConnection {
    fn drop(&mut self) {
        self.close();
    }
}
