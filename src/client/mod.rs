//! The `client` module represents the streaming subscribers of the relay.
//!
//! `Subscriber` is the delivery handle held in a topic's subscriber set, and
//! `SubscriberConnection` owns the connection lifecycle: registration,
//! heartbeat and cleanup when the peer goes away.

pub mod connection;
pub mod subscriber;

pub use connection::{ConnectionState, SubscriberConnection};
pub use subscriber::{DeliveryError, Subscriber};
