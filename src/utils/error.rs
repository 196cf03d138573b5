//! The `error` module defines the error type shared across `linkrelay`.
//!
//! Most things that go wrong at request time are not errors here: bad links
//! get a quiet 204 and failed deliveries are swallowed per subscriber. What
//! remains is startup (configuration, binding) and the publish boundary.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid event: {0}")]
    InvalidEvent(&'static str),
}
