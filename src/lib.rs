//! # linkrelay
//!
//! `linkrelay` catches inbound links, redirects the caller, and relays each
//! caught link to live subscribers as server-sent events, grouped by action.
//!
//! ## Core Modules
//!
//! - `broker`: topic registry and best-effort event fan-out.
//! - `client`: subscriber delivery handles and the streaming connection lifecycle.
//! - `config`: loading settings from an optional file and the environment.
//! - `transport`: the catcher and feeds HTTP front-ends over one shared broker.
//! - `utils`: the error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
