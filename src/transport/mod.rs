//! The `transport` module puts the broker on the network.
//!
//! Two axum routers share one `Arc<Broker>`: the catcher, which turns caught
//! links into published events and redirects, and the feeds listener, which
//! streams those events to subscribers as server-sent events. The split is
//! purely about network exposure.

pub mod catcher;
pub mod feeds;
pub mod message;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use tokio::net::TcpListener;
use tracing::info;

use crate::utils::error::RelayError;

/// Binds a listener. Failure here is fatal for the process.
pub async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Serves `router` until `shutdown` resolves and open connections drain.
pub async fn serve<F>(
    name: &str,
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), RelayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("{name} listening on {addr}");
    }

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(RelayError::Serve)
}

/// The caller's address, preferring the leftmost `X-Forwarded-For` entry set
/// by a reverse proxy over the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => peer.map(|ConnectInfo(addr)| addr.ip().to_string()),
    }
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
