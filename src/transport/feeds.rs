use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use futures::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::broker::Broker;
use crate::broker::message::Frame;
use crate::client::SubscriberConnection;
use crate::config::FeedsSettings;
use crate::transport::{client_ip, health};

#[derive(Clone)]
pub struct FeedsState {
    pub broker: Arc<Broker>,
    pub heartbeat: Duration,
    pub buffer: usize,
}

/// Routes for the feeds listener: `GET /events/:action` and `GET /health`.
pub fn router(broker: Arc<Broker>, feeds: &FeedsSettings) -> Router {
    let state = FeedsState {
        broker,
        heartbeat: feeds.heartbeat_interval(),
        buffer: feeds.buffer,
    };

    Router::new()
        .route("/events/:action", get(subscribe))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens an event stream on the topic named by `action`.
///
/// The connection is registered before the response is returned; it is
/// released when hyper drops the body, whether the peer left or a write failed.
async fn subscribe(
    State(state): State<FeedsState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> impl IntoResponse {
    debug!(
        from_ip = ?client_ip(&headers, peer.as_ref()),
        "Opening feed for {action}"
    );

    let connection =
        SubscriberConnection::open(state.broker.clone(), &action, state.heartbeat, state.buffer);
    let stream = connection
        .into_stream()
        .map(|frame| Ok::<_, Infallible>(sse_event(frame)));

    ([(header::CONNECTION, "keep-alive")], Sse::new(stream))
}

fn sse_event(frame: Frame) -> Event {
    match frame {
        Frame::Event(json) => Event::default().data(&*json),
        Frame::Heartbeat => Event::default().comment("ping"),
    }
}
