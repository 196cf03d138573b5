use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::broker::Broker;
use crate::config::IntakeSettings;
use crate::transport::message::LinkQuery;
use crate::transport::{client_ip, health, user_agent};

#[derive(Clone)]
pub struct CatcherState {
    pub broker: Arc<Broker>,
    pub intake: Arc<IntakeSettings>,
}

/// Routes for the link catcher: `GET /` and `GET /health`.
pub fn router(broker: Arc<Broker>, intake: IntakeSettings) -> Router {
    let state = CatcherState {
        broker,
        intake: Arc::new(intake),
    };

    Router::new()
        .route("/", get(catch_link))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Publishes an accepted link and redirects the caller to the project.
///
/// Anything that is not an accepted link, including a query string that does
/// not decode, gets an empty 204 so scanner traffic stays quiet.
async fn catch_link(
    State(state): State<CatcherState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Response {
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let query = LinkQuery::from_pairs(pairs).repaired();

    let Some(link) = query.accept(&state.intake.action) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let from_ip = client_ip(&headers, peer.as_ref());
    let user_agent = user_agent(&headers);

    info!(
        from_ip = ?from_ip,
        method = %method,
        path = %uri.path(),
        org_id = ?link.org_id,
        project_id = %link.project_id,
        action = %link.action,
        user_agent = ?user_agent,
        "Valid link"
    );

    let location = link.redirect_url(&state.intake.redirect);
    let topic = link.action.clone();
    let event = link.into_event(from_ip, user_agent);

    if let Err(e) = state.broker.publish(&topic, &event) {
        warn!("Failed to publish link event on {topic}: {e}");
    }

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
