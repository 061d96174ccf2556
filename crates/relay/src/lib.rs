//! Chat relay forwarding conversations to an upstream completion API.
//!
//! The credential for the upstream API stays in the server; clients only send
//! the conversation and get the upstream completion object back unchanged.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use config::RelayConfig;
use messages::ChatRequest;

mod error;
mod messages;
mod server;
mod upstream;

pub use error::RelayError;
use server::RelayServer;

pub(crate) type Result<T> = std::result::Result<T, RelayError>;

/// Creates an axum router serving the chat relay under the configured path.
pub fn router(config: &RelayConfig) -> anyhow::Result<Router> {
    if !config.path.starts_with('/') {
        anyhow::bail!(
            "Failed to initialize chat relay: relay.path must start with '/', got '{}'",
            config.path
        );
    }

    let server = RelayServer::new(config).map_err(|e| anyhow::anyhow!("Failed to initialize chat relay: {e}"))?;

    Ok(routes(&config.path, server))
}

fn routes(path: &str, server: RelayServer) -> Router {
    let path = path.trim_end_matches('/');

    let relay_routes = Router::new()
        .route("/chat", post(chat))
        .with_state(Arc::new(server));

    // axum refuses to nest at the root
    if path.is_empty() {
        relay_routes
    } else {
        Router::new().nest(path, relay_routes)
    }
}

/// Relay one conversation to the upstream completion API.
///
/// Bodies that do not match the conversation schema are rejected here, before
/// anything is sent upstream.
async fn chat(
    State(server): State<Arc<RelayServer>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(|rejection| {
        log::debug!("Rejected chat request: {}", rejection.body_text());
        RelayError::InvalidRequest
    })?;

    log::debug!("Chat relay called with {} messages", request.messages.len());

    let body = server.chat(request).await?;

    Ok(([(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response())
}
