//! Folio server library.
//!
//! Provides a reusable server function to serve the chat relay either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod cors;
mod health;

use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{Router, routing::get};
use config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

/// Configuration for serving the relay.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized relay configuration.
    pub config: Config,
    /// Cancelled to stop accepting connections and drain in-flight requests.
    pub shutdown_signal: CancellationToken,
}

/// Builds the application router from the configuration.
///
/// The chat relay is left out, with an error logged, when it cannot be
/// initialized. The health endpoint keeps working in that case.
pub fn app(config: &Config) -> (Router, bool) {
    let mut app = Router::new();

    let cors = match &config.server.cors {
        Some(cors_config) => cors::generate(cors_config),
        None => CorsLayer::permissive(),
    };

    let relay_exposed = match relay::router(&config.relay) {
        Ok(relay_router) => {
            app = app.merge(relay_router.layer(cors.clone()));
            true
        }
        Err(e) => {
            log::error!("{e}");
            false
        }
    };

    if config.server.health.enabled {
        let health_router = Router::new()
            .route(&config.server.health.path, get(health::health))
            .layer(cors);

        app = app.merge(health_router);
    }

    (app, relay_exposed)
}

/// Starts and runs the relay server with the provided configuration.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
    }: ServeConfig,
) -> anyhow::Result<()> {
    let (app, relay_exposed) = app(&config);

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    let local_address = listener.local_addr()?;

    if relay_exposed {
        log::info!("Chat relay available at: http://{local_address}{}/chat", relay_prefix(&config));
    } else {
        log::warn!("Server starting without the chat relay. Configure an upstream API key to enable it.");
    }

    if config.server.health.enabled {
        log::info!("Health endpoint available at: http://{local_address}{}", config.server.health.path);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_signal.cancelled().await })
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    log::info!("Server stopped");

    Ok(())
}

fn relay_prefix(config: &Config) -> &str {
    config.relay.path.trim_end_matches('/')
}
