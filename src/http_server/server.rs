//! # HTTP Server
//!
//! Combines the command API and the health check into one Axum server with
//! CORS and request tracing. Trailing slashes are trimmed before routing, so
//! `/api/commands/` and `/api/commands` reach the same handler.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::{Router, ServiceExt};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::repository::SqliteStore;
use crate::rest_api::{CommandsApi, COMMANDS_PATH};

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;

/// The served application: the router behind path normalization
pub type AppService = NormalizePath<Router>;

/// HTTP server for the command API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with default configuration
    pub fn new(store: SqliteStore) -> Self {
        Self::with_config(HttpServerConfig::default(), store)
    }

    /// Create a server with custom configuration
    pub fn with_config(config: HttpServerConfig, store: SqliteStore) -> Self {
        let router = Self::build_router(&config, store);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, store: SqliteStore) -> Router {
        Router::new()
            .merge(health_routes())
            .nest(COMMANDS_PATH, CommandsApi::new(store).router())
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Get the router wrapped exactly as `start` serves it
    pub fn service(self) -> AppService {
        NormalizePath::trim_trailing_slash(self.router)
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        info!(addr = %listener.local_addr()?, "commander HTTP server listening");

        let app = self.service();
        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("commander HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
