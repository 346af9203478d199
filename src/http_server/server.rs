//! # HTTP Server
//!
//! Combines the analyze, registry and observability routers around one
//! shared [`Analyzer`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::analyze_routes::analyze_routes;
use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes};
use super::registry_routes::registry_routes;
use crate::analyzer::Analyzer;
use crate::observability::{log_event_with_fields, Event};

/// HTTP boundary for the analyzer
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self::with_config(HttpServerConfig::default(), analyzer)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, analyzer: Arc<Analyzer>) -> Self {
        let router = Self::build_router(&config, analyzer);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, analyzer: Arc<Analyzer>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let registry = Arc::clone(analyzer.registry());
        let metrics = Arc::clone(analyzer.metrics());

        Router::new()
            .merge(health_routes())
            .nest(
                "/api",
                analyze_routes(analyzer).merge(registry_routes(registry)),
            )
            .nest("/observability", observability_routes(metrics))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(
            Event::Serving,
            &[
                ("addr", &addr.to_string()),
                ("analyze", "POST /api/analyze"),
            ],
        );
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
