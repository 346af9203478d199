//! # HTTP Server Module
//!
//! Thin axum boundary over the analyzer. Owns no analysis logic.
//!
//! # Endpoints
//!
//! - `POST /api/analyze` - Analyze a raw document body
//! - `GET /api/registry` - Discoveries, `?order=arrival|newest`
//! - `GET /api/registry/export` - Export rows
//! - `GET /api/registry/{sequence_number}` - One discovery
//! - `/health` - Health check
//! - `/observability/metrics` - Counters

pub mod analyze_routes;
pub mod config;
pub mod observability_routes;
pub mod registry_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
