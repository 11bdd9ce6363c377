//! # Commander HTTP Server Module
//!
//! Wires the REST API into a runnable Axum server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/commands/*` - Command resource

pub mod config;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::{AppService, HttpServer};
