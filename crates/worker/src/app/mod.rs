//! Worker HTTP application (Axum router + service wiring).
//!
//! - `services.rs`: executor and reader over one store handle
//! - `routes/`: mutation and read handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

pub mod errors;
pub mod routes;
pub mod services;

/// Build the worker router. Also mounted by the API's embedded-worker mode.
pub fn build_app(services: Arc<services::WorkerServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
}
