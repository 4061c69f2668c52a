use axum::Router;

pub mod jobs;
pub mod messages;
pub mod system;

/// Router for the message and job endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/messages", messages::router())
        .nest("/jobs", jobs::router())
}
