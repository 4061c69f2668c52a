use axum::{
    routing::{delete, get, post, put},
    Router,
};

use courier_infra::wire;

pub mod messages;
pub mod system;

/// Mutation endpoints called by the dispatcher, plus direct reads.
pub fn router() -> Router {
    Router::new()
        .route(wire::CREATE_PATH, post(messages::create_message))
        .route(wire::UPDATE_ROUTE, put(messages::update_message))
        .route(wire::DELETE_ROUTE, delete(messages::delete_message))
        .route("/messages", get(messages::list_messages))
        .route("/messages/:id", get(messages::get_message))
}
