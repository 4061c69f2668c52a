use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use courier_core::{Content, MessageId, WriteIntent};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_message).get(list_messages))
        .route("/:id", get(get_message).put(update_message).delete(delete_message))
}

fn parse_id(raw: &str) -> Result<MessageId, axum::response::Response> {
    raw.parse().map_err(|_| errors::not_found("message"))
}

fn parse_content(
    body: Result<Json<dto::WriteMessageRequest>, JsonRejection>,
) -> Result<Content, axum::response::Response> {
    let Json(body) = body.map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    })?;
    Content::from_field(body.content).map_err(errors::domain_error_to_response)
}

async fn accept(services: &AppServices, intent: WriteIntent) -> axum::response::Response {
    match services.submit(intent).await {
        Ok(job_id) => (StatusCode::ACCEPTED, Json(dto::JobAccepted::new(job_id))).into_response(),
        Err(e) => errors::job_error_to_response(e),
    }
}

pub async fn create_message(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::WriteMessageRequest>, JsonRejection>,
) -> axum::response::Response {
    let content = match parse_content(body) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    accept(&services, WriteIntent::Create { content }).await
}

pub async fn update_message(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::WriteMessageRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let content = match parse_content(body) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    // Existence is checked by the worker; a missing target fails the job.
    accept(&services, WriteIntent::Update { id, content }).await
}

pub async fn delete_message(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    accept(&services, WriteIntent::Delete { id }).await
}

pub async fn list_messages(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.reader.list().await {
        Ok(all) => Json(all).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_message(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reader.get(id).await {
        Ok(Some(message)) => Json(message).into_response(),
        Ok(None) => errors::not_found("message"),
        Err(e) => errors::store_error_to_response(e),
    }
}
