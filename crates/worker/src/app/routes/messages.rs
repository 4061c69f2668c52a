use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::error;

use courier_core::MessageId;
use courier_infra::wire::{DeleteRequest, WriteRequest};

use crate::app::errors;
use crate::app::services::WorkerServices;

/// Run executor work on its own task.
///
/// The dispatcher disconnects once its timeout elapses; dropping the
/// handler future must not abort a mutation whose job is still pending.
async fn detached<F, T>(work: F) -> Result<T, axum::response::Response>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(|e| {
        error!(error = %e, "executor task did not complete");
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "executor task did not complete",
        )
    })
}

fn parse_id(raw: &str) -> Result<MessageId, axum::response::Response> {
    raw.parse().map_err(|_| errors::message_not_found())
}

fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub async fn create_message(
    Extension(services): Extension<Arc<WorkerServices>>,
    body: Result<Json<WriteRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return invalid_body(rejection),
    };

    let executor = services.executor.clone();
    let job = async move { executor.create(body.content, body.job_id).await };
    let result = match detached(job).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => errors::exec_error_to_response(e),
    }
}

pub async fn update_message(
    Extension(services): Extension<Arc<WorkerServices>>,
    Path(id): Path<String>,
    body: Result<Json<WriteRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return invalid_body(rejection),
    };

    let executor = services.executor.clone();
    let job = async move { executor.update(id, body.content, body.job_id).await };
    let result = match detached(job).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => errors::exec_error_to_response(e),
    }
}

pub async fn delete_message(
    Extension(services): Extension<Arc<WorkerServices>>,
    Path(id): Path<String>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Direct callers may send no body at all.
    let job_id = body.ok().and_then(|Json(b)| b.job_id);

    let executor = services.executor.clone();
    let job = async move { executor.delete(id, job_id).await };
    let result = match detached(job).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => errors::exec_error_to_response(e),
    }
}

pub async fn list_messages(
    Extension(services): Extension<Arc<WorkerServices>>,
) -> axum::response::Response {
    match services.reader.list().await {
        Ok(all) => Json(all).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_message(
    Extension(services): Extension<Arc<WorkerServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reader.get(id).await {
        Ok(Some(message)) => Json(message).into_response(),
        Ok(None) => errors::message_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use courier_infra::jobs::ProcessingDelay;
    use courier_infra::jobs::WorkerExecutor;
    use courier_infra::read_model::MessageReader;
    use courier_infra::store::InMemoryStore;
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::app::services::WorkerServices;

    fn app() -> Router {
        let store = Arc::new(InMemoryStore::new());
        build_app(Arc::new(WorkerServices {
            executor: WorkerExecutor::new(store.clone(), ProcessingDelay::none()),
            reader: MessageReader::new(store),
        }))
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_req(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let (status, body) = call(&app, json_req("POST", "/create_message", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_body");
    }

    #[tokio::test]
    async fn delete_without_body_is_direct_call() {
        let app = app();
        let create = json_req("POST", "/create_message", r#"{"content":"x"}"#);
        let (status, _) = call(&app, create).await;
        assert_eq!(status, StatusCode::CREATED);

        let req = Request::builder()
            .method("DELETE")
            .uri("/delete_message/1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "deleted", "id": 1}));
    }

    #[tokio::test]
    async fn non_numeric_ids_are_not_found() {
        let app = app();
        let get = Request::builder().uri("/messages/abc").body(Body::empty()).unwrap();
        assert_eq!(call(&app, get).await.0, StatusCode::NOT_FOUND);

        let update = json_req("PUT", "/update_message/0", r#"{"content":"x"}"#);
        let (status, _) = call(&app, update).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_reports_missing_target_before_missing_content() {
        let app = app();
        let (status, _) = call(&app, json_req("PUT", "/update_message/9", "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        call(&app, json_req("POST", "/create_message", r#"{"content":"x"}"#)).await;
        let (status, body) = call(&app, json_req("PUT", "/update_message/1", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}
