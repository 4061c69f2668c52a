use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use courier_infra::jobs::ExecError;
use courier_infra::store::StoreError;

pub fn exec_error_to_response(err: ExecError) -> axum::response::Response {
    match err {
        ExecError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ExecError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "message not found")
        }
        ExecError::Corrupt(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_record", msg)
        }
        ExecError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn message_not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "message not found")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
