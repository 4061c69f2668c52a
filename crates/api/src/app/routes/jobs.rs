use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use courier_core::JobId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/:job_id/status", get(job_status))
}

/// Poll a job. Unknown, expired and malformed ids all answer 404.
pub async fn job_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(job_id): Path<String>,
) -> axum::response::Response {
    let job_id: JobId = match job_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::not_found("job"),
    };

    match services.registry.status(job_id).await {
        Ok(status) => Json(dto::JobStatusResponse { job_id, status }).into_response(),
        Err(e) => errors::job_error_to_response(e),
    }
}
