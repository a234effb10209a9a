use crate::utils::error::MetricsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub fn error_status(err: &MetricsError) -> StatusCode {
    match err {
        MetricsError::InvalidProject { .. }
        | MetricsError::ProjectNotFound { .. }
        | MetricsError::InvalidQuery { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MetricsError::MetricsNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        let status = error_status(&self);

        let detail = if self.is_client_error() {
            tracing::debug!("Rejected request: {}", self);
            self.to_string()
        } else {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
            "Internal Server Error".to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
