use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status_code: StatusCode,
    /// Short, human-readable description of what went wrong
    error: String,
    /// Underlying error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl ApiErrorType {
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

impl<T: Into<String>> From<(StatusCode, T, Option<String>)> for ApiErrorType {
    fn from((status_code, error, context): (StatusCode, T, Option<String>)) -> Self {
        Self {
            status_code,
            error: error.into(),
            context,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}
