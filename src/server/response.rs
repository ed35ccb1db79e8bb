use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IngestError;

/// Body of every request-fatal error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub context: String,
}

impl From<&IngestError> for ErrorBody {
    fn from(err: &IngestError) -> Self {
        Self {
            error: err.to_string(),
            context: err.context().to_string(),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self);
        warn!(error = %body.error, context = %body.context, "request rejected");
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
