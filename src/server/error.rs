use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;

/// Every failure a handler can surface. Each maps to a fixed status code and
/// is rendered as the `{success, error, message}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: u16,
    message: String,
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::BadRequest(format!("Missing required field: {field}"))
    }

    /// For store failures on writes and searches.
    pub fn unprocessable(err: StoreError) -> Self {
        tracing::warn!("Store operation failed: {err}");
        ApiError::Unprocessable
    }

    /// For store failures on plain reads.
    pub fn internal(err: StoreError) -> Self {
        tracing::error!("Store read failed: {err}");
        ApiError::Internal
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {details}");
    ApiError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn envelope(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn bad_request_carries_reason() {
        let (status, body) = envelope(ApiError::missing_field("category")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "error": 400, "message": "Missing required field: category"})
        );
    }

    #[tokio::test]
    async fn fixed_messages() {
        let cases = [
            (ApiError::NotFound, 404, "resource not found"),
            (ApiError::MethodNotAllowed, 405, "method not allowed"),
            (ApiError::Unprocessable, 422, "unprocessable"),
            (ApiError::Internal, 500, "internal server error"),
        ];
        for (err, code, message) in cases {
            let (status, body) = envelope(err).await;
            assert_eq!(status.as_u16(), code);
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], code);
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn panics_render_as_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
