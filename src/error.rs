use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Standard error response format for all API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Upstream error body, forwarded as-is when the generation API rejects a request
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: Value) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}

/// Trait for errors that can be converted to HTTP responses
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Optional structured payload to return alongside the message
    fn details(&self) -> Option<Value> {
        None
    }
}

/// Convert any HttpError into an Axum response
///
/// The public message is the error's `Display`. Underlying causes are logged
/// but never serialized into the body.
pub fn into_response<E: HttpError>(err: E) -> Response {
    let status = err.status_code();
    let message = err.to_string();
    let cause = std::error::Error::source(&err).map(|source| source.to_string());

    if status.is_client_error() {
        tracing::warn!(error = %message, status = %status, "Client error");
    } else {
        tracing::error!(
            error = %message,
            status = %status,
            cause = ?cause,
            "API error"
        );
    }

    let body = match err.details() {
        Some(details) => ErrorResponse::with_details(message, details),
        None => ErrorResponse::new(message),
    };

    (status, Json(body)).into_response()
}

/// Macro to implement IntoResponse for HttpError types
#[macro_export]
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                $crate::error::into_response(self)
            }
        }
    };
}
