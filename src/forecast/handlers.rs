use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, Method, StatusCode},
    Json,
};

use super::models::{ForecastRequest, ForecastResult};
use super::service::ForecastError;
use crate::AppState;

/// Forecast the sky from a photo and ground readings
///
/// POST /api/v1/forecast
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    tag = "forecast",
    request_body = ForecastRequest,
    responses(
        (status = 200, description = "Forecast generated", body = ForecastResult),
        (status = 400, description = "Missing image or weather data", body = crate::error::ErrorResponse),
        (status = 405, description = "Method not allowed", body = crate::error::ErrorResponse),
        (status = 413, description = "Request body exceeds the configured limit", body = crate::error::ErrorResponse),
        (status = 500, description = "API key not configured or internal error", body = crate::error::ErrorResponse),
        (status = "default", description = "Error forwarded from the generation API", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ForecastResult>, ForecastError> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.forecast_service.ensure_configured()?;
            return Err(body_rejection_error(rejection));
        }
    };

    let request = if has_json_content_type(&headers) {
        ForecastRequest::from_body(&body)
    } else {
        tracing::debug!("Forecast request without a JSON content type");
        ForecastRequest::default()
    };

    let forecast = state.forecast_service.predict(request).await?;
    Ok(Json(forecast))
}

/// Any method other than POST on a forecast route
pub async fn method_not_allowed(method: Method) -> ForecastError {
    tracing::debug!(method = %method, "Unsupported method on forecast route");
    ForecastError::MethodNotAllowed
}

fn body_rejection_error(rejection: BytesRejection) -> ForecastError {
    tracing::debug!(status = %rejection.status(), reason = %rejection.body_text(), "Failed to read request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ForecastError::PayloadTooLarge
    } else {
        ForecastError::MissingInput
    }
}

/// `application/json` or any `+json` media type, parameters ignored
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
