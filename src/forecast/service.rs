use axum::http::StatusCode;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::gemini::{GenerateContentRequest, GenerateContentResponse};
use super::models::{ForecastRequest, ForecastResult};
use super::prompt::build_prompt;
use crate::error::HttpError;
use crate::impl_into_response;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("API key not configured")]
    ApiKeyNotConfigured,

    #[error("Missing image or weather data")]
    MissingInput,

    #[error("Payload Too Large")]
    PayloadTooLarge,

    #[error("Error from Google API")]
    Upstream { status: StatusCode, details: Value },

    #[error("Internal Server Error")]
    Internal(#[from] UpstreamFailure),
}

/// Failures after the upstream call was issued that are not reported to the caller
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    #[error("Request to generation API failed: {0}")]
    Transport(reqwest::Error),

    #[error("Malformed generation API response: {0}")]
    MalformedResponse(serde_json::Error),

    #[error("Generation API response has no candidate text")]
    MissingCandidateText,

    #[error("Model output is not a valid forecast: {0}")]
    InvalidForecast(serde_json::Error),
}

impl UpstreamFailure {
    /// The request URL carries the API key, so it is stripped before logging
    fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl HttpError for ForecastError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ApiKeyNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            Self::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        }
    }
}

impl_into_response!(ForecastError);

/// Configuration for building ForecastService
pub struct ForecastServiceConfig<'a> {
    pub client: Client,
    pub api_key: Option<&'a str>,
    pub base_url: &'a str,
    pub model: &'a str,
    pub location: &'a str,
}

pub struct ForecastService {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    location: String,
}

impl ForecastService {
    pub fn from_config(config: ForecastServiceConfig<'_>) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Self {
            client: config.client,
            api_key: config.api_key.map(|k| k.to_string()),
            endpoint,
            location: config.location.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or the error every forecast request gets without one
    pub fn ensure_configured(&self) -> Result<&str, ForecastError> {
        self.api_key
            .as_deref()
            .ok_or(ForecastError::ApiKeyNotConfigured)
    }

    /// Validate the request, ask the model for a forecast and parse its answer
    pub async fn predict(&self, request: ForecastRequest) -> Result<ForecastResult, ForecastError> {
        let api_key = self.ensure_configured()?;

        let observation = request.validate()?;

        tracing::debug!(
            temperature = %observation.weather.temperature,
            humidity = %observation.weather.humidity,
            cloud_cover = %observation.weather.cloud_cover,
            image_len = observation.image_base64.len(),
            "Requesting sky forecast"
        );

        let prompt = build_prompt(&observation.weather, &self.location);
        let payload = GenerateContentRequest::with_image(prompt, observation.image_base64);

        let forecast = self.generate(api_key, &payload).await?;

        tracing::info!(
            rain = %forecast.rain_probability_percent,
            clouds = %forecast.cloud_coverage_percent,
            confidence = %forecast.confidence_score_percent,
            "Forecast generated successfully"
        );

        Ok(forecast)
    }

    /// Single upstream round trip. Everything except an upstream rejection
    /// collapses into `ForecastError::Internal`.
    async fn generate(
        &self,
        api_key: &str,
        payload: &GenerateContentRequest,
    ) -> Result<ForecastResult, ForecastError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .await
            .map_err(UpstreamFailure::transport)?;

        let status = response.status();
        tracing::debug!(status = %status, "Received generation API response");

        let body = response
            .bytes()
            .await
            .map_err(UpstreamFailure::transport)?;

        if !status.is_success() {
            let details = serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
            tracing::error!(status = %status, details = %details, "Generation API error");
            return Err(ForecastError::Upstream { status, details });
        }

        let data: GenerateContentResponse =
            serde_json::from_slice(&body).map_err(UpstreamFailure::MalformedResponse)?;

        let text = data
            .first_text()
            .ok_or(UpstreamFailure::MissingCandidateText)?;

        let forecast = serde_json::from_str(text).map_err(UpstreamFailure::InvalidForecast)?;
        Ok(forecast)
    }
}
