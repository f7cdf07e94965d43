use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::service::ForecastError;

/// Ground readings taken alongside the photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReadings {
    /// Air temperature
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Reported cloud cover (%)
    pub cloud_cover: f64,
}

/// Inbound forecast request body
///
/// Both fields are optional at the wire level so that a missing field reaches
/// validation instead of failing extraction.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    /// Base64-encoded JPEG of the sky
    pub image_data_base64: Option<String>,
    pub weather_data: Option<WeatherReadings>,
}

impl ForecastRequest {
    /// Parse a raw request body. Anything that does not fit the expected
    /// shape becomes an empty request and is rejected by `validate`.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "Request body does not match forecast request shape");
            Self::default()
        })
    }

    pub fn validate(self) -> Result<SkyObservation, ForecastError> {
        match (self.image_data_base64, self.weather_data) {
            (Some(image_base64), Some(weather)) if !image_base64.is_empty() => Ok(SkyObservation {
                image_base64,
                weather,
            }),
            _ => Err(ForecastError::MissingInput),
        }
    }
}

/// A request that passed validation
#[derive(Debug, Clone)]
pub struct SkyObservation {
    pub image_base64: String,
    pub weather: WeatherReadings,
}

/// Forecast returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastResult {
    pub prediction_text: String,
    /// 0-100
    pub rain_probability_percent: f64,
    /// 0-100
    pub cloud_coverage_percent: f64,
    /// 0-100
    pub confidence_score_percent: f64,
}
