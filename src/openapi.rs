use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorResponse;
use crate::forecast::models::{ForecastRequest, ForecastResult, WeatherReadings};
use crate::health::HealthResponse;

/// OpenAPI documentation for the Skycast API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skycast API",
        version = "1.0.0",
        description = "Forecasts the next few hours of weather from a photo of the sky and ground readings, using Google Gemini.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::forecast::handlers::create_forecast,
        crate::health::health,
    ),
    tags(
        (name = "forecast", description = "AI sky forecasts"),
        (name = "health", description = "Service health")
    ),
    components(
        schemas(
            ErrorResponse,
            ForecastRequest,
            ForecastResult,
            HealthResponse,
            WeatherReadings,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
