use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::forecast::handlers as forecast_handlers;
use crate::health;
use crate::openapi::swagger_ui;
use crate::AppState;

/// POST-only forecast endpoint
///
/// Non-POST methods get the JSON 405 body instead of axum's empty one.
fn forecast_endpoint() -> MethodRouter<AppState> {
    post(forecast_handlers::create_forecast).fallback(forecast_handlers::method_not_allowed)
}

/// Build the forecast API routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/forecast", forecast_endpoint())
        // Path used by the original serverless deployment
        .route("/api/gemini", forecast_endpoint())
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        // Health check at root level
        .route("/", get(health::health))
        .route("/health", get(health::health))
        .merge(forecast_routes())
        // Swagger UI for API documentation
        .merge(swagger_ui())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{tests::test_config, AppConfig};
    use crate::forecast::service::tests::{candidate_body, CLEAR_SKIES, GENERATE_PATH};
    use crate::forecast::{ForecastService, ForecastServiceConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_BODY: &str = r#"{
        "imageDataBase64": "/9j/4AAQSkZJRg==",
        "weatherData": { "temperature": 12, "humidity": 88, "cloudCover": 95 }
    }"#;

    fn app(server: &MockServer, api_key: Option<&str>) -> Router {
        app_with_config(test_config(api_key, &server.uri()))
    }

    fn app_with_config(config: AppConfig) -> Router {
        let forecast_service = ForecastService::from_config(ForecastServiceConfig {
            client: reqwest::Client::new(),
            api_key: config.api_key(),
            base_url: &config.gemini_base_url,
            model: &config.gemini_model,
            location: &config.location,
        });

        build_router(AppState {
            forecast_service: Arc::new(forecast_service),
            config: Arc::new(config),
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        send_with_content_type(app, method, uri, "application/json", body).await
    }

    async fn send_with_content_type(
        app: Router,
        method: &str,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn mount_success(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(CLEAR_SKIES)))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_non_post_is_method_not_allowed() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        for verb in ["GET", "PUT", "DELETE", "PATCH"] {
            let (status, body) = send(app(&server, Some("k")), verb, "/api/v1/forecast", "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{verb}");
            assert_eq!(body, json!({ "error": "Method Not Allowed" }));
        }
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        let (status, body) = send(app(&server, None), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "API key not configured" }));
    }

    #[tokio::test]
    async fn test_missing_image_or_weather() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        for payload in [
            r#"{ "weatherData": { "temperature": 12, "humidity": 88, "cloudCover": 95 } }"#,
            r#"{ "imageDataBase64": "/9j/4AAQSkZJRg==" }"#,
            r#"{}"#,
            "",
        ] {
            let (status, body) =
                send(app(&server, Some("k")), "POST", "/api/v1/forecast", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Missing image or weather data" }));
        }
    }

    #[tokio::test]
    async fn test_successful_forecast() {
        let server = MockServer::start().await;
        mount_success(&server, 1).await;

        let (status, body) =
            send(app(&server, Some("k")), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction_text"], "Clear skies");
        assert_eq!(body["rain_probability_percent"].as_f64(), Some(10.0));
        assert_eq!(body["cloud_coverage_percent"].as_f64(), Some(20.0));
        assert_eq!(body["confidence_score_percent"].as_f64(), Some(90.0));
    }

    #[tokio::test]
    async fn test_legacy_route_alias() {
        let server = MockServer::start().await;
        mount_success(&server, 1).await;

        let (status, body) = send(app(&server, Some("k")), "POST", "/api/gemini", VALID_BODY).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction_text"], "Clear skies");
    }

    #[tokio::test]
    async fn test_upstream_error_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "error": { "message": "quota" } })),
            )
            .mount(&server)
            .await;

        let (status, body) =
            send(app(&server, Some("k")), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            json!({
                "error": "Error from Google API",
                "details": { "error": { "message": "quota" } }
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_model_output_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("sorry, I cannot help")),
            )
            .mount(&server)
            .await;

        let (status, body) =
            send(app(&server, Some("k")), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_json_error() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        let mut config = test_config(Some("k"), &server.uri());
        config.max_body_bytes = 16;

        let (status, body) =
            send(app_with_config(config), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "error": "Payload Too Large" }));
    }

    #[tokio::test]
    async fn test_oversized_body_without_key_reports_missing_key() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        let mut config = test_config(None, &server.uri());
        config.max_body_bytes = 16;

        let (status, body) =
            send(app_with_config(config), "POST", "/api/v1/forecast", VALID_BODY).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "API key not configured" }));
    }

    #[tokio::test]
    async fn test_non_json_content_type_is_missing_data() {
        let server = MockServer::start().await;
        mount_success(&server, 0).await;

        let (status, body) = send_with_content_type(
            app(&server, Some("k")),
            "POST",
            "/api/v1/forecast",
            "text/plain",
            VALID_BODY,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing image or weather data" }));
    }

    #[tokio::test]
    async fn test_json_content_type_with_charset() {
        let server = MockServer::start().await;
        mount_success(&server, 1).await;

        let (status, body) = send_with_content_type(
            app(&server, Some("k")),
            "POST",
            "/api/v1/forecast",
            "application/json; charset=utf-8",
            VALID_BODY,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction_text"], "Clear skies");
    }

    #[tokio::test]
    async fn test_health_reports_key_presence() {
        let server = MockServer::start().await;

        let (status, body) = send(app(&server, None), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["api_key_configured"], false);

        let (_, body) = send(app(&server, Some("k")), "GET", "/", "").await;
        assert_eq!(body["api_key_configured"], true);
    }
}
