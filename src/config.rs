use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Unprefixed variable used by the original serverless deployment
const LEGACY_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Gemini API key (optional at startup - requests fail with 500 until it is set)
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Base URL of the generation API
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Vision-capable model used for forecasts
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Location context written into the prompt
    #[serde(default = "default_location")]
    pub location: String,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Overall timeout for the upstream call; unset means wait indefinitely
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_location() -> String {
    "London, United Kingdom".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Start with default values
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("gemini_base_url", default_gemini_base_url())?
            .set_default("gemini_model", default_gemini_model())?
            .set_default("location", default_location())?
            // Load from config file if present
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // Override with environment variables (prefixed with SKYCAST_)
            // Convert SCREAMING_SNAKE_CASE env vars to snake_case config keys
            .add_source(
                Environment::with_prefix("SKYCAST")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        if app_config.api_key().is_none() {
            app_config.gemini_api_key = std::env::var(LEGACY_API_KEY_VAR).ok();
        }

        Ok(app_config)
    }

    /// The configured API key, treating blank values as absent
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
