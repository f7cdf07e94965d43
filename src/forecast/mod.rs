mod gemini;
pub mod handlers;
pub mod models;
mod prompt;
pub mod service;

pub use service::{ForecastService, ForecastServiceConfig};
