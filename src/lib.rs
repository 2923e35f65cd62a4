//! Travel Relay - A backend relay between a travel front end and third-party APIs
//!
//! The relay keeps upstream credentials on the server and gives the front end
//! a small, stable JSON contract:
//!
//! - **Trip planning & itineraries**: prompts an OpenAI-compatible chat model
//! - **Weather**: current conditions from OpenWeatherMap
//! - **Restaurants**: nearby places from Google Places
//! - **Image analysis**: identifies a travel photo with a vision model
//! - **Metrics & Monitoring**: Prometheus metrics for observability
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`services`]: Upstream client adapters, one outbound call each
//! - [`normalizer`]: Turns raw upstream payloads into fixed-shape responses
//! - [`api`]: HTTP handlers, request/response models, and the router
//!
//! # Configuration
//!
//! All configuration comes from environment variables (a `.env` file is
//! loaded first if present). The most important ones:
//! - `OPENAI_API_KEY`, `OPENWEATHER_API_KEY`, `GOOGLE_MAPS_API_KEY`: upstream keys
//! - `MAPS_BROWSER_KEY`, `WEATHER_BROWSER_KEY`: public keys served to the front end
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8000)
//! - `REQUEST_TIMEOUT_SECS`: upstream timeout, at most 30 (default: 30)

pub mod api;
pub mod core;
pub mod normalizer;
pub mod services;

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types for convenience
pub use api::{router, ApiDoc, AppState};
pub use crate::core::{AppConfig, AppError, Result};
