//! API layer for the travel relay.
//!
//! This module contains the HTTP handlers, request/response models, the
//! router, and the OpenAPI document.

pub mod handlers;
pub mod models;

pub use handlers::{
    analyze_image, health, itinerary, maps_key, metrics_handler, openapi_json, plan_trip,
    restaurants, weather, weather_key, AppState,
};
pub use models::{
    ErrorResponse, HealthResponse, ItineraryRequest, RestaurantsRequest, TripPlanRequest,
    WeatherRequest,
};

use crate::core::{request_id_middleware, AppError, MetricsMiddleware};
use axum::{
    extract::{DefaultBodyLimit, FromRequest},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

/// JSON body extractor whose rejections use the `{"error": ...}` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// OpenAPI documentation for the relay API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::plan_trip,
        handlers::itinerary,
        handlers::weather,
        handlers::restaurants,
        handlers::analyze_image,
        handlers::maps_key,
        handlers::weather_key,
        handlers::health,
    ),
    components(
        schemas(
            models::TripPlanRequest,
            models::ItineraryRequest,
            models::WeatherRequest,
            models::RestaurantsRequest,
            models::LocationInput,
            models::ImageUpload,
            models::PlanTripResponse,
            models::ItineraryResponse,
            models::RestaurantsResponse,
            models::KeyResponse,
            models::ErrorResponse,
            models::HealthResponse,
            crate::normalizer::WeatherResult,
            crate::normalizer::WeatherFailure,
            crate::normalizer::WeatherOutcome,
            crate::normalizer::RestaurantSummary,
            crate::normalizer::ImageAnalysisResult,
        )
    ),
    tags(
        (name = "travel", description = "Trip planning, weather, restaurants, and image analysis"),
        (name = "config", description = "Browser keys for the front end"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Travel Relay API",
        description = "Relay between the travel front end and third-party services.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://127.0.0.1:8000", description = "Local development server"),
        (url = "http://localhost:8000", description = "Local development server (localhost)")
    )
)]
pub struct ApiDoc;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    let api_routes = Router::new()
        .route("/plan-trip", post(plan_trip))
        .route("/itinerary", post(itinerary))
        .route("/weather", post(weather))
        .route("/restaurants", post(restaurants))
        .route(
            "/analyze-image",
            post(analyze_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/config/maps-key", get(maps_key))
        .route("/config/weather-key", get(weather_key));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/plan-trip",
            "/api/itinerary",
            "/api/weather",
            "/api/restaurants",
            "/api/analyze-image",
            "/api/config/maps-key",
            "/api/config/weather-key",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
