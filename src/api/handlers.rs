//! HTTP request handlers for the travel relay API.
//!
//! Every handler follows the same pipeline: validate input, make one
//! upstream call, normalize, respond. Validation failures return before any
//! upstream client is touched.

use crate::api::models::*;
use crate::api::ApiJson;
use crate::core::config::AppConfig;
use crate::core::logging::get_request_id;
use crate::core::{AppError, Result};
use crate::normalizer::{
    normalize_image_analysis, normalize_restaurants, normalize_weather, FallbackReason,
    ImageAnalysisResult, WeatherOutcome,
};
use crate::services::prompts::{itinerary_messages, trip_plan_messages};
use crate::services::{CompletionClient, PlacesClient, VisionClient, WeatherClient};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub completion: CompletionClient,
    pub vision: VisionClient,
    pub weather: WeatherClient,
    pub places: PlacesClient,
}

impl AppState {
    /// Build every upstream client on top of one shared HTTP client.
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        Self {
            completion: CompletionClient::new(http_client.clone(), &config.openai),
            vision: VisionClient::new(http_client.clone(), &config.openai),
            weather: WeatherClient::new(http_client.clone(), &config.weather),
            places: PlacesClient::new(http_client, &config.places),
            config,
        }
    }
}

/// Plan a trip with the chat model.
#[utoipa::path(
    post,
    path = "/api/plan-trip",
    tag = "travel",
    request_body = TripPlanRequest,
    responses(
        (status = 200, description = "Trip plan", body = PlanTripResponse),
        (status = 400, description = "Destination missing", body = ErrorResponse),
        (status = 500, description = "Completion failed", body = ErrorResponse)
    )
)]
pub async fn plan_trip(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TripPlanRequest>,
) -> Result<Json<PlanTripResponse>> {
    let prompt = payload.prompt()?;

    tracing::info!(
        request_id = %get_request_id(),
        language = prompt.language,
        currency = prompt.currency,
        "Planning trip"
    );

    let result = state.completion.complete(trip_plan_messages(prompt)).await?;
    Ok(Json(PlanTripResponse { result }))
}

/// Generate a day-by-day itinerary.
#[utoipa::path(
    post,
    path = "/api/itinerary",
    tag = "travel",
    request_body = ItineraryRequest,
    responses(
        (status = 200, description = "Itinerary", body = ItineraryResponse),
        (status = 400, description = "Destination missing", body = ErrorResponse),
        (status = 500, description = "Completion failed", body = ErrorResponse)
    )
)]
pub async fn itinerary(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>> {
    let prompt = payload.prompt()?;

    tracing::info!(request_id = %get_request_id(), days = prompt.days, "Generating itinerary");

    let itinerary = state.completion.complete(itinerary_messages(prompt)).await?;
    Ok(Json(ItineraryResponse { itinerary }))
}

/// Current weather for a city.
///
/// An upstream-reported failure is returned with status 200 and an `error` key.
#[utoipa::path(
    post,
    path = "/api/weather",
    tag = "travel",
    request_body = WeatherRequest,
    responses(
        (status = 200, description = "Weather report, or an upstream error in-band", body = WeatherOutcome),
        (status = 400, description = "City missing", body = ErrorResponse),
        (status = 500, description = "Weather lookup failed", body = ErrorResponse)
    )
)]
pub async fn weather(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<WeatherRequest>,
) -> Result<Json<WeatherOutcome>> {
    let city = payload.city()?;

    let (status, body) = state.weather.current_by_city(city).await.map_err(|e| {
        tracing::error!(request_id = %get_request_id(), city, error = %e, "Weather lookup failed");
        e
    })?;

    let outcome = normalize_weather(status, &body).map_err(|e| {
        tracing::error!(request_id = %get_request_id(), city, error = %e, "Weather response malformed");
        AppError::from(e)
    })?;

    Ok(Json(outcome))
}

/// Up to five restaurants near a location.
#[utoipa::path(
    post,
    path = "/api/restaurants",
    tag = "travel",
    request_body = RestaurantsRequest,
    responses(
        (status = 200, description = "Nearby restaurants in upstream order", body = RestaurantsResponse),
        (status = 400, description = "Location missing", body = ErrorResponse),
        (status = 500, description = "Places lookup failed", body = ErrorResponse)
    )
)]
pub async fn restaurants(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RestaurantsRequest>,
) -> Result<Json<RestaurantsResponse>> {
    let location = payload.location()?;

    let body = state
        .places
        .nearby_restaurants(location.lat, location.lng)
        .await?;
    let restaurants = normalize_restaurants(&body)?;

    tracing::debug!(
        request_id = %get_request_id(),
        count = restaurants.len(),
        "Restaurants normalized"
    );

    Ok(Json(RestaurantsResponse { restaurants }))
}

/// A validated image upload.
struct UploadedImage {
    bytes: bytes::Bytes,
    content_type: String,
}

/// Pull the `image` field out of the form, checking it in order: present,
/// non-empty, an image.
async fn read_image_field(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<UploadedImage> {
    let no_file = || AppError::BadRequest("No image file provided".to_string());

    let mut multipart = multipart.map_err(|_| no_file())?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        // A part without a filename is a plain text field, not a file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(no_file());
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if file_name.is_empty() || bytes.is_empty() {
            return Err(AppError::BadRequest("No selected file".to_string()));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest("File must be an image".to_string()));
        }

        return Ok(UploadedImage {
            bytes,
            content_type,
        });
    }

    Err(no_file())
}

/// Identify the place in a travel photo.
///
/// Always answers 200 with all six keys once the upload is valid; a failed
/// or unreadable model answer yields the fallback object.
#[utoipa::path(
    post,
    path = "/api/analyze-image",
    tag = "travel",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image analysis", body = ImageAnalysisResult),
        (status = 400, description = "Missing, empty, or non-image upload", body = ErrorResponse)
    )
)]
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageAnalysisResult>> {
    let upload = read_image_field(multipart).await?;

    tracing::info!(
        request_id = %get_request_id(),
        bytes = upload.bytes.len(),
        content_type = %upload.content_type,
        "Analyzing image"
    );

    let analysis = match state
        .vision
        .describe_image(&upload.bytes, &upload.content_type)
        .await
    {
        Ok(text) => normalize_image_analysis(&text),
        Err(e) => {
            tracing::error!(
                request_id = %get_request_id(),
                error = %e,
                "Vision call failed, serving fallback analysis"
            );
            ImageAnalysisResult::fallback(FallbackReason::UpstreamFailure)
        }
    };

    Ok(Json(analysis))
}

/// Browser key for the maps front end.
#[utoipa::path(
    get,
    path = "/api/config/maps-key",
    tag = "config",
    responses(
        (status = 200, description = "Browser maps key", body = KeyResponse),
        (status = 404, description = "No browser key configured", body = ErrorResponse)
    )
)]
pub async fn maps_key(State(state): State<Arc<AppState>>) -> Result<Json<KeyResponse>> {
    browser_key(state.config.browser_keys.maps.as_deref(), "Maps")
}

/// Browser key for the weather front end.
#[utoipa::path(
    get,
    path = "/api/config/weather-key",
    tag = "config",
    responses(
        (status = 200, description = "Browser weather key", body = KeyResponse),
        (status = 404, description = "No browser key configured", body = ErrorResponse)
    )
)]
pub async fn weather_key(State(state): State<Arc<AppState>>) -> Result<Json<KeyResponse>> {
    browser_key(state.config.browser_keys.weather.as_deref(), "Weather")
}

fn browser_key(key: Option<&str>, label: &str) -> Result<Json<KeyResponse>> {
    key.map(|key| Json(KeyResponse { key: key.to_string() }))
        .ok_or_else(|| AppError::NotFound(format!("{} key is not configured", label)))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    tracing::debug!(request_id = %get_request_id(), "Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response())
}

/// OpenAPI document for the whole API.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(crate::api::ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_key_present() {
        let Json(body) = browser_key(Some("AIza-browser"), "Maps").unwrap();
        assert_eq!(body.key, "AIza-browser");
    }

    #[test]
    fn test_browser_key_missing_is_not_found() {
        let err = browser_key(None, "Weather").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Weather key is not configured");
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, crate::VERSION);
    }
}
