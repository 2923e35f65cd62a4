//! API request and response models.
//!
//! Request fields are optional at the type level so that a missing field
//! produces the endpoint's own 400 message rather than a generic
//! deserialization error. Defaults are applied by the accessor methods.

use crate::core::{AppError, Result};
use crate::services::prompts::{ItineraryPrompt, TripPlanPrompt};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_ORIGIN: &str = "Unknown";
pub const DEFAULT_LANGUAGE: &str = "bn";
pub const DEFAULT_CURRENCY: &str = "BDT";
pub const DEFAULT_ITINERARY_DAYS: u32 = 3;

/// Reject absent or blank values with `message`.
fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

/// Trip plan request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "origin": "Dhaka",
    "destination": "Cox's Bazar",
    "date": "2026-12-20",
    "language": "en",
    "currency": "BDT"
}))]
pub struct TripPlanRequest {
    /// Starting point (default "Unknown")
    pub origin: Option<String>,
    /// Required
    pub destination: Option<String>,
    /// Travel date, free-form
    pub date: Option<String>,
    /// Response language (default "bn")
    pub language: Option<String>,
    /// Currency for costs (default "BDT")
    pub currency: Option<String>,
}

impl TripPlanRequest {
    /// Validate and apply defaults.
    pub fn prompt(&self) -> Result<TripPlanPrompt<'_>> {
        Ok(TripPlanPrompt {
            destination: required(&self.destination, "Destination is required")?,
            origin: self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN),
            date: self.date.as_deref().unwrap_or(""),
            language: self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            currency: self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        })
    }
}

/// Itinerary request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"destination": "Sylhet", "days": 4, "language": "bn", "currency": "BDT"}))]
pub struct ItineraryRequest {
    /// Required
    pub destination: Option<String>,
    /// Number of days (default 3)
    pub days: Option<u32>,
    pub language: Option<String>,
    pub currency: Option<String>,
}

impl ItineraryRequest {
    pub fn prompt(&self) -> Result<ItineraryPrompt<'_>> {
        Ok(ItineraryPrompt {
            destination: required(&self.destination, "Destination is required")?,
            days: self.days.unwrap_or(DEFAULT_ITINERARY_DAYS),
            language: self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            currency: self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        })
    }
}

/// Current weather request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"city": "Dhaka"}))]
pub struct WeatherRequest {
    pub city: Option<String>,
}

impl WeatherRequest {
    pub fn city(&self) -> Result<&str> {
        required(&self.city, "City is required")
    }
}

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Location as sent by the front end. Either coordinate may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct LocationInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Nearby restaurants request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"location": {"lat": 23.8103, "lng": 90.4125}}))]
pub struct RestaurantsRequest {
    pub location: Option<LocationInput>,
}

impl RestaurantsRequest {
    /// A null or empty location counts as missing.
    pub fn location(&self) -> Result<GeoPoint> {
        match self.location.unwrap_or_default() {
            LocationInput { lat: Some(lat), lng: Some(lng) } => Ok(GeoPoint { lat, lng }),
            LocationInput { lat: None, lng: None } => {
                Err(AppError::BadRequest("Location is required".to_string()))
            }
            _ => Err(AppError::BadRequest(
                "Location must include lat and lng".to_string(),
            )),
        }
    }
}

/// Multipart form for image analysis.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ImageUpload {
    /// Image file; content type must be `image/*`
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanTripResponse {
    /// Model-written trip plan
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItineraryResponse {
    pub itinerary: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestaurantsResponse {
    pub restaurants: Vec<crate::normalizer::RestaurantSummary>,
}

/// Browser key for the front end.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyResponse {
    pub key: String,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "Destination is required"}))]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
