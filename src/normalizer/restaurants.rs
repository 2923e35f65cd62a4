//! Nearby-restaurant normalization.

use super::NormalizeError;
use serde::{Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

/// Maximum number of restaurants returned to the client.
pub const MAX_RESTAURANTS: usize = 5;

/// Placeholder served when upstream has no rating for a place.
pub const RATING_NOT_AVAILABLE: &str = "N/A";

/// Place rating: a number, or `"N/A"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    NotAvailable,
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::NotAvailable => serializer.serialize_str(RATING_NOT_AVAILABLE),
        }
    }
}

impl From<Option<&Value>> for Rating {
    fn from(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_f64)
            .map(Rating::Score)
            .unwrap_or(Rating::NotAvailable)
    }
}

/// One nearby restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({"name": "Star Kabab", "rating": 4.2, "vicinity": "Dhanmondi, Dhaka"}))]
pub struct RestaurantSummary {
    pub name: String,
    /// Numeric rating, or "N/A"
    #[schema(value_type = Object)]
    pub rating: Rating,
    pub vicinity: String,
}

/// Normalize a nearby-search response.
///
/// Keeps the first [`MAX_RESTAURANTS`] entries of `results` in upstream
/// order. An absent or empty `results` array yields an empty list; an entry
/// without `name` or `vicinity` fails the request.
pub fn normalize_restaurants(body: &Value) -> Result<Vec<RestaurantSummary>, NormalizeError> {
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        if status != "OK" && status != "ZERO_RESULTS" {
            let error_message = body.get("error_message").and_then(Value::as_str).unwrap_or("");
            tracing::warn!(status, error_message, "Places upstream returned non-OK status");
        }
    }

    let Some(results) = body.get("results").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    results
        .iter()
        .take(MAX_RESTAURANTS)
        .enumerate()
        .map(|(index, entry)| {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or(NormalizeError::MissingEntryField { index, field: "name" })?;
            let vicinity = entry
                .get("vicinity")
                .and_then(Value::as_str)
                .ok_or(NormalizeError::MissingEntryField { index, field: "vicinity" })?;

            Ok(RestaurantSummary {
                name: name.to_string(),
                rating: Rating::from(entry.get("rating")),
                vicinity: vicinity.to_string(),
            })
        })
        .collect()
}
