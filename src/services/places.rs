//! Google Places nearby-search adapter.

use super::{observe, transport_error};
use crate::core::config::PlacesConfig;
use crate::core::{AppError, Result};
use serde_json::Value;

/// Search radius in meters.
pub const SEARCH_RADIUS_METERS: u32 = 3000;

#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, config: &PlacesConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Restaurants around (`lat`, `lng`), as the raw search response.
    pub async fn nearby_restaurants(&self, lat: f64, lng: f64) -> Result<Value> {
        observe("places", async {
            let endpoint = "/nearbysearch/json";
            let location = format!("{},{}", lat, lng);
            let radius = SEARCH_RADIUS_METERS.to_string();

            let response = self
                .http
                .get(format!("{}{}", self.api_base, endpoint))
                .query(&[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", "restaurant"),
                    ("key", self.api_key.as_str()),
                ])
                .send()
                .await
                .map_err(|e| transport_error("places", endpoint, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::upstream(
                    "Google Places",
                    format!("HTTP {}", status.as_u16()),
                ));
            }

            response
                .json()
                .await
                .map_err(|e| transport_error("places", endpoint, e))
        })
        .await
    }
}
