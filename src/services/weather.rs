//! OpenWeatherMap current-weather adapter.

use super::{observe, transport_error};
use crate::core::config::WeatherConfig;
use crate::core::Result;
use serde_json::Value;

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Current conditions for `city` in metric units.
    ///
    /// Returns the upstream status with the decoded body. A non-2xx status
    /// is not an error at this level.
    pub async fn current_by_city(&self, city: &str) -> Result<(u16, Value)> {
        observe("weather", async {
            let endpoint = "/weather";
            let response = self
                .http
                .get(format!("{}{}", self.api_base, endpoint))
                .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
                .send()
                .await
                .map_err(|e| transport_error("weather", endpoint, e))?;

            let status = response.status().as_u16();
            let body: Value = response
                .json()
                .await
                .map_err(|e| transport_error("weather", endpoint, e))?;

            tracing::debug!(
                request_id = %crate::core::logging::get_request_id(),
                status,
                "Weather upstream responded"
            );
            Ok((status, body))
        })
        .await
    }
}
