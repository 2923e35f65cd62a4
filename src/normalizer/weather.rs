//! Current-weather normalization.
//!
//! A non-success upstream status is not a request failure: it is reported
//! in-band as `{"error": ...}` and served with HTTP 200, so clients detect it
//! by the presence of the `error` key. A success status with a body missing
//! the expected fields is a request failure.

use super::NormalizeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"temperature": 29.4, "description": "scattered clouds", "icon": "03d"}))]
pub struct WeatherResult {
    /// Temperature in °C
    pub temperature: f64,
    pub description: String,
    /// Upstream icon code
    pub icon: String,
}

/// Upstream-reported failure, served in-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "OpenWeatherMap error: city not found"}))]
pub struct WeatherFailure {
    pub error: String,
}

/// Either a weather report or an in-band failure body.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum WeatherOutcome {
    Report(WeatherResult),
    Failed(WeatherFailure),
}

/// Normalize a current-weather response.
///
/// `status` is the upstream HTTP status code and `body` its decoded JSON.
pub fn normalize_weather(status: u16, body: &Value) -> Result<WeatherOutcome, NormalizeError> {
    if !(200..300).contains(&status) {
        let message = match body.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        };
        tracing::warn!(status, message = %message, "Weather upstream reported failure");
        return Ok(WeatherOutcome::Failed(WeatherFailure {
            error: format!("OpenWeatherMap error: {}", message),
        }));
    }

    let temperature = body
        .pointer("/main/temp")
        .and_then(Value::as_f64)
        .ok_or(NormalizeError::MissingField("main.temp"))?;

    let current = body
        .pointer("/weather/0")
        .ok_or(NormalizeError::MissingField("weather[0]"))?;

    let description = current
        .get("description")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("weather[0].description"))?;

    let icon = current
        .get("icon")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("weather[0].icon"))?;

    Ok(WeatherOutcome::Report(WeatherResult {
        temperature,
        description: description.to_string(),
        icon: icon.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dhaka() -> Value {
        json!({
            "coord": {"lon": 90.4074, "lat": 23.7104},
            "weather": [{"id": 721, "main": "Haze", "description": "haze", "icon": "50d"}],
            "main": {"temp": 31.99, "feels_like": 38.99, "humidity": 66},
            "name": "Dhaka",
            "cod": 200
        })
    }

    #[test]
    fn test_success_extracts_fields() {
        let outcome = normalize_weather(200, &dhaka()).unwrap();
        assert_eq!(
            outcome,
            WeatherOutcome::Report(WeatherResult {
                temperature: 31.99,
                description: "haze".to_string(),
                icon: "50d".to_string(),
            })
        );
    }

    #[test]
    fn test_integer_temperature_is_accepted() {
        let mut body = dhaka();
        body["main"]["temp"] = json!(30);
        let WeatherOutcome::Report(report) = normalize_weather(200, &body).unwrap() else {
            panic!("expected a report");
        };
        assert_eq!(report.temperature, 30.0);
    }

    #[test]
    fn test_upstream_failure_uses_upstream_message() {
        let body = json!({"cod": "404", "message": "city not found"});
        let outcome = normalize_weather(404, &body).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "OpenWeatherMap error: city not found"})
        );
    }

    #[test]
    fn test_upstream_failure_without_message() {
        let outcome = normalize_weather(401, &json!({"cod": 401})).unwrap();
        assert_eq!(
            outcome,
            WeatherOutcome::Failed(WeatherFailure {
                error: "OpenWeatherMap error: Unknown error".to_string()
            })
        );
    }

    #[test]
    fn test_missing_temperature_is_fatal() {
        let mut body = dhaka();
        body["main"] = json!({});
        assert_eq!(
            normalize_weather(200, &body),
            Err(NormalizeError::MissingField("main.temp"))
        );
    }

    #[test]
    fn test_empty_weather_list_is_fatal() {
        let mut body = dhaka();
        body["weather"] = json!([]);
        assert_eq!(
            normalize_weather(200, &body),
            Err(NormalizeError::MissingField("weather[0]"))
        );
    }

    #[test]
    fn test_report_serializes_flat() {
        let outcome = normalize_weather(200, &dhaka()).unwrap();
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["icon"], "50d");
        assert!(value.get("error").is_none());
    }
}
