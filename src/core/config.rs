//! Configuration management for the travel relay.
//!
//! All settings come from environment variables (optionally seeded from a
//! `.env` file by the binary). The resulting [`AppConfig`] is built once at
//! startup and carried in the application state; nothing reads the
//! environment after that.

use serde::{Deserialize, Serialize};

/// Hard ceiling for outbound request timeouts, in seconds.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Language-model completion API settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Places API settings
    #[serde(default)]
    pub places: PlacesConfig,

    /// Public keys handed out to the front end
    #[serde(default)]
    pub browser_keys: BrowserKeysConfig,

    /// Whether to verify SSL certificates for upstream requests
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Request timeout in seconds for upstream calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size for image uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Completion and vision model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model used for trip plans and itineraries
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Image-capable model used for photo analysis
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Current-weather API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_weather_api_base")]
    pub api_base: String,
}

/// Nearby-search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_places_api_base")]
    pub api_base: String,
}

/// Referrer-restricted keys the front end may use directly.
///
/// These are deliberately separate from the server-side secrets above.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserKeysConfig {
    #[serde(default)]
    pub maps: Option<String>,

    #[serde(default)]
    pub weather: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            openai: OpenAiConfig::default(),
            weather: WeatherConfig::default(),
            places: PlacesConfig::default(),
            browser_keys: BrowserKeysConfig::default(),
            verify_ssl: default_verify_ssl(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_openai_api_base(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_weather_api_base(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_places_api_base(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_verify_ssl() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    MAX_REQUEST_TIMEOUT_SECS
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_weather_api_base() -> String {
    "http://api.openweathermap.org/data/2.5".to_string()
}

fn default_places_api_base() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use travel_relay::core::config::AppConfig;
    ///
    /// dotenvy::dotenv().ok();
    /// let config = AppConfig::from_env();
    /// println!("listening on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; unparseable numeric or boolean
    /// values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT") {
            config.server.port = port;
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.openai.api_key = key;
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            config.openai.api_base = trim_base(base);
        }
        if let Some(model) = lookup("OPENAI_CHAT_MODEL") {
            config.openai.chat_model = model;
        }
        if let Some(model) = lookup("OPENAI_VISION_MODEL") {
            config.openai.vision_model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "OPENAI_TEMPERATURE") {
            config.openai.temperature = temperature;
        }

        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            config.weather.api_key = key;
        }
        if let Some(base) = lookup("OPENWEATHER_API_BASE") {
            config.weather.api_base = trim_base(base);
        }

        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY") {
            config.places.api_key = key;
        }
        if let Some(base) = lookup("GOOGLE_PLACES_API_BASE") {
            config.places.api_base = trim_base(base);
        }

        config.browser_keys.maps = lookup("MAPS_BROWSER_KEY").filter(|k| !k.is_empty());
        config.browser_keys.weather = lookup("WEATHER_BROWSER_KEY").filter(|k| !k.is_empty());

        if let Some(verify_ssl) = lookup("VERIFY_SSL") {
            config.verify_ssl = str_to_bool(&verify_ssl);
        }
        if let Some(timeout) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout;
        }
        if let Some(limit) = parse_var(&lookup, "MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit;
        }

        config.request_timeout_secs = clamp_timeout(config.request_timeout_secs);
        config
    }

    /// Log warnings for settings that will only fail once a request arrives.
    pub fn warn_missing_keys(&self) {
        if self.openai.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; completion and image analysis calls will fail");
        }
        if self.weather.api_key.is_empty() {
            tracing::warn!("OPENWEATHER_API_KEY is not set; weather lookups will fail");
        }
        if self.places.api_key.is_empty() {
            tracing::warn!("GOOGLE_MAPS_API_KEY is not set; restaurant search will fail");
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

/// Clamp a timeout into `1..=MAX_REQUEST_TIMEOUT_SECS`.
fn clamp_timeout(secs: u64) -> u64 {
    if secs > MAX_REQUEST_TIMEOUT_SECS {
        tracing::warn!(
            requested = secs,
            ceiling = MAX_REQUEST_TIMEOUT_SECS,
            "Request timeout exceeds ceiling, clamping"
        );
    }
    secs.clamp(1, MAX_REQUEST_TIMEOUT_SECS)
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.openai.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.verify_ssl);
        assert!(config.browser_keys.maps.is_none());
        assert!(config.openai.api_key.is_empty());
    }

    #[test]
    fn test_keys_and_bases_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENWEATHER_API_KEY", "owm-test"),
            ("GOOGLE_MAPS_API_KEY", "maps-test"),
            ("OPENWEATHER_API_BASE", "http://localhost:9000/"),
            ("PORT", "9999"),
        ]));

        assert_eq!(config.openai.api_key, "sk-test");
        assert_eq!(config.weather.api_key, "owm-test");
        assert_eq!(config.places.api_key, "maps-test");
        assert_eq!(config.weather.api_base, "http://localhost:9000");
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_timeout_is_clamped() {
        let config = AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "300")]));
        assert_eq!(config.request_timeout_secs, MAX_REQUEST_TIMEOUT_SECS);

        let config = AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(config.request_timeout_secs, 1);

        let config = AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "12")]));
        assert_eq!(config.request_timeout_secs, 12);
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("OPENAI_TEMPERATURE", "warm"),
        ]));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.openai.temperature, 0.7);
    }

    #[test]
    fn test_empty_browser_keys_are_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MAPS_BROWSER_KEY", ""),
            ("WEATHER_BROWSER_KEY", "public-weather"),
        ]));
        assert!(config.browser_keys.maps.is_none());
        assert_eq!(config.browser_keys.weather.as_deref(), Some("public-weather"));
    }

    #[test]
    fn test_str_to_bool() {
        assert!(str_to_bool("true"));
        assert!(str_to_bool("TRUE"));
        assert!(str_to_bool("1"));
        assert!(str_to_bool("yes"));
        assert!(str_to_bool("On"));
        assert!(!str_to_bool("false"));
        assert!(!str_to_bool("0"));
        assert!(!str_to_bool(""));
        assert!(!str_to_bool("invalid"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        unsafe {
            std::env::set_var("HOST", "127.0.0.1");
            std::env::set_var("VERIFY_SSL", "false");
        }

        let config = AppConfig::from_env();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.verify_ssl);

        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("VERIFY_SSL");
        }
    }
}
