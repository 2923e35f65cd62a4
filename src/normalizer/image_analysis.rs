//! Image-analysis normalization.
//!
//! The vision model is asked for JSON but is not bound to produce it: the
//! answer may be bare JSON, JSON wrapped in a markdown fence or prose, or no
//! JSON at all. Whatever arrives, the client always receives exactly six
//! string keys.
//!
//! Salvage takes the span from the first `{` to the last `}` in the text.
//! This is greedy and does not balance braces, so text holding two separate
//! objects yields a span covering both, which then fails to parse and falls
//! back. That behavior is kept as-is for compatibility with existing clients.

use crate::core::metrics::get_metrics;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Substituted for keys the model left out.
pub const NOT_AVAILABLE: &str = "Information not available";

/// Field value used in the fallback object.
pub const UNKNOWN: &str = "Unknown";

/// Fallback description when the model output held no usable object.
pub const PARSE_FAILURE_DESCRIPTION: &str = "Could not parse the image analysis response.";

/// Fallback description when the vision service call itself failed.
pub const UPSTREAM_FAILURE_DESCRIPTION: &str =
    "Image analysis failed: the vision service could not be reached.";

/// Keys every analysis result carries, in response order.
pub const FIELDS: [&str; 6] = [
    "place_name",
    "city",
    "country",
    "description",
    "best_time",
    "things_to_do",
];

static JSON_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// What the vision model recognized in a travel photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "place_name": "Cox's Bazar Beach",
    "city": "Cox's Bazar",
    "country": "Bangladesh",
    "description": "One of the longest natural sea beaches in the world.",
    "best_time": "November to March",
    "things_to_do": "Beach walks, Himchari waterfall, Inani beach"
}))]
pub struct ImageAnalysisResult {
    pub place_name: String,
    pub city: String,
    pub country: String,
    pub description: String,
    pub best_time: String,
    pub things_to_do: String,
}

/// Why a fallback result was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The model answered, but no JSON object could be recovered
    UnparseableOutput,
    /// The vision service call failed
    UpstreamFailure,
}

impl FallbackReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnparseableOutput => "unparseable_output",
            Self::UpstreamFailure => "upstream_failure",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::UnparseableOutput => PARSE_FAILURE_DESCRIPTION,
            Self::UpstreamFailure => UPSTREAM_FAILURE_DESCRIPTION,
        }
    }
}

impl ImageAnalysisResult {
    /// The fixed all-sentinel result; only `description` varies by reason.
    pub fn fallback(reason: FallbackReason) -> Self {
        get_metrics()
            .normalizer_fallbacks
            .with_label_values(&["image_analysis", reason.as_str()])
            .inc();

        Self {
            place_name: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            description: reason.description().to_string(),
            best_time: UNKNOWN.to_string(),
            things_to_do: UNKNOWN.to_string(),
        }
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let field = |key: &str| field_text(object.get(key));
        Self {
            place_name: field("place_name"),
            city: field("city"),
            country: field("country"),
            description: field("description"),
            best_time: field("best_time"),
            things_to_do: field("things_to_do"),
        }
    }
}

/// Render one field as the string the client receives.
///
/// Models occasionally answer `things_to_do` with a list; a list of strings
/// is joined, anything else non-string is kept as compact JSON text.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) if items.is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Span from the first `{` to the last `}`, if the text has one.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Recover an analysis object from model text, if there is one.
pub fn parse_image_analysis(text: &str) -> Option<ImageAnalysisResult> {
    let candidate = extract_json_span(text).unwrap_or(text);
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(ImageAnalysisResult::from_object(&object)),
        Ok(_) | Err(_) => None,
    }
}

/// Normalize model text into an [`ImageAnalysisResult`], never failing.
pub fn normalize_image_analysis(text: &str) -> ImageAnalysisResult {
    parse_image_analysis(text).unwrap_or_else(|| {
        tracing::warn!(
            request_id = %crate::core::logging::get_request_id(),
            output_len = text.len(),
            "Vision model output held no parseable JSON object"
        );
        ImageAnalysisResult::fallback(FallbackReason::UnparseableOutput)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full_object() -> Value {
        json!({
            "place_name": "Sixty Dome Mosque",
            "city": "Bagerhat",
            "country": "Bangladesh",
            "description": "A 15th-century mosque and UNESCO World Heritage Site.",
            "best_time": "October to February",
            "things_to_do": "Visit the mosque, Khan Jahan Ali's tomb"
        })
    }

    #[test]
    fn test_bare_json_is_used_verbatim() {
        let text = full_object().to_string();
        let result = normalize_image_analysis(&text);
        assert_eq!(serde_json::to_value(&result).unwrap(), full_object());
    }

    #[test]
    fn test_json_inside_markdown_fence() {
        let text = format!(
            "Here is what I found:\n```json\n{}\n```\nEnjoy your trip!",
            serde_json::to_string_pretty(&full_object()).unwrap()
        );
        let result = normalize_image_analysis(&text);
        assert_eq!(result.city, "Bagerhat");
        assert_eq!(result.best_time, "October to February");
    }

    #[test]
    fn test_missing_keys_get_sentinel() {
        let text = r#"{"place_name": "Ratargul Swamp Forest", "country": "Bangladesh"}"#;
        let result = normalize_image_analysis(text);

        assert_eq!(result.place_name, "Ratargul Swamp Forest");
        assert_eq!(result.country, "Bangladesh");
        assert_eq!(result.city, NOT_AVAILABLE);
        assert_eq!(result.description, NOT_AVAILABLE);
        assert_eq!(result.best_time, NOT_AVAILABLE);
        assert_eq!(result.things_to_do, NOT_AVAILABLE);
    }

    #[test]
    fn test_no_json_gives_parse_fallback() {
        let result = normalize_image_analysis("I'm sorry, I can't identify this location.");
        assert_eq!(result, ImageAnalysisResult::fallback(FallbackReason::UnparseableOutput));
        assert_eq!(result.description, PARSE_FAILURE_DESCRIPTION);
        assert_eq!(result.city, UNKNOWN);
    }

    #[test]
    fn test_invalid_json_in_braces_gives_parse_fallback() {
        let result = normalize_image_analysis("{place_name: Sundarbans, city: ???}");
        assert_eq!(result.description, PARSE_FAILURE_DESCRIPTION);
    }

    #[test]
    fn test_two_objects_are_merged_and_fall_back() {
        let text = r#"{"place_name": "A"} and also {"place_name": "B"}"#;
        assert_eq!(
            extract_json_span(text),
            Some(r#"{"place_name": "A"} and also {"place_name": "B"}"#)
        );
        assert_eq!(normalize_image_analysis(text).description, PARSE_FAILURE_DESCRIPTION);
    }

    #[test]
    fn test_non_object_json_falls_back() {
        assert_eq!(
            normalize_image_analysis("[1, 2, 3]").description,
            PARSE_FAILURE_DESCRIPTION
        );
        assert_eq!(normalize_image_analysis("42").description, PARSE_FAILURE_DESCRIPTION);
    }

    #[test]
    fn test_whole_text_parsed_when_no_braces() {
        // No braces at all: the whole text is tried, and a JSON string is not an object.
        assert!(parse_image_analysis("\"just a string\"").is_none());
        assert_eq!(extract_json_span("no braces here"), None);
    }

    #[test]
    fn test_list_values_are_joined() {
        let text = r#"{"things_to_do": ["Boat ride", "Tea gardens"], "best_time": null}"#;
        let result = normalize_image_analysis(text);
        assert_eq!(result.things_to_do, "Boat ride, Tea gardens");
        assert_eq!(result.best_time, NOT_AVAILABLE);
    }

    #[test]
    fn test_non_string_scalars_are_stringified() {
        let text = r#"{"city": 42, "country": {"name": "Nepal"}}"#;
        let result = normalize_image_analysis(text);
        assert_eq!(result.city, "42");
        assert_eq!(result.country, r#"{"name":"Nepal"}"#);
    }

    #[test]
    fn test_extra_keys_are_dropped() {
        let mut object = full_object();
        object["confidence"] = json!(0.93);
        let value = serde_json::to_value(normalize_image_analysis(&object.to_string())).unwrap();
        assert_eq!(value.as_object().unwrap().len(), FIELDS.len());
        assert!(value.get("confidence").is_none());
    }

    #[test]
    fn test_fallback_descriptions_differ() {
        let parse = ImageAnalysisResult::fallback(FallbackReason::UnparseableOutput);
        let upstream = ImageAnalysisResult::fallback(FallbackReason::UpstreamFailure);
        assert_ne!(parse.description, upstream.description);
        assert_eq!(parse.place_name, upstream.place_name);
    }

    #[test]
    fn test_serialized_keys_match_fields() {
        let value = serde_json::to_value(ImageAnalysisResult::fallback(
            FallbackReason::UpstreamFailure,
        ))
        .unwrap();
        let object = value.as_object().unwrap();
        for key in FIELDS {
            assert!(object[key].is_string(), "{key} should be a string");
        }
    }
}
