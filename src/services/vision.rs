//! Vision adapter: asks an image-capable chat model what a photo shows.

use super::completion::{ChatMessage, CompletionClient, ContentPart, ImageUrl};
use crate::core::config::OpenAiConfig;
use crate::core::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Instruction sent alongside every image.
pub const IMAGE_ANALYSIS_PROMPT: &str = "You are a travel expert. Identify the place shown in this photo. \
Respond with a single JSON object and nothing else, using exactly these keys: \
\"place_name\", \"city\", \"country\", \"description\" (two or three sentences), \
\"best_time\" (best season or months to visit), \"things_to_do\" (a short comma-separated list). \
If you cannot tell, use your best guess.";

#[derive(Clone)]
pub struct VisionClient {
    completion: CompletionClient,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, config: &OpenAiConfig) -> Self {
        Self {
            completion: CompletionClient::new(http, config)
                .with_model(config.vision_model.clone(), "vision"),
        }
    }

    pub fn model(&self) -> &str {
        self.completion.model()
    }

    /// Send `image` (of type `mime`) with the analysis prompt; returns the
    /// model's raw text.
    pub async fn describe_image(&self, image: &[u8], mime: &str) -> Result<String> {
        tracing::debug!(
            request_id = %crate::core::logging::get_request_id(),
            bytes = image.len(),
            mime,
            "Encoding image for vision model"
        );

        let message = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: IMAGE_ANALYSIS_PROMPT.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(image, mime),
                },
            },
        ]);

        self.completion.complete(vec![message]).await
    }
}

fn data_url(image: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(data_url(b"hello", "image/png"), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_prompt_names_every_field() {
        for key in crate::normalizer::image_analysis::FIELDS {
            assert!(IMAGE_ANALYSIS_PROMPT.contains(key), "prompt is missing {key}");
        }
    }

    #[test]
    fn test_uses_vision_model() {
        let config = OpenAiConfig {
            vision_model: "gpt-4o-mini".to_string(),
            ..OpenAiConfig::default()
        };
        assert_eq!(VisionClient::new(reqwest::Client::new(), &config).model(), "gpt-4o-mini");
    }
}
