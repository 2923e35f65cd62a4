//! Chat-completion adapter (OpenAI-compatible `/chat/completions`).

use super::{observe, transport_error};
use crate::core::config::OpenAiConfig;
use crate::core::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SERVICE_NAME: &str = "OpenAI";

/// Outbound chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Role: "system" or "user"
    pub role: &'static str,
    pub content: MessageContent,
}

/// Plain text, or a list of typed parts for multimodal input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for one chat model on an OpenAI-compatible API.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    metric_label: &'static str,
}

impl CompletionClient {
    /// Create a client for the configured chat model.
    pub fn new(http: reqwest::Client, config: &OpenAiConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.chat_model.clone(),
            temperature: config.temperature,
            metric_label: "completion",
        }
    }

    /// Use a different model, reporting metrics under `metric_label`.
    pub fn with_model(mut self, model: impl Into<String>, metric_label: &'static str) -> Self {
        self.model = model.into();
        self.metric_label = metric_label;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` and return the first choice's text.
    ///
    /// No retry: any transport error, non-2xx status, or empty answer is
    /// returned as an error.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        };
        observe(self.metric_label, self.send(payload)).await
    }

    async fn send(&self, payload: ChatCompletionRequest) -> Result<String> {
        let endpoint = "/chat/completions";
        let url = format!("{}{}", self.api_base, endpoint);

        tracing::debug!(
            request_id = %crate::core::logging::get_request_id(),
            model = %payload.model,
            messages = payload.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(self.metric_label, endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(AppError::upstream(SERVICE_NAME, upstream_message(status.as_u16(), &body)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| transport_error(self.metric_label, endpoint, e))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::upstream(SERVICE_NAME, "completion returned no message content"))
    }
}

/// Best message for a failed completion: the upstream's own, if any.
fn upstream_message(status: u16, body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_serialization() {
        let value = serde_json::to_value(ChatMessage::system("Be brief.")).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "Be brief."}));
    }

    #[test]
    fn test_multimodal_message_serialization() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "What is this?".to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".to_string(),
                },
            },
        ]);

        assert_eq!(
            serde_json::to_value(message).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "What is this?"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]
            })
        );
    }

    #[test]
    fn test_upstream_message_prefers_error_message() {
        let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}});
        assert_eq!(upstream_message(401, &body), "Incorrect API key provided");
        assert_eq!(upstream_message(502, &Value::Null), "HTTP 502");
    }

    #[test]
    fn test_with_model_overrides_chat_model() {
        let client = CompletionClient::new(reqwest::Client::new(), &OpenAiConfig::default())
            .with_model("gpt-4o", "vision");
        assert_eq!(client.model(), "gpt-4o");
    }
}
