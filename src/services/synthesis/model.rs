/// Generative text service client
///
/// Talks to any OpenAI-compatible `/chat/completions` endpoint and asks for a JSON object reply.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

const TEMPERATURE: f32 = 0.7;

/// A model that answers an instruction with a single JSON object
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_json(&self, instruction: &str) -> AppResult<Value>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Parses the first choice's content as a JSON object
    fn into_json(self) -> AppResult<Value> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Synthesis("Model returned no content".to_string()))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Synthesis(format!("Model returned malformed JSON: {}", e)))
    }
}

pub struct ChatCompletionsModel {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsModel {
    pub fn new(http_client: HttpClient, api_url: &str, api_key: String, model: String) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait::async_trait]
impl GenerativeModel for ChatCompletionsModel {
    async fn generate_json(&self, instruction: &str) -> AppResult<Value> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: instruction,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Completion request failed");
            return Err(AppError::Synthesis(format!(
                "Model API returned status {}",
                status
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Synthesis(format!("Unreadable model response: {}", e)))?;
        let output = completion.into_json()?;

        tracing::debug!(model = %self.model, output = %output, "Completion received");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "rainy day",
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_content_parsed() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"query\": \"lo-fi beats\"}" } }
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        let output = response.into_json().unwrap();
        assert_eq!(output["query"], "lo-fi beats");
    }

    #[test]
    fn test_response_without_choices_fails() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(response.into_json(), Err(AppError::Synthesis(_))));
    }

    #[test]
    fn test_response_with_prose_fails() {
        let json = r#"{"choices": [{"message": {"content": "Sure! Try lo-fi beats."}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_json(), Err(AppError::Synthesis(_))));
    }
}
