use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{CompletionRequest, CompletionResponse, LLMProvider, Message, MessageRole, Usage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini provider using the `generateContent` REST endpoint.
///
/// Authentication goes through the `x-goog-api-key` header; system messages
/// are lifted into the top-level `systemInstruction` field as the API expects.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, temperature: Option<f32>) -> Self {
        Self::with_base_url(api_key, model, temperature, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        temperature: Option<f32>,
        base_url: String,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn create_request_body(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> serde_json::Value {
        let (system_instruction, contents) = convert_messages_to_gemini(messages);

        let mut body = json!({ "contents": contents });

        if let Some(system) = system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = temperature.or(self.temperature) {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            "Processing Gemini completion request with {} messages",
            request.messages.len()
        );

        let body =
            self.create_request_body(&request.messages, request.max_tokens, request.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!("Gemini API error {}: {}", status, error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let content = gemini_response
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.clone())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(anyhow::anyhow!("Gemini API returned no candidates"));
        }

        let usage = gemini_response
            .usage_metadata
            .map(|usage| Usage {
                prompt_tokens: usage.prompt_token_count.unwrap_or(0),
                completion_tokens: usage.candidates_token_count.unwrap_or(0),
                total_tokens: usage.total_token_count.unwrap_or(0),
            })
            .unwrap_or_default();

        debug!(
            "Gemini completion successful: {} tokens generated",
            usage.completion_tokens
        );

        Ok(CompletionResponse {
            content,
            usage,
            model: self.model.clone(),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Convert messages to Gemini format.
/// Returns (system_instruction, contents); assistant turns map to role "model".
fn convert_messages_to_gemini(messages: &[Message]) -> (Option<String>, Vec<serde_json::Value>) {
    let mut system_instruction: Option<String> = None;
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                if let Some(ref mut existing) = system_instruction {
                    existing.push_str("\n\n");
                    existing.push_str(&msg.content);
                } else {
                    system_instruction = Some(msg.content.clone());
                }
            }
            MessageRole::User => {
                contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": msg.content }],
                }));
            }
            MessageRole::Assistant => {
                contents.push(json!({
                    "role": "model",
                    "parts": [{ "text": msg.content }],
                }));
            }
        }
    }

    (system_instruction, contents)
}

// Gemini API response structures
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(
            "test-key".to_string(),
            "gemini-2.0-flash-exp".to_string(),
            Some(0.7),
        )
    }

    #[test]
    fn endpoint_includes_model() {
        assert_eq!(
            provider().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn request_body_maps_roles() {
        let messages = vec![
            Message::new(MessageRole::System, "be terse"),
            Message::new(MessageRole::User, "hello"),
            Message::new(MessageRole::Assistant, "hi"),
        ];
        let body = provider().create_request_body(&messages, Some(256), None);

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            json!("be terse")
        );
        assert_eq!(body["contents"][0]["role"], json!("user"));
        assert_eq!(body["contents"][1]["role"], json!("model"));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(256));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.7));
    }

    #[test]
    fn response_parsing_joins_parts() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "Hello world");
        assert_eq!(parsed.usage_metadata.unwrap().total_token_count, Some(5));
    }
}
