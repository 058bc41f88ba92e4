pub mod gemini;
pub mod openai;
mod registry;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// A single one-shot completion request. No streaming, no tool calling:
/// every call site in this workspace sends one prompt and reads one reply.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Build a request from a single user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Usage,
    pub model: String,
}

/// Uniform contract over the chat backends (Gemini REST, OpenAI-compatible).
///
/// Request shape and auth vary per provider; from the orchestrator's point of
/// view there is exactly one operation: send a prompt, get text back.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

impl std::fmt::Debug for dyn LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMProvider")
            .field("name", &self.name())
            .field("model", &self.model())
            .finish()
    }
}

/// Mask an API key for console output and logs: first 10 chars followed by
/// an ellipsis. Keys are never printed in full anywhere in the workspace.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(10).collect();
    format!("{}...", prefix)
}
