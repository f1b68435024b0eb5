//! OpenAI-compatible chat completions client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use domain::services::{GenerationParams, LlmError, LlmProvider};

use super::provider::{normalize_base_url, status_error, transport_error};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for `POST {base}/chat/completions`.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: String, base_url: Option<&str>) -> Self {
        Self {
            client,
            api_key,
            base_url: normalize_base_url(base_url, DEFAULT_OPENAI_BASE_URL),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = params.system_message.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &params.prompt,
        });

        let body = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(params.timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(transport_error)?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
