//! Google Gemini client (Generative Language REST API).

use reqwest::Client;
use serde::{Deserialize, Serialize};

use domain::services::{GenerationParams, LlmError, LlmProvider};

use super::provider::{normalize_base_url, status_error, transport_error};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for `models/{model}:generateContent`.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, or empty when there is none.
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, base_url: Option<&str>) -> Self {
        Self {
            client,
            api_key,
            base_url: normalize_base_url(base_url, DEFAULT_GEMINI_BASE_URL),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            model.trim_start_matches("models/")
        )
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &params.prompt,
                }],
            }],
            system_instruction: params.system_message.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint(&params.model))
            .query(&[("key", self.api_key.as_str())])
            .timeout(params.timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(transport_error)?;
        Ok(parsed.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::test_server;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    fn params() -> GenerationParams {
        GenerationParams {
            model: "gemini-1.5-flash-latest".to_string(),
            prompt: "Write a quotation".to_string(),
            temperature: 0.4,
            max_tokens: 256,
            system_message: Some("You are a helpful assistant.".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(Client::new(), "k".to_string(), None);
        assert_eq!(
            client.endpoint("models/gemini-1.5-pro-latest"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro-latest:generateContent"
        );
    }

    #[test]
    fn test_first_text() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello"}, {"text": "ignored"}]}}]
        }))
        .unwrap();
        assert_eq!(parsed.first_text(), "Hello");

        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(parsed.first_text(), "");
    }

    #[tokio::test]
    async fn test_generate_sends_config_and_reads_text() {
        let (base, seen) = test_server::spawn(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "Quotation body"}]}}]}),
        )
        .await;
        let client = GeminiClient::new(Client::new(), "AIza-test".to_string(), Some(&base));

        let text = client.generate(&params()).await.unwrap();
        assert_eq!(text, "Quotation body");

        let requests = seen.lock().unwrap();
        assert_eq!(requests[0]["contents"][0]["parts"][0]["text"], "Write a quotation");
        assert_eq!(requests[0]["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(
            requests[0]["systemInstruction"]["parts"][0]["text"],
            "You are a helpful assistant."
        );
    }

    #[tokio::test]
    async fn test_generate_maps_status_codes() {
        let cases = [
            (StatusCode::FORBIDDEN, "auth"),
            (StatusCode::TOO_MANY_REQUESTS, "rate"),
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            (StatusCode::BAD_REQUEST, "api"),
        ];

        for (status, kind) in cases {
            let (base, _) = test_server::spawn(
                status,
                json!({"error": {"code": status.as_u16(), "message": "provider says no"}}),
            )
            .await;
            let client = GeminiClient::new(Client::new(), "k".to_string(), Some(&base));
            let err = client.generate(&params()).await.unwrap_err();

            let matched = match kind {
                "auth" => matches!(err, LlmError::Auth(ref m) if m == "provider says no"),
                "rate" => matches!(err, LlmError::RateLimited(_)),
                "unavailable" => matches!(err, LlmError::Unavailable(_)),
                _ => matches!(err, LlmError::Api { status: 400, .. }),
            };
            assert!(matched, "unexpected error for {}: {:?}", status, err);
        }
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(
            Client::new(),
            "k".to_string(),
            Some(&format!("http://{}", addr)),
        );
        let err = client.generate(&params()).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }
}
