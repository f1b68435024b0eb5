//! Provider selection and shared HTTP error handling for LLM clients.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;

use domain::models::{LlmSettings, ProviderKind};
use domain::services::{LlmError, LlmProvider, ProviderFactory};

use super::gemini::GeminiClient;
use super::openai::OpenAiClient;

/// Connect timeout for provider calls. The overall timeout is per call.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds real HTTP providers from the stored settings.
#[derive(Clone)]
pub struct HttpProviderFactory {
    client: Client,
}

impl HttpProviderFactory {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("docgen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let kind = settings
            .provider_kind()
            .ok_or_else(|| LlmError::UnsupportedProvider(settings.provider.clone()))?;
        let api_key = settings
            .api_key
            .clone()
            .ok_or(LlmError::MissingCredentials)?;
        let base_url = settings.base_url.as_deref();

        Ok(match kind {
            ProviderKind::Google => {
                Arc::new(GeminiClient::new(self.client.clone(), api_key, base_url))
            }
            ProviderKind::OpenAi => {
                Arc::new(OpenAiClient::new(self.client.clone(), api_key, base_url))
            }
        })
    }
}

/// Strips trailing slashes so paths can be appended.
pub(crate) fn normalize_base_url(base_url: Option<&str>, default: &str) -> String {
    base_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// Maps a transport failure from reqwest.
pub(crate) fn transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(err.to_string())
    } else if err.is_connect() {
        LlmError::Unavailable(err.to_string())
    } else if err.is_decode() {
        LlmError::InvalidResponse(err.to_string())
    } else {
        LlmError::Api {
            status: err.status().map(|s| s.as_u16()).unwrap_or(502),
            message: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Converts a non-success response into an [`LlmError`], keeping the
/// provider's own message when the body is the usual `{"error": {...}}` shape.
pub(crate) async fn status_error(response: Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::from_status(status, message)
}
