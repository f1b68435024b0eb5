//! LLM provider abstraction.
//!
//! Providers are selected at runtime from the `llm_provider` setting through a
//! [`ProviderFactory`]. Concrete HTTP clients live in the API crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::models::llm_settings::LlmSettings;

/// Instruction appended to every generation prompt.
pub const GENERATION_PROMPT_SUFFIX: &str = " Ensure the document is formatted and relevant for the Kenyan market, including using KES for currency where applicable. Provide the output in plain text or Markdown format suitable for a document.";

/// Instruction appended to template test prompts.
pub const TEST_PROMPT_SUFFIX: &str = " Ensure the document is formatted and relevant for the Kenyan market, including using KES for currency where applicable.";

/// Placeholder returned when a generation yields no text.
pub const NO_CONTENT: &str = "No content received from LLM.";

/// Placeholder returned when the connection check yields no text.
pub const NO_CONTENT_IN_RESPONSE: &str = "No content received in response.";

/// Prompt sent by the connection check.
pub const CONNECTION_TEST_PROMPT: &str = "Hello, world!";

/// Base delay between retries; multiplied by the attempt number.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Parameters for a single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_message: Option<String>,
    pub timeout: Duration,
}

impl GenerationParams {
    /// Builds call parameters from resolved settings.
    pub fn from_settings(settings: &LlmSettings, model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_message: settings.system_message.clone(),
            timeout: settings.timeout,
        }
    }
}

/// Errors raised by LLM providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("API key is not configured")]
    MissingCredentials,

    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("LLM authentication failed: {0}")]
    Auth(String),

    #[error("LLM rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("LLM request timed out: {0}")]
    Timeout(String),

    #[error("LLM service unavailable: {0}")]
    Unavailable(String),

    #[error("LLM API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Classifies a non-success HTTP status from a provider.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimited(message),
            408 | 504 => LlmError::Timeout(message),
            502 | 503 => LlmError::Unavailable(message),
            _ => LlmError::Api { status, message },
        }
    }

    /// Returns true for failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Timeout(_) | LlmError::Unavailable(_))
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            LlmError::MissingCredentials | LlmError::Auth(_) => "auth_error",
            LlmError::UnsupportedProvider(_) => "unsupported_provider",
            LlmError::RateLimited(_) => "rate_limited",
            LlmError::Timeout(_) => "timeout",
            LlmError::Unavailable(_) => "unavailable",
            LlmError::Api { .. } => "api_error",
            LlmError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// A text-completion backend.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Sends the prompt and returns the first text part of the reply.
    ///
    /// An empty string means the provider answered without content.
    async fn generate(&self, params: &GenerationParams) -> Result<String, LlmError>;
}

/// Builds a provider for the current settings.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError>;
}

/// Bounded retry for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first call.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Linear backoff: the n-th retry waits `n * base_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

/// Calls the provider, retrying timeouts and unavailability per the policy.
pub async fn generate_with_retry(
    provider: &dyn LlmProvider,
    params: &GenerationParams,
    policy: RetryPolicy,
) -> Result<String, LlmError> {
    let mut retry = 0;
    loop {
        match provider.generate(params).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    provider = %provider.name(),
                    model = %params.model,
                    retry = retry,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient LLM failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Substitutes a placeholder for empty provider output.
pub fn content_or(text: String, placeholder: &str) -> String {
    if text.trim().is_empty() {
        placeholder.to_string()
    } else {
        text
    }
}

/// Scripted provider for development and testing.
///
/// Replies are consumed in order; once the script is exhausted the fallback
/// reply is returned. Every call is recorded.
#[derive(Debug)]
pub struct ScriptedLlmProvider {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Result<String, LlmError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationParams>>,
}

impl ScriptedLlmProvider {
    /// Create a provider that always replies with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_fallback(Ok(reply.into()))
    }

    /// Create a provider that always fails with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<String, LlmError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-off result ahead of the fallback.
    pub fn then(self, result: Result<String, LlmError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
        self
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parameters of every call made so far.
    pub fn requests(&self) -> Vec<GenerationParams> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(params.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        tracing::info!(model = %params.model, "Mock: Would call LLM provider");
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Factory that hands out a shared [`ScriptedLlmProvider`].
#[derive(Debug, Clone)]
pub struct ScriptedProviderFactory {
    provider: Arc<ScriptedLlmProvider>,
}

impl ScriptedProviderFactory {
    pub fn new(provider: ScriptedLlmProvider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The provider handed out by this factory, for inspecting calls.
    pub fn provider(&self) -> Arc<ScriptedLlmProvider> {
        self.provider.clone()
    }
}

impl ProviderFactory for ScriptedProviderFactory {
    fn build(&self, settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, LlmError> {
        if settings.provider_kind().is_none() {
            return Err(LlmError::UnsupportedProvider(settings.provider.clone()));
        }
        Ok(self.provider.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            model: "gemini-1.5-flash-latest".to_string(),
            prompt: "Write a quote".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            system_message: None,
            timeout: Duration::from_secs(60),
        }
    }

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_base_delay(Duration::ZERO)
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(LlmError::from_status(401, "x"), LlmError::Auth(_)));
        assert!(matches!(LlmError::from_status(403, "x"), LlmError::Auth(_)));
        assert!(matches!(LlmError::from_status(429, "x"), LlmError::RateLimited(_)));
        assert!(matches!(LlmError::from_status(408, "x"), LlmError::Timeout(_)));
        assert!(matches!(LlmError::from_status(504, "x"), LlmError::Timeout(_)));
        assert!(matches!(LlmError::from_status(502, "x"), LlmError::Unavailable(_)));
        assert!(matches!(LlmError::from_status(503, "x"), LlmError::Unavailable(_)));
        assert_eq!(
            LlmError::from_status(400, "bad"),
            LlmError::Api {
                status: 400,
                message: "bad".to_string()
            }
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(LlmError::Timeout(String::new()).is_transient());
        assert!(LlmError::Unavailable(String::new()).is_transient());
        assert!(!LlmError::RateLimited(String::new()).is_transient());
        assert!(!LlmError::Auth(String::new()).is_transient());
        assert!(!LlmError::MissingCredentials.is_transient());
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1500));
    }

    #[test]
    fn test_params_from_settings() {
        let settings = LlmSettings::from_lookup(|_| None);
        let params = GenerationParams::from_settings(&settings, "gpt-4o-mini", "Hi".to_string());
        assert_eq!(params.model, "gpt-4o-mini");
        assert_eq!(params.prompt, "Hi");
        assert_eq!(params.max_tokens, 1024);
        assert_eq!(params.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_content_or() {
        assert_eq!(content_or("text".to_string(), NO_CONTENT), "text");
        assert_eq!(content_or("  ".to_string(), NO_CONTENT), NO_CONTENT);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let provider = ScriptedLlmProvider::replying("done")
            .then(Err(LlmError::Timeout("slow".to_string())))
            .then(Err(LlmError::Unavailable("down".to_string())));

        let result = generate_with_retry(&provider, &params(), instant(2)).await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let provider = ScriptedLlmProvider::failing(LlmError::Timeout("slow".to_string()));

        let result = generate_with_retry(&provider, &params(), instant(2)).await;
        assert!(matches!(result, Err(LlmError::Timeout(_))));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_calls_once() {
        let provider = ScriptedLlmProvider::failing(LlmError::Unavailable("down".to_string()));

        let result = generate_with_retry(&provider, &params(), instant(0)).await;
        assert!(result.is_err());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_transient_errors_fail_fast() {
        let provider = ScriptedLlmProvider::failing(LlmError::Auth("bad key".to_string()));

        let result = generate_with_retry(&provider, &params(), instant(5)).await;
        assert!(matches!(result, Err(LlmError::Auth(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_provider_records_requests() {
        let provider = ScriptedLlmProvider::replying("ok");
        provider.generate(&params()).await.unwrap();
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "Write a quote");
    }

    #[test]
    fn test_scripted_factory_rejects_unknown_provider() {
        let factory = ScriptedProviderFactory::new(ScriptedLlmProvider::replying("ok"));
        let settings = LlmSettings::from_lookup(|key| {
            (key == "llm_provider").then(|| "mystery".to_string())
        });
        assert!(matches!(
            factory.build(&settings),
            Err(LlmError::UnsupportedProvider(_))
        ));
    }
}
