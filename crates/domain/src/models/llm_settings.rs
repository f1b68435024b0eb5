//! Typed view over the LLM-related configuration settings.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::settings_catalog::{find_default, keys};

/// Longest per-call provider timeout, in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Most extra attempts allowed after a transient provider failure.
pub const MAX_RETRY_COUNT: u32 = 5;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Parses a provider name as stored in the settings table.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Some(ProviderKind::Google),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }

    /// Setting key that holds this provider's API key.
    pub fn api_key_setting(&self) -> &'static str {
        match self {
            ProviderKind::Google => keys::GOOGLE_API_KEY,
            ProviderKind::OpenAi => keys::OPENAI_API_KEY,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved LLM settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    /// Raw provider name; see [`LlmSettings::provider_kind`].
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub test_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_message: Option<String>,
    pub timeout: Duration,
    pub retry_count: u32,
    pub enable_history: bool,
    pub default_doc_format: String,
}

impl LlmSettings {
    /// Builds settings from a key lookup, falling back to catalogue defaults
    /// for absent or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_else(|| default_value(key).to_string());

        let provider = get(keys::LLM_PROVIDER);
        let api_key = ProviderKind::parse(&provider)
            .and_then(|kind| lookup(kind.api_key_setting()))
            .and_then(non_empty);

        Self {
            api_key,
            base_url: lookup(keys::LLM_API_BASE_URL).and_then(non_empty),
            model: get(keys::LLM_MODEL),
            test_model: get(keys::LLM_MODEL_TEST),
            temperature: parse_or_default(keys::LLM_TEMPERATURE, &get(keys::LLM_TEMPERATURE)),
            max_tokens: parse_or_default(keys::LLM_MAX_TOKENS, &get(keys::LLM_MAX_TOKENS)),
            system_message: non_empty(get(keys::LLM_SYSTEM_MESSAGE)),
            timeout: parse_timeout(&get(keys::RESPONSE_TIMEOUT_SECONDS)),
            retry_count: parse_or_default::<u32>(
                keys::RETRY_ON_FAILURE_COUNT,
                &get(keys::RETRY_ON_FAILURE_COUNT),
            )
            .min(MAX_RETRY_COUNT),
            enable_history: parse_bool(&get(keys::ENABLE_HISTORY)),
            default_doc_format: get(keys::DEFAULT_DOC_FORMAT),
            provider,
        }
    }

    /// The configured provider, if the name is recognised.
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        ProviderKind::parse(&self.provider)
    }
}

/// Interprets a stored boolean. Only `true` (any case) is truthy.
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Splits a comma-separated list, dropping empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_value(key: &str) -> &'static str {
    find_default(key).map(|d| d.value).unwrap_or("")
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Timeout clamped to `1..=MAX_TIMEOUT_SECS`. Non-finite values use the default.
fn parse_timeout(raw: &str) -> Duration {
    let key = keys::RESPONSE_TIMEOUT_SECONDS;
    let mut secs = parse_or_default::<f64>(key, raw);
    if !secs.is_finite() {
        tracing::warn!(key = %key, value = %raw, "Non-finite setting value, using default");
        secs = default_value(key).parse().unwrap_or(60.0);
    }
    Duration::try_from_secs_f64(secs.clamp(1.0, MAX_TIMEOUT_SECS))
        .unwrap_or(Duration::from_secs(60))
}

fn parse_or_default<T>(key: &str, raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "Unparsable setting value, using default");
            default_value(key).parse::<T>().unwrap_or_default()
        }
    }
}
