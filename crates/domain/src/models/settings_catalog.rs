//! Catalogue of built-in configuration settings.
//!
//! Every key listed here is seeded at startup. The catalogue is also the
//! source of truth for which keys hold secrets and for the descriptions shown
//! on the LLM settings page.

use serde::Deserialize;

/// Well-known configuration keys.
pub mod keys {
    pub const LLM_PROVIDER: &str = "llm_provider";
    pub const GOOGLE_API_KEY: &str = "google_api_key";
    pub const OPENAI_API_KEY: &str = "openai_api_key";
    pub const LLM_MODEL: &str = "llm_model";
    pub const LLM_API_BASE_URL: &str = "llm_api_base_url";
    pub const LLM_TEMPERATURE: &str = "llm_temperature";
    pub const LLM_MAX_TOKENS: &str = "llm_max_tokens";
    pub const LLM_SYSTEM_MESSAGE: &str = "llm_system_message";
    pub const LLM_MODEL_TEST: &str = "llm_model_test";
    pub const DEFAULT_DOC_FORMAT: &str = "default_doc_format";
    pub const ENABLE_HISTORY: &str = "enable_history";
    pub const HISTORY_RETENTION_DAYS: &str = "history_retention_days";
    pub const RESPONSE_TIMEOUT_SECONDS: &str = "response_timeout_seconds";
    pub const CORS_ALLOWED_ORIGINS: &str = "cors_allowed_origins";
    pub const RETRY_ON_FAILURE_COUNT: &str = "retry_on_failure_count";
}

/// A built-in setting with its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSetting {
    pub key: &'static str,
    pub value: &'static str,
    pub description: &'static str,
    pub secret: bool,
}

/// Built-in settings, seeded on startup.
pub const DEFAULT_SETTINGS: &[DefaultSetting] = &[
    DefaultSetting {
        key: keys::LLM_PROVIDER,
        value: "google",
        description: "Which LLM provider to call (google or openai)",
        secret: false,
    },
    DefaultSetting {
        key: keys::GOOGLE_API_KEY,
        value: "",
        description: "Your Google AI API Key (required for Gemini models)",
        secret: true,
    },
    DefaultSetting {
        key: keys::OPENAI_API_KEY,
        value: "",
        description: "Your OpenAI API Key (required for OpenAI models)",
        secret: true,
    },
    DefaultSetting {
        key: keys::LLM_MODEL,
        value: "gemini-1.5-flash-latest",
        description: "Which LLM model to call (e.g., gemini-1.5-flash-latest, gemini-1.5-pro-latest)",
        secret: false,
    },
    DefaultSetting {
        key: keys::LLM_API_BASE_URL,
        value: "",
        description: "Base URL for your LLM provider (usually not needed)",
        secret: false,
    },
    DefaultSetting {
        key: keys::LLM_TEMPERATURE,
        value: "0.7",
        description: "Controls creativity of the responses (0.0 to 1.0)",
        secret: false,
    },
    DefaultSetting {
        key: keys::LLM_MAX_TOKENS,
        value: "1024",
        description: "Limits response length (max output tokens)",
        secret: false,
    },
    DefaultSetting {
        key: keys::LLM_SYSTEM_MESSAGE,
        value: "You are a helpful assistant.",
        description: "Default system message for LLM calls (support varies by model).",
        secret: false,
    },
    DefaultSetting {
        key: keys::LLM_MODEL_TEST,
        value: "gemini-1.5-flash-latest",
        description: "Specific LLM model to use for the connection and template test endpoints.",
        secret: false,
    },
    DefaultSetting {
        key: keys::DEFAULT_DOC_FORMAT,
        value: "pdf",
        description: "pdf or docx - format recorded when a request does not name one",
        secret: false,
    },
    DefaultSetting {
        key: keys::ENABLE_HISTORY,
        value: "true",
        description: "Toggle whether generated documents are kept in history",
        secret: false,
    },
    DefaultSetting {
        key: keys::HISTORY_RETENTION_DAYS,
        value: "30",
        description: "How long to keep document history around (0 keeps forever)",
        secret: false,
    },
    DefaultSetting {
        key: keys::RESPONSE_TIMEOUT_SECONDS,
        value: "60",
        description: "How long the backend will wait for the LLM to respond",
        secret: false,
    },
    DefaultSetting {
        key: keys::CORS_ALLOWED_ORIGINS,
        value: "*",
        description: "Comma-separated list of allowed front-ends/hosts",
        secret: false,
    },
    DefaultSetting {
        key: keys::RETRY_ON_FAILURE_COUNT,
        value: "2",
        description: "How many times to auto-retry an LLM call if it times out or the provider is unavailable",
        secret: false,
    },
];

/// Keys shown and editable on the LLM settings page, in display order.
pub const LLM_SETTING_KEYS: &[&str] = &[
    keys::LLM_PROVIDER,
    keys::GOOGLE_API_KEY,
    keys::OPENAI_API_KEY,
    keys::LLM_MODEL,
    keys::LLM_API_BASE_URL,
    keys::LLM_TEMPERATURE,
    keys::LLM_MAX_TOKENS,
    keys::LLM_SYSTEM_MESSAGE,
    keys::LLM_MODEL_TEST,
    keys::DEFAULT_DOC_FORMAT,
    keys::ENABLE_HISTORY,
    keys::HISTORY_RETENTION_DAYS,
    keys::RESPONSE_TIMEOUT_SECONDS,
    keys::CORS_ALLOWED_ORIGINS,
    keys::RETRY_ON_FAILURE_COUNT,
];

/// Fallback description for keys outside the catalogue.
pub const NO_DESCRIPTION: &str = "No description available";

/// Looks up the built-in default for a key.
pub fn find_default(key: &str) -> Option<&'static DefaultSetting> {
    DEFAULT_SETTINGS.iter().find(|d| d.key == key)
}

/// Returns true when the catalogue marks the key as a secret.
pub fn is_secret_key(key: &str) -> bool {
    find_default(key).map(|d| d.secret).unwrap_or(false)
}

/// Returns the catalogue description for a key.
pub fn description_for(key: &str) -> &'static str {
    find_default(key)
        .map(|d| d.description)
        .unwrap_or(NO_DESCRIPTION)
}

/// Rejects values a built-in setting could never use. Keys outside the
/// catalogue's typed settings accept any text.
pub fn validate_setting_value(key: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    match key {
        keys::LLM_TEMPERATURE | keys::RESPONSE_TIMEOUT_SECONDS => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
            _ => Err(format!("{} must be a finite, non-negative number", key)),
        },
        keys::LLM_MAX_TOKENS | keys::RETRY_ON_FAILURE_COUNT | keys::HISTORY_RETENTION_DAYS => {
            match trimmed.parse::<i32>() {
                Ok(n) if n >= 0 => Ok(()),
                _ => Err(format!(
                    "{} must be a whole number between 0 and {}",
                    key,
                    i32::MAX
                )),
            }
        }
        keys::DEFAULT_DOC_FORMAT => shared::validation::validate_document_format(trimmed)
            .map_err(|_| format!("{} must be 1-16 alphanumeric characters", key)),
        _ => Ok(()),
    }
}

/// How seeding treats keys that already exist in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationPolicy {
    /// Insert missing keys only; stored values win.
    #[default]
    Preserve,
    /// Insert missing keys and reset existing ones to their defaults.
    Overwrite,
}

impl ReconciliationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationPolicy::Preserve => "preserve",
            ReconciliationPolicy::Overwrite => "overwrite",
        }
    }
}
