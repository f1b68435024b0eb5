//! Configuration setting domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use super::settings_catalog;

/// Sentinel shown in place of a stored secret.
pub const MASKED_VALUE: &str = "********";

/// Represents a configuration key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSetting {
    pub id: i32,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub is_secret: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConfigSetting {
    /// Value safe to hand to a client. Non-empty secrets are masked.
    pub fn display_value(&self) -> String {
        mask_if_secret(&self.value, self.is_secret)
    }
}

/// Masks a value when it is a non-empty secret.
pub fn mask_if_secret(value: &str, is_secret: bool) -> String {
    if is_secret && !value.is_empty() {
        MASKED_VALUE.to_string()
    } else {
        value.to_string()
    }
}

/// Returns true when a submitted value is the mask sentinel echoed back.
pub fn is_masked(value: &str) -> bool {
    value == MASKED_VALUE
}

/// Request payload for creating a setting.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSettingRequest {
    #[validate(custom(function = "shared::validation::validate_config_key"))]
    pub config_key: String,

    #[validate(length(max = 255, message = "Config value must be at most 255 characters"))]
    pub config_value: String,

    pub description: Option<String>,

    /// Explicitly mark the new key as secret. Catalogue secrets are always secret.
    #[serde(default)]
    pub is_secret: bool,
}

impl CreateSettingRequest {
    /// Whether the stored row should be treated as a secret.
    pub fn effective_secret(&self) -> bool {
        self.is_secret || settings_catalog::is_secret_key(&self.config_key)
    }
}

/// Request payload for updating a setting (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSettingRequest {
    #[validate(custom(function = "shared::validation::validate_config_key"))]
    pub config_key: Option<String>,

    #[validate(length(max = 255, message = "Config value must be at most 255 characters"))]
    pub config_value: Option<String>,

    pub description: Option<String>,
}

impl UpdateSettingRequest {
    /// Key the row carries after this update.
    pub fn target_key<'a>(&'a self, current_key: &'a str) -> &'a str {
        self.config_key.as_deref().unwrap_or(current_key)
    }

    /// Whether the row is secret after this update. A row renamed to a
    /// catalogue secret key becomes secret.
    pub fn target_is_secret(&self, current_key: &str, currently_secret: bool) -> bool {
        currently_secret
            || settings_catalog::is_secret_key(current_key)
            || settings_catalog::is_secret_key(self.target_key(current_key))
    }

    /// Value to write, dropping the mask sentinel when the target is secret.
    pub fn value_to_store(&self, target_is_secret: bool) -> Option<&str> {
        match self.config_value.as_deref() {
            Some(v) if target_is_secret && is_masked(v) => None,
            other => other,
        }
    }
}

/// Response payload for a single setting. Secrets are always masked.
#[derive(Debug, Clone, Serialize)]
pub struct SettingResponse {
    pub id: i32,
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub is_secret: bool,
}

impl From<ConfigSetting> for SettingResponse {
    fn from(s: ConfigSetting) -> Self {
        Self {
            config_value: s.display_value(),
            id: s.id,
            config_key: s.key,
            description: s.description,
            is_secret: s.is_secret,
        }
    }
}

/// One row of the LLM settings page.
#[derive(Debug, Clone, Serialize)]
pub struct LlmSettingItem {
    pub config_key: String,
    pub config_value: Option<String>,
    pub description: String,
}

/// Request payload for bulk-updating LLM settings.
///
/// Values may be strings, numbers, booleans or arrays of scalars; they are
/// stored as text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct UpdateLlmSettingsRequest {
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Response for a bulk LLM settings update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateLlmSettingsResponse {
    pub message: String,
    pub updated: usize,
}

impl UpdateLlmSettingsResponse {
    pub fn new(updated: usize) -> Self {
        Self {
            message: format!("Updated {} LLM settings.", updated),
            updated,
        }
    }
}

/// Converts a JSON value into the text form stored in the settings table.
///
/// Arrays are joined with commas. Returns `None` for `null`, which callers
/// treat as "leave unchanged".
pub fn stringify_setting_value(value: &serde_json::Value) -> Result<Option<String>, String> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Bool(b) => Ok(b.to_string()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err("List settings may only contain scalar values".to_string()),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(parts.join(",")))
        }
        Value::Object(_) => Err("Setting values cannot be objects".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setting(key: &str, value: &str, is_secret: bool) -> ConfigSetting {
        ConfigSetting {
            id: 1,
            key: key.to_string(),
            value: value.to_string(),
            description: None,
            is_secret,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_secret_is_masked_in_response() {
        let response: SettingResponse = setting("google_api_key", "AIza-real-key", true).into();
        assert_eq!(response.config_value, MASKED_VALUE);
        assert!(response.is_secret);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("AIza-real-key"));
    }

    #[test]
    fn test_empty_secret_is_not_masked() {
        let response: SettingResponse = setting("google_api_key", "", true).into();
        assert_eq!(response.config_value, "");
    }

    #[test]
    fn test_plain_value_passes_through() {
        let response: SettingResponse = setting("llm_model", "gemini-1.5-pro-latest", false).into();
        assert_eq!(response.config_value, "gemini-1.5-pro-latest");
    }

    #[test]
    fn test_masked_value_is_not_stored_for_secret() {
        let request = UpdateSettingRequest {
            config_value: Some(MASKED_VALUE.to_string()),
            ..Default::default()
        };
        assert_eq!(request.value_to_store(true), None);
        assert_eq!(request.value_to_store(false), Some(MASKED_VALUE));
    }

    #[test]
    fn test_real_value_is_stored_for_secret() {
        let request = UpdateSettingRequest {
            config_value: Some("new-key".to_string()),
            ..Default::default()
        };
        assert_eq!(request.value_to_store(true), Some("new-key"));
    }

    #[test]
    fn test_rename_to_catalogue_secret_becomes_secret() {
        let rename = UpdateSettingRequest {
            config_key: Some("google_api_key".to_string()),
            config_value: Some(MASKED_VALUE.to_string()),
            ..Default::default()
        };
        assert_eq!(rename.target_key("legacy_key"), "google_api_key");
        assert!(rename.target_is_secret("legacy_key", false));
        assert_eq!(rename.value_to_store(rename.target_is_secret("legacy_key", false)), None);

        let plain = UpdateSettingRequest {
            config_value: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!plain.target_is_secret("company_name", false));
        assert!(plain.target_is_secret("openai_api_key", false));
        assert!(plain.target_is_secret("company_name", true));
    }

    #[test]
    fn test_create_request_secret_from_catalogue() {
        let request: CreateSettingRequest = serde_json::from_str(
            r#"{"config_key": "openai_api_key", "config_value": "sk-test"}"#,
        )
        .unwrap();
        assert!(!request.is_secret);
        assert!(request.effective_secret());

        let request: CreateSettingRequest = serde_json::from_str(
            r#"{"config_key": "company_name", "config_value": "Acme"}"#,
        )
        .unwrap();
        assert!(!request.effective_secret());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateSettingRequest {
            config_key: "Bad Key".to_string(),
            config_value: "x".to_string(),
            description: None,
            is_secret: false,
        };
        assert!(request.validate().is_err());

        let request = CreateSettingRequest {
            config_key: "good_key".to_string(),
            config_value: "x".repeat(256),
            description: None,
            is_secret: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_stringify_setting_value() {
        assert_eq!(
            stringify_setting_value(&json!("gemini")).unwrap(),
            Some("gemini".to_string())
        );
        assert_eq!(
            stringify_setting_value(&json!(true)).unwrap(),
            Some("true".to_string())
        );
        assert_eq!(
            stringify_setting_value(&json!(0.5)).unwrap(),
            Some("0.5".to_string())
        );
        assert_eq!(
            stringify_setting_value(&json!(2048)).unwrap(),
            Some("2048".to_string())
        );
        assert_eq!(
            stringify_setting_value(&json!(["https://a.example", "https://b.example"])).unwrap(),
            Some("https://a.example,https://b.example".to_string())
        );
        assert_eq!(stringify_setting_value(&json!(null)).unwrap(), None);
        assert!(stringify_setting_value(&json!({"a": 1})).is_err());
        assert!(stringify_setting_value(&json!([{"a": 1}])).is_err());
    }

    #[test]
    fn test_update_llm_settings_request_deserialization() {
        let request: UpdateLlmSettingsRequest =
            serde_json::from_str(r#"{"llm_temperature": 0.2, "enable_history": false}"#).unwrap();
        assert_eq!(request.values.len(), 2);
        assert_eq!(request.values["llm_temperature"], json!(0.2));
    }

    #[test]
    fn test_update_llm_settings_response_message() {
        let response = UpdateLlmSettingsResponse::new(3);
        assert_eq!(response.message, "Updated 3 LLM settings.");
    }
}
