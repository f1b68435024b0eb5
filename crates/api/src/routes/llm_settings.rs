//! LLM settings page endpoint handlers.

use std::collections::HashMap;

use axum::{extract::State, Json};
use tracing::info;

use domain::models::config_setting::{
    is_masked, mask_if_secret, stringify_setting_value, LlmSettingItem,
    UpdateLlmSettingsRequest, UpdateLlmSettingsResponse,
};
use domain::models::generation::TestConnectionResponse;
use domain::models::settings_catalog::{
    description_for, is_secret_key, validate_setting_value, LLM_SETTING_KEYS,
};
use persistence::entities::ConfigSettingEntity;
use persistence::repositories::ConfigSettingRepository;
use shared::validation::MAX_CONFIG_VALUE_LENGTH;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::GenerationService;

/// List the LLM settings in display order.
///
/// GET /api/settings/llm
pub async fn get_llm_settings(
    State(state): State<AppState>,
) -> Result<Json<Vec<LlmSettingItem>>, ApiError> {
    let repo = ConfigSettingRepository::new(state.pool.clone());
    let stored = repo.find_by_keys(LLM_SETTING_KEYS).await?;
    Ok(Json(llm_setting_items(stored)))
}

/// Bulk-update LLM settings in one transaction.
///
/// PUT /api/settings/llm
///
/// Keys outside the LLM set, keys not present in the store, `null` values and
/// echoed masks for secrets are skipped.
pub async fn update_llm_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateLlmSettingsRequest>,
) -> Result<Json<UpdateLlmSettingsResponse>, ApiError> {
    let updates = collect_updates(&request)?;

    let repo = ConfigSettingRepository::new(state.pool.clone());
    let updated = repo.update_values(&updates).await?;

    let keys: Vec<&str> = updates.iter().map(|(k, _)| k.as_str()).collect();
    info!(updated = updated, keys = ?keys, "LLM settings updated");

    Ok(Json(UpdateLlmSettingsResponse::new(updated as usize)))
}

/// Check the configured provider with a fixed prompt.
///
/// GET /api/settings/llm/test-connection
pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<TestConnectionResponse>, ApiError> {
    let response = GenerationService::new(&state).test_connection().await?;
    Ok(Json(response))
}

fn llm_setting_items(stored: Vec<ConfigSettingEntity>) -> Vec<LlmSettingItem> {
    let mut by_key: HashMap<String, ConfigSettingEntity> = stored
        .into_iter()
        .map(|e| (e.config_key.clone(), e))
        .collect();

    LLM_SETTING_KEYS
        .iter()
        .map(|key| {
            let config_value = by_key.remove(*key).map(|e| {
                mask_if_secret(&e.config_value, e.is_secret || is_secret_key(key))
            });
            LlmSettingItem {
                config_key: key.to_string(),
                config_value,
                description: description_for(key).to_string(),
            }
        })
        .collect()
}

fn collect_updates(request: &UpdateLlmSettingsRequest) -> Result<Vec<(String, String)>, ApiError> {
    let mut updates = Vec::new();

    for (key, value) in &request.values {
        if !LLM_SETTING_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(text) = stringify_setting_value(value)
            .map_err(|e| ApiError::Validation(format!("{}: {}", key, e)))?
        else {
            continue;
        };
        if is_secret_key(key) && is_masked(&text) {
            continue;
        }
        if text.chars().count() > MAX_CONFIG_VALUE_LENGTH {
            return Err(ApiError::Validation(format!(
                "{}: value must be at most {} characters",
                key, MAX_CONFIG_VALUE_LENGTH
            )));
        }
        validate_setting_value(key, &text).map_err(ApiError::Validation)?;
        updates.push((key.clone(), text));
    }

    Ok(updates)
}
