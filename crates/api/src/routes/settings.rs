//! Configuration setting endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use domain::models::config_setting::{
    CreateSettingRequest, SettingResponse, UpdateSettingRequest,
};
use domain::models::settings_catalog::validate_setting_value;
use domain::models::ConfigSetting;
use persistence::repositories::ConfigSettingRepository;

use crate::app::AppState;
use crate::error::ApiError;

fn not_found(key: &str) -> ApiError {
    ApiError::NotFound(format!("Config key '{}' not found", key))
}

/// List all settings.
///
/// GET /api/settings
pub async fn list_settings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SettingResponse>>, ApiError> {
    let repo = ConfigSettingRepository::new(state.pool.clone());
    let settings = repo
        .list_all()
        .await?
        .into_iter()
        .map(|e| SettingResponse::from(ConfigSetting::from(e)))
        .collect();
    Ok(Json(settings))
}

/// Get a single setting.
///
/// GET /api/settings/:key
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingResponse>, ApiError> {
    let repo = ConfigSettingRepository::new(state.pool.clone());
    let entity = repo.find_by_key(&key).await?.ok_or_else(|| not_found(&key))?;
    Ok(Json(ConfigSetting::from(entity).into()))
}

/// Create a setting.
///
/// POST /api/settings
pub async fn create_setting(
    State(state): State<AppState>,
    Json(request): Json<CreateSettingRequest>,
) -> Result<(StatusCode, Json<SettingResponse>), ApiError> {
    request.validate()?;
    validate_setting_value(&request.config_key, &request.config_value)
        .map_err(ApiError::Validation)?;

    let repo = ConfigSettingRepository::new(state.pool.clone());
    if repo.find_by_key(&request.config_key).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Config key '{}' already exists",
            request.config_key
        )));
    }

    // The unique constraint still rejects a concurrent insert of the same key
    let entity = repo
        .create(
            &request.config_key,
            &request.config_value,
            request.description.as_deref(),
            request.effective_secret(),
        )
        .await?;

    info!(
        config_key = %entity.config_key,
        is_secret = entity.is_secret,
        "Setting created"
    );

    Ok((StatusCode::CREATED, Json(ConfigSetting::from(entity).into())))
}

/// Partially update a setting.
///
/// PUT /api/settings/:key
///
/// Submitting the mask sentinel for a secret leaves the stored value alone.
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<Json<SettingResponse>, ApiError> {
    request.validate()?;

    let repo = ConfigSettingRepository::new(state.pool.clone());
    let existing = repo.find_by_key(&key).await?.ok_or_else(|| not_found(&key))?;

    let is_secret = request.target_is_secret(&key, existing.is_secret);
    let value = request.value_to_store(is_secret);
    let target_key = request.target_key(&key);
    validate_setting_value(target_key, value.unwrap_or(&existing.config_value))
        .map_err(ApiError::Validation)?;

    let entity = repo
        .update(
            &key,
            request.config_key.as_deref(),
            value,
            request.description.as_deref(),
            is_secret,
        )
        .await?
        .ok_or_else(|| not_found(&key))?;

    info!(
        config_key = %key,
        new_key = %entity.config_key,
        "Setting updated"
    );

    Ok(Json(ConfigSetting::from(entity).into()))
}

/// Delete a setting.
///
/// DELETE /api/settings/:key
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = ConfigSettingRepository::new(state.pool.clone());
    if repo.delete(&key).await? == 0 {
        return Err(not_found(&key));
    }

    info!(config_key = %key, "Setting deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_key() {
        let err = not_found("llm_model");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("'llm_model'"));
    }
}
