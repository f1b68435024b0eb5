//! Generation history endpoint handlers.
//!
//! Every endpoint answers 403 while the `enable_history` setting is off.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use domain::models::generation::HistoryRecordResponse;
use domain::models::llm_settings::parse_bool;
use domain::models::settings_catalog::{find_default, keys};
use domain::models::GenerationRecord;
use persistence::repositories::{ConfigSettingRepository, GenerationRecordRepository};
use shared::pagination::OffsetQuery;

use crate::app::AppState;
use crate::error::ApiError;

async fn ensure_history_enabled(state: &AppState) -> Result<(), ApiError> {
    let default = find_default(keys::ENABLE_HISTORY)
        .map(|d| d.value)
        .unwrap_or("true");
    let repo = ConfigSettingRepository::new(state.pool.clone());
    let value = repo.get_value(keys::ENABLE_HISTORY, default).await?;

    if parse_bool(&value) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Document history is disabled".to_string(),
        ))
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("History record not found".to_string())
}

/// List history records, newest first.
///
/// GET /api/history/docs?skip=0&limit=100
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<OffsetQuery>,
) -> Result<Json<Vec<HistoryRecordResponse>>, ApiError> {
    ensure_history_enabled(&state).await?;
    let page = query.page()?;

    let repo = GenerationRecordRepository::new(state.pool.clone());
    let records = repo
        .list(page)
        .await?
        .into_iter()
        .map(|e| HistoryRecordResponse::from(GenerationRecord::from(e)))
        .collect();
    Ok(Json(records))
}

/// Get a history record.
///
/// GET /api/history/docs/:id
pub async fn get_history_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryRecordResponse>, ApiError> {
    ensure_history_enabled(&state).await?;

    let repo = GenerationRecordRepository::new(state.pool.clone());
    let entity = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(GenerationRecord::from(entity).into()))
}

/// Delete a history record.
///
/// DELETE /api/history/docs/:id
pub async fn delete_history_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_history_enabled(&state).await?;

    let repo = GenerationRecordRepository::new(state.pool.clone());
    if repo.delete(id).await? == 0 {
        return Err(not_found());
    }

    info!(history_id = %id, "History record deleted");
    Ok(StatusCode::NO_CONTENT)
}
