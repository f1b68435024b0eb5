//! Prompt template endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::generation::TestTemplateResponse;
use domain::models::prompt_template::{
    CreateTemplateRequest, TemplateResponse, UpdateTemplateRequest,
};
use domain::models::PromptTemplate;
use persistence::repositories::PromptTemplateRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::GenerationService;

fn not_found() -> ApiError {
    ApiError::NotFound("Template not found".to_string())
}

fn to_response(entity: persistence::entities::PromptTemplateEntity) -> TemplateResponse {
    PromptTemplate::from(entity).into()
}

/// Create a template.
///
/// POST /api/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiError> {
    request.validate()?;

    let repo = PromptTemplateRepository::new(state.pool.clone());
    let entity = repo
        .create(
            request.name.trim(),
            request.document_type.trim(),
            &request.template_content,
            request.is_active,
        )
        .await
        .map_err(|e| duplicate_name(e, &request.name))?;

    info!(
        template_id = %entity.id,
        name = %entity.name,
        document_type = %entity.document_type,
        "Template created"
    );

    Ok((StatusCode::CREATED, Json(to_response(entity))))
}

/// List all templates.
///
/// GET /api/templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<TemplateResponse>>, ApiError> {
    let repo = PromptTemplateRepository::new(state.pool.clone());
    let templates = repo.list_all().await?.into_iter().map(to_response).collect();
    Ok(Json(templates))
}

/// Get a template, active or not.
///
/// GET /api/templates/:id
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let repo = PromptTemplateRepository::new(state.pool.clone());
    let entity = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(to_response(entity)))
}

/// Partially update a template.
///
/// PUT /api/templates/:id
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, ApiError> {
    request.validate()?;

    let repo = PromptTemplateRepository::new(state.pool.clone());
    if request.is_empty() {
        let entity = repo.find_by_id(id).await?.ok_or_else(not_found)?;
        return Ok(Json(to_response(entity)));
    }

    let entity = repo
        .update(
            id,
            request.name.as_deref().map(str::trim),
            request.document_type.as_deref().map(str::trim),
            request.template_content.as_deref(),
            request.is_active,
        )
        .await
        .map_err(|e| duplicate_name(e, request.name.as_deref().unwrap_or_default()))?
        .ok_or_else(not_found)?;

    info!(
        template_id = %entity.id,
        name = %entity.name,
        is_active = entity.is_active,
        "Template updated"
    );

    Ok(Json(to_response(entity)))
}

/// Delete a template.
///
/// DELETE /api/templates/:id
///
/// Templates referenced by history are kept and the request fails with 409.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = PromptTemplateRepository::new(state.pool.clone());
    if repo.delete(id).await? == 0 {
        return Err(not_found());
    }

    info!(template_id = %id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Render a template with sample input and call the test model.
///
/// POST /api/templates/:id/test
pub async fn test_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<TestTemplateResponse>, ApiError> {
    let response = GenerationService::new(&state)
        .test_template(id, &input)
        .await?;
    Ok(Json(response))
}

/// Names the template on a unique violation; other errors map as usual.
fn duplicate_name(err: sqlx::Error, name: &str) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ApiError::Conflict(format!("Template name '{}' already exists", name.trim()))
        }
        _ => err.into(),
    }
}
