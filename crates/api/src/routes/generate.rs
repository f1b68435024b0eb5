//! Document generation endpoint handler.

use axum::{extract::State, Json};
use validator::Validate;

use domain::models::generation::{GenerateRequest, GenerateResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::GenerationService;

/// Generate a document from a template.
///
/// POST /api/generate
pub async fn generate_document(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    request.validate()?;
    let response = GenerationService::new(&state).generate(&request).await?;
    Ok(Json(response))
}
