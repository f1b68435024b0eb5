//! Prompt template domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Represents a reusable prompt with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: Uuid,
    pub name: String,
    pub document_type: String,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default active status for new templates.
fn default_active() -> bool {
    true
}

/// Request payload for creating a template.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Document type must be 1-50 characters"))]
    pub document_type: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub template_content: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request payload for updating a template (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Document type must be 1-50 characters"))]
    pub document_type: Option<String>,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub template_content: Option<String>,

    pub is_active: Option<bool>,
}

impl UpdateTemplateRequest {
    /// Returns true when the request changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.document_type.is_none()
            && self.template_content.is_none()
            && self.is_active.is_none()
    }
}

/// Response payload for template operations.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub document_type: String,
    pub template_content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromptTemplate> for TemplateResponse {
    fn from(t: PromptTemplate) -> Self {
        Self {
            id: t.id,
            name: t.name,
            document_type: t.document_type,
            template_content: t.content,
            is_active: t.active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
