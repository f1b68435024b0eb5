//! Generation record entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::GenerationRecord;

/// Database row mapping for the document_history table.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationRecordEntity {
    pub id: Uuid,
    pub template_id: Uuid,
    pub input_data: Option<String>,
    pub generated_content: Option<String>,
    pub document_format: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<GenerationRecordEntity> for GenerationRecord {
    fn from(entity: GenerationRecordEntity) -> Self {
        Self {
            id: entity.id,
            template_id: entity.template_id,
            input_data: entity.input_data,
            generated_content: entity.generated_content,
            format: entity.document_format,
            generated_at: entity.generated_at,
        }
    }
}
