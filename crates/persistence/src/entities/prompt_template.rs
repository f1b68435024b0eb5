//! Prompt template entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::PromptTemplate;

/// Database row mapping for the prompt_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct PromptTemplateEntity {
    pub id: Uuid,
    pub name: String,
    pub document_type: String,
    pub template_content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromptTemplateEntity> for PromptTemplate {
    fn from(entity: PromptTemplateEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            document_type: entity.document_type,
            content: entity.template_content,
            active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_template_entity_to_domain() {
        let entity = PromptTemplateEntity {
            id: Uuid::new_v4(),
            name: "Quotation".to_string(),
            document_type: "quotation".to_string(),
            template_content: "Quote for {client}".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let template: PromptTemplate = entity.clone().into();

        assert_eq!(template.id, entity.id);
        assert_eq!(template.name, entity.name);
        assert_eq!(template.content, entity.template_content);
        assert!(template.active);
    }
}
