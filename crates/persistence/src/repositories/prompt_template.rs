//! Prompt template repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PromptTemplateEntity;
use crate::metrics::QueryTimer;

/// Repository for the prompt_templates table.
#[derive(Clone)]
pub struct PromptTemplateRepository {
    pool: PgPool,
}

impl PromptTemplateRepository {
    /// Creates a new PromptTemplateRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a template. Fails with a unique violation when the name exists.
    pub async fn create(
        &self,
        name: &str,
        document_type: &str,
        content: &str,
        is_active: bool,
    ) -> Result<PromptTemplateEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_prompt_template");
        let result = sqlx::query_as::<_, PromptTemplateEntity>(
            r#"
            INSERT INTO prompt_templates (name, document_type, template_content, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, document_type, template_content, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(document_type)
        .bind(content)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a template by ID, active or not.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PromptTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_prompt_template_by_id");
        let result = sqlx::query_as::<_, PromptTemplateEntity>(
            r#"
            SELECT id, name, document_type, template_content, is_active, created_at, updated_at
            FROM prompt_templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an active template by ID.
    pub async fn find_active_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PromptTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_prompt_template");
        let result = sqlx::query_as::<_, PromptTemplateEntity>(
            r#"
            SELECT id, name, document_type, template_content, is_active, created_at, updated_at
            FROM prompt_templates
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every template ordered by name.
    pub async fn list_all(&self) -> Result<Vec<PromptTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_prompt_templates");
        let result = sqlx::query_as::<_, PromptTemplateEntity>(
            r#"
            SELECT id, name, document_type, template_content, is_active, created_at, updated_at
            FROM prompt_templates
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partially update a template. Returns `None` when the ID is unknown.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        document_type: Option<&str>,
        content: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<PromptTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_prompt_template");
        let result = sqlx::query_as::<_, PromptTemplateEntity>(
            r#"
            UPDATE prompt_templates SET
                name = COALESCE($2, name),
                document_type = COALESCE($3, document_type),
                template_content = COALESCE($4, template_content),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, document_type, template_content, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(document_type)
        .bind(content)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a template. Returns the number of rows deleted (0 or 1).
    ///
    /// Fails with a foreign key violation while history references it.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_prompt_template");
        let result = sqlx::query(
            r#"
            DELETE FROM prompt_templates WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
