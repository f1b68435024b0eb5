//! Generation history repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::NewGenerationRecord;
use shared::pagination::Page;

use crate::entities::GenerationRecordEntity;
use crate::metrics::QueryTimer;

/// Rows removed per statement when pruning old history.
const PRUNE_BATCH_SIZE: i64 = 5_000;

/// Longest retention honoured. The cutoff stays inside the timestamp range.
const MAX_RETENTION_DAYS: u32 = 1_000_000;

/// Repository for the document_history table.
#[derive(Clone)]
pub struct GenerationRecordRepository {
    pool: PgPool,
}

impl GenerationRecordRepository {
    /// Creates a new GenerationRecordRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a history record.
    pub async fn create(
        &self,
        record: &NewGenerationRecord,
    ) -> Result<GenerationRecordEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_generation_record");
        let result = sqlx::query_as::<_, GenerationRecordEntity>(
            r#"
            INSERT INTO document_history (template_id, input_data, generated_content, document_format)
            VALUES ($1, $2, $3, $4)
            RETURNING id, template_id, input_data, generated_content, document_format, generated_at
            "#,
        )
        .bind(record.template_id)
        .bind(record.input_data.as_deref())
        .bind(&record.generated_content)
        .bind(&record.format)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a history record by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<GenerationRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_generation_record_by_id");
        let result = sqlx::query_as::<_, GenerationRecordEntity>(
            r#"
            SELECT id, template_id, input_data, generated_content, document_format, generated_at
            FROM document_history
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List history records, newest first.
    pub async fn list(&self, page: Page) -> Result<Vec<GenerationRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_generation_records");
        let result = sqlx::query_as::<_, GenerationRecordEntity>(
            r#"
            SELECT id, template_id, input_data, generated_content, document_format, generated_at
            FROM document_history
            ORDER BY generated_at DESC, id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a history record. Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_generation_record");
        let result = sqlx::query(
            r#"
            DELETE FROM document_history WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Delete records older than `days` days, in batches to avoid long locks.
    /// Returns the total number of rows deleted.
    pub async fn delete_older_than(&self, days: u32) -> Result<u64, sqlx::Error> {
        let days = match i32::try_from(days) {
            Ok(d) if days <= MAX_RETENTION_DAYS => d,
            _ => {
                tracing::warn!(retention_days = days, "Retention out of range, nothing pruned");
                return Ok(0);
            }
        };
        let timer = QueryTimer::new("prune_generation_records");
        let mut total_deleted: u64 = 0;

        loop {
            let result = sqlx::query(
                r#"
                WITH to_delete AS (
                    SELECT id FROM document_history
                    WHERE generated_at < NOW() - make_interval(days => $1)
                    LIMIT $2
                )
                DELETE FROM document_history
                WHERE id IN (SELECT id FROM to_delete)
                "#,
            )
            .bind(days)
            .bind(PRUNE_BATCH_SIZE)
            .execute(&self.pool)
            .await?;

            let deleted = result.rows_affected();
            total_deleted += deleted;
            tracing::debug!(deleted, retention_days = days, "Pruned history batch");

            if deleted < PRUNE_BATCH_SIZE as u64 {
                break;
            }

            tokio::task::yield_now().await;
        }

        timer.record();
        crate::metrics::record_history_pruned(total_deleted);
        Ok(total_deleted)
    }
}
