//! Configuration setting repository for database operations.

use std::collections::HashMap;

use sqlx::PgPool;

use domain::models::settings_catalog::{DefaultSetting, ReconciliationPolicy, DEFAULT_SETTINGS};

use crate::entities::ConfigSettingEntity;
use crate::metrics::QueryTimer;

/// Outcome of seeding the default settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Keys that did not exist and were inserted.
    pub inserted: u64,
    /// Keys that already existed and were reconciled.
    pub reconciled: u64,
}

/// Repository for the application_config table.
#[derive(Clone)]
pub struct ConfigSettingRepository {
    pool: PgPool,
}

impl ConfigSettingRepository {
    /// Creates a new ConfigSettingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the stored value for a key, or `default` when absent.
    pub async fn get_value(&self, key: &str, default: &str) -> Result<String, sqlx::Error> {
        let timer = QueryTimer::new("get_config_value");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT config_value FROM application_config WHERE config_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.unwrap_or_else(|| default.to_string()))
    }

    /// Loads the stored values for the given keys. Absent keys are omitted.
    pub async fn get_values(&self, keys: &[&str]) -> Result<HashMap<String, String>, sqlx::Error> {
        let timer = QueryTimer::new("get_config_values");
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let result = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT config_key, config_value
            FROM application_config
            WHERE config_key = ANY($1)
            "#,
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().collect())
    }

    /// Find a setting by key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<ConfigSettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_config_by_key");
        let result = sqlx::query_as::<_, ConfigSettingEntity>(
            r#"
            SELECT id, config_key, config_value, description, is_secret, created_at, updated_at
            FROM application_config
            WHERE config_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every setting ordered by key.
    pub async fn list_all(&self) -> Result<Vec<ConfigSettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_config_settings");
        let result = sqlx::query_as::<_, ConfigSettingEntity>(
            r#"
            SELECT id, config_key, config_value, description, is_secret, created_at, updated_at
            FROM application_config
            ORDER BY config_key
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the settings for the given keys.
    pub async fn find_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigSettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_config_by_keys");
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let result = sqlx::query_as::<_, ConfigSettingEntity>(
            r#"
            SELECT id, config_key, config_value, description, is_secret, created_at, updated_at
            FROM application_config
            WHERE config_key = ANY($1)
            "#,
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a setting. Fails with a unique violation when the key exists.
    pub async fn create(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
        is_secret: bool,
    ) -> Result<ConfigSettingEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_config_setting");
        let result = sqlx::query_as::<_, ConfigSettingEntity>(
            r#"
            INSERT INTO application_config (config_key, config_value, description, is_secret)
            VALUES ($1, $2, $3, $4)
            RETURNING id, config_key, config_value, description, is_secret, created_at, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(is_secret)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partially update a setting. `None` fields are left unchanged.
    /// Returns `None` when the key does not exist.
    pub async fn update(
        &self,
        key: &str,
        new_key: Option<&str>,
        value: Option<&str>,
        description: Option<&str>,
        is_secret: bool,
    ) -> Result<Option<ConfigSettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_config_setting");
        let result = sqlx::query_as::<_, ConfigSettingEntity>(
            r#"
            UPDATE application_config SET
                config_key = COALESCE($2, config_key),
                config_value = COALESCE($3, config_value),
                description = COALESCE($4, description),
                is_secret = is_secret OR $5,
                updated_at = NOW()
            WHERE config_key = $1
            RETURNING id, config_key, config_value, description, is_secret, created_at, updated_at
            "#,
        )
        .bind(key)
        .bind(new_key)
        .bind(value)
        .bind(description)
        .bind(is_secret)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the values of existing keys atomically.
    /// Keys that do not exist are skipped. Returns the number of rows updated.
    pub async fn update_values(&self, values: &[(String, String)]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_config_values");
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for (key, value) in values {
            let result = sqlx::query(
                r#"
                UPDATE application_config
                SET config_value = $2, updated_at = NOW()
                WHERE config_key = $1
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Delete a setting. Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, key: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_config_setting");
        let result = sqlx::query(
            r#"
            DELETE FROM application_config WHERE config_key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Seed the built-in settings in a single transaction.
    ///
    /// Safe to run repeatedly: keys are unique and conflicts are reconciled
    /// according to `policy` instead of inserting duplicates.
    pub async fn seed_defaults(
        &self,
        policy: ReconciliationPolicy,
    ) -> Result<SeedReport, sqlx::Error> {
        self.seed(DEFAULT_SETTINGS, policy).await
    }

    async fn seed(
        &self,
        defaults: &[DefaultSetting],
        policy: ReconciliationPolicy,
    ) -> Result<SeedReport, sqlx::Error> {
        let timer = QueryTimer::new("seed_config_defaults");
        let query = match policy {
            // xmax = 0 only for freshly inserted rows
            ReconciliationPolicy::Preserve => {
                r#"
                INSERT INTO application_config (config_key, config_value, description, is_secret)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (config_key) DO UPDATE SET
                    description = EXCLUDED.description,
                    is_secret = EXCLUDED.is_secret
                RETURNING (xmax = 0) AS inserted
                "#
            }
            ReconciliationPolicy::Overwrite => {
                r#"
                INSERT INTO application_config (config_key, config_value, description, is_secret)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (config_key) DO UPDATE SET
                    config_value = EXCLUDED.config_value,
                    description = EXCLUDED.description,
                    is_secret = EXCLUDED.is_secret,
                    updated_at = NOW()
                RETURNING (xmax = 0) AS inserted
                "#
            }
        };

        let mut tx = self.pool.begin().await?;
        let mut report = SeedReport::default();

        for default in defaults {
            let inserted = sqlx::query_scalar::<_, bool>(query)
                .bind(default.key)
                .bind(default.value)
                .bind(default.description)
                .bind(default.secret)
                .fetch_one(&mut *tx)
                .await?;

            if inserted {
                report.inserted += 1;
            } else {
                report.reconciled += 1;
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(report)
    }
}
