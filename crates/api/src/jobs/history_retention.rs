//! Generation history retention job.

use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info};

use domain::models::llm_settings::parse_bool;
use domain::models::settings_catalog::{find_default, keys};
use persistence::repositories::{ConfigSettingRepository, GenerationRecordRepository};

use super::scheduler::Job;

const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

/// Deletes history older than `history_retention_days`.
///
/// Settings are read on every run so changes apply without a restart.
/// A retention of 0, or history being disabled, skips the run.
pub struct HistoryRetentionJob {
    settings: ConfigSettingRepository,
    history: GenerationRecordRepository,
}

impl HistoryRetentionJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            settings: ConfigSettingRepository::new(pool.clone()),
            history: GenerationRecordRepository::new(pool),
        }
    }

    async fn setting(&self, key: &str) -> Result<String, sqlx::Error> {
        let default = find_default(key).map(|d| d.value).unwrap_or("");
        self.settings.get_value(key, default).await
    }
}

/// Retention in days, or `None` when pruning is off. Values beyond the
/// database interval range, like other invalid values, are treated as off.
fn retention_days(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(days) if days > 0 && i32::try_from(days).is_ok() => Some(days),
        _ => None,
    }
}

#[async_trait::async_trait]
impl Job for HistoryRetentionJob {
    fn name(&self) -> &'static str {
        "history_retention"
    }

    fn interval(&self) -> Duration {
        PRUNE_INTERVAL
    }

    async fn execute(&self) -> Result<(), String> {
        let enabled = self
            .setting(keys::ENABLE_HISTORY)
            .await
            .map_err(|e| e.to_string())?;
        if !parse_bool(&enabled) {
            debug!("History disabled, skipping retention");
            return Ok(());
        }

        let raw = self
            .setting(keys::HISTORY_RETENTION_DAYS)
            .await
            .map_err(|e| e.to_string())?;
        let Some(days) = retention_days(&raw) else {
            debug!(value = %raw, "History retention off");
            return Ok(());
        };

        let deleted = self
            .history
            .delete_older_than(days)
            .await
            .map_err(|e| format!("Failed to prune history: {}", e))?;

        info!(retention_days = days, deleted = deleted, "History retention completed");
        Ok(())
    }
}
