//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Publish connection pool gauges. Called on every metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Count history rows removed by retention pruning.
pub fn record_history_pruned(deleted: u64) {
    counter!("history_records_pruned_total").increment(deleted);
}

/// Times a repository query and records it under `query_name`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_prompt_template_by_id");
/// let result = sqlx::query_as::<_, PromptTemplateEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_generation_records");
        assert_eq!(timer.query_name, "list_generation_records");
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        // No global recorder is installed in unit tests.
        QueryTimer::new("seed_config_defaults").record();
        record_history_pruned(3);
    }
}
