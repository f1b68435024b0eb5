use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use docgen_api::app::create_app;
use docgen_api::config::Config;
use docgen_api::jobs::{HistoryRetentionJob, JobScheduler};
use docgen_api::middleware::{init_metrics, logging::init_logging};
use docgen_api::services::HttpProviderFactory;
use domain::models::llm_settings::parse_list;
use domain::models::settings_catalog::keys;
use persistence::repositories::ConfigSettingRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let mut config = Config::load()?;
    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting Document Generator API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let settings = ConfigSettingRepository::new(pool.clone());
    let report = settings.seed_defaults(config.seed.policy).await?;
    info!(
        policy = config.seed.policy.as_str(),
        inserted = report.inserted,
        reconciled = report.reconciled,
        "Default settings seeded"
    );

    if config.security.cors_origins.is_empty() {
        let raw = settings.get_value(keys::CORS_ALLOWED_ORIGINS, "*").await?;
        config.security.cors_origins = parse_list(&raw);
        info!(origins = ?config.security.cors_origins, "CORS origins loaded from settings");
    }

    let mut scheduler = JobScheduler::new();
    if config.jobs.history_retention_enabled {
        scheduler.register(HistoryRetentionJob::new(pool.clone()));
    }
    scheduler.start();

    let llm = Arc::new(HttpProviderFactory::new()?);
    let addr = config.socket_addr();
    let app = create_app(config, pool, llm);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
