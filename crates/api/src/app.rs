use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::ProviderFactory;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{generate, health, history, llm_settings, settings, templates};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub llm: Arc<dyn ProviderFactory>,
}

/// Builds the CORS layer. An empty list or a `*` entry allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(config: Config, pool: PgPool, llm: Arc<dyn ProviderFactory>) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        pool,
        config: config.clone(),
        llm,
    };

    let cors = cors_layer(&config.security.cors_origins);

    // Literal /api/settings/llm paths win over /api/settings/:key
    let settings_routes = Router::new()
        .route(
            "/api/settings",
            get(settings::list_settings).post(settings::create_setting),
        )
        .route(
            "/api/settings/llm",
            get(llm_settings::get_llm_settings).put(llm_settings::update_llm_settings),
        )
        .route(
            "/api/settings/llm/test-connection",
            get(llm_settings::test_connection),
        )
        .route(
            "/api/settings/:key",
            get(settings::get_setting)
                .put(settings::update_setting)
                .delete(settings::delete_setting),
        );

    let template_routes = Router::new()
        .route(
            "/api/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/api/templates/:id/test", post(templates::test_template));

    let generation_routes = Router::new()
        .route("/api/generate", post(generate::generate_document))
        .route("/api/history/docs", get(history::list_history))
        .route(
            "/api/history/docs/:id",
            get(history::get_history_record).delete(history::delete_history_record),
        );

    // Public routes
    let public_routes = Router::new()
        .route("/api/", get(health::root))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(settings_routes)
        .merge(template_routes)
        .merge(generation_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
