/*
 * Responsibility
 * - Config -> settings / cache / header assembler -> Router
 * - Middleware order: trace (outermost) -> security headers -> routes
 * - axum::serve()
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    api::v1::handlers::{health::health, page::index},
    config::Config,
    headers::{HeaderAssembler, HeaderCache, ReportEndpoints},
    middleware::security_headers,
    services::cache::{CacheBackend, CacheClient, MemoryCache},
    settings::MemorySettings,
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,security_headers=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    tracing::info!(
        "starting security headers service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let settings = match &config.settings_path {
        Some(path) => MemorySettings::load_file(path)?,
        None => {
            tracing::warn!("SETTINGS_PATH not set; every security header starts disabled");
            MemorySettings::new()
        }
    };
    let settings = Arc::new(settings);

    // A cache outage must not take the service down: fall back to process memory.
    let cache = match CacheBackend::connect(config.valkey_url.as_deref()).await {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!(error = %e, "valkey unavailable, using in-process header cache");
            CacheBackend::Memory(MemoryCache::new())
        }
    };
    tracing::info!(backend = cache.backend_name(), "header cache ready");

    let headers = HeaderAssembler::new(
        settings.clone(),
        ReportEndpoints::new(config.csp_report_base_url.clone()),
        HeaderCache::new(cache, config.cache_prefix.clone()),
    );

    Ok(AppState::new(
        settings,
        Arc::new(headers),
        config.admin_token.clone(),
    ))
}

fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state.clone());

    security_headers::apply(router, state).layer(TraceLayer::new_for_http())
}
