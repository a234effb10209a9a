pub mod cors;
pub mod error_response;
pub mod handlers;
pub mod request_log;

use crate::config::{CorsPolicy, ServerConfig};
use crate::core::MetricsStore;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetricsStore>,
    pub cors: Arc<CorsPolicy>,
    pub api_prefix: String,
    pub default_iterations: u64,
}

impl AppState {
    pub fn new(store: Arc<dyn MetricsStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            cors: Arc::new(config.cors_policy()),
            api_prefix: config.api_prefix.clone(),
            default_iterations: config.default_iterations,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let metrics_routes = Router::new()
        .route("/projects", get(handlers::projects_handler))
        .route("/iterations/:project", get(handlers::iterations_handler))
        .route("/:project", get(handlers::metrics_handler));

    let router = Router::new().route("/healthz", get(handlers::healthz_handler));
    let router = if state.api_prefix.is_empty() {
        router.merge(metrics_routes)
    } else {
        router.nest(&state.api_prefix, metrics_routes)
    };

    router
        .layer(from_fn_with_state(state.clone(), cors::cors_middleware))
        .layer(from_fn(request_log::request_log_middleware))
        .with_state(state)
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Could not register signal handlers, falling back to Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
