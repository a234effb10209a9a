use anyhow::Context;
use clap::Parser;
use perf_metrics_api::http::shutdown_signal;
use perf_metrics_api::utils::{logger, validation::Validate};
use perf_metrics_api::{build_router, AppState, CliArgs, LocalMetricsStore, MetricsError, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

fn exit_with(e: &MetricsError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 設定（含 .env 寫入環境變數）需在建立執行緒池之前完成，也才能決定日誌格式
    let config = match ServerConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            logger::init_logger(args.verbose, args.json_logs);
            exit_with(&e);
        }
    };

    logger::init_logger(args.verbose, args.json_logs || !config.debug);

    tracing::info!("🚀 Starting perf-metrics-api");
    tracing::debug!("Server config: {:?}", config);

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build the tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    // 資料目錄不存在時直接結束，不提供降級服務
    let store = match LocalMetricsStore::open(&config.data_dir).await {
        Ok(store) => store,
        Err(e) => exit_with(&e),
    };
    tracing::info!("📁 Serving metrics from {}", store.root().display());

    let state = AppState::new(Arc::new(store), &config);
    tracing::info!("🔧 CORS policy: {:?}", state.cors);
    let app = build_router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        "✅ Listening on http://{} (routes under '{}')",
        listener.local_addr()?,
        config.api_prefix
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}
