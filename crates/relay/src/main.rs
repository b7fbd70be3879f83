use anyhow::Context;
use clap::Parser;
use scribe_relay::cli::Args;
use scribe_relay::config::load_service_settings;
use scribe_relay::env::ProcessEnv;
use scribe_relay::logging::init_tracing;
use scribe_relay::{router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_dir.as_deref(), args.log_to_stderr)?;

    info!(
        listen_addr = %args.listen_addr,
        config = ?args.config,
        "relay starting"
    );
    let settings = load_service_settings(args.config.as_deref())?;
    if !settings.redact_secrets {
        warn!("config endpoint returns API keys to any caller; set config_endpoint.redact_secrets to withhold them");
    }
    info!(
        token_url = %settings.token_url,
        rewrite_timeout_ms = settings.rewrite_timeout.as_millis() as u64,
        max_tokens = settings.max_tokens,
        "settings loaded"
    );

    let state = AppState::new(Arc::new(ProcessEnv), settings)?;
    let app = router(state);

    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, "relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("relay shutting down");
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
