/**
 * WEBCLAW KERNEL - dashboard backend entry point
 *
 * ROLE: loads config, builds the service detector and serves the REST API
 * the dashboard's services screen polls.
 */

mod config;
mod http;
mod models;
mod services;

use crate::config::load_config;
use crate::http::AppState;
use crate::services::naming::NamingTables;
use crate::services::source::CommandSource;
use crate::services::{PortFilter, ServiceDetector};

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = load_config().await;

    let detector = ServiceDetector::new(
        CommandSource::new(&cfg.scan),
        NamingTables::from_config(&cfg.naming),
        PortFilter::from_config(&cfg.scan),
    );
    info!(
        "service detector ready (tools: {:?}, timeout {}ms)",
        cfg.scan.commands, cfg.scan.timeout_ms
    );

    let app = http::build_router(AppState { detector: Arc::new(detector) });

    let addr: SocketAddr = cfg
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {:?}", cfg.listen))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
