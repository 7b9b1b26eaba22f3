/**
 * WEBCLAW LANDING - marketing site + lead relay
 *
 * ROLE: serves the built landing page and forwards workspace requests
 * from its form to the team's chat webhook.
 */

mod clock;
mod config;
mod error;
mod http;
mod lead;
mod origin;
mod ratelimit;
mod webhook;

use crate::clock::{Clock, SystemClock};
use crate::config::load_config;
use crate::http::AppState;
use crate::ratelimit::{spawn_rate_limit_sweeper, InMemoryRateLimitStore, RateLimitStore, RateLimiter};
use crate::webhook::WebhookClient;

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = load_config().await;
    let webhook_url = cfg.require_webhook_url()?;
    let webhook = WebhookClient::new(webhook_url, Duration::from_millis(cfg.webhook_timeout_ms))
        .context("failed to build webhook client")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
    let limiter = RateLimiter::new(store.clone(), cfg.rate_limit);
    let _sweeper = spawn_rate_limit_sweeper(store, clock.clone(), limiter.window());

    info!(
        "lead relay ready (origins: {:?}, {} per {}ms)",
        cfg.allowed_origins, cfg.rate_limit.max, cfg.rate_limit.window_ms
    );

    let state = AppState::new(&cfg, limiter, webhook, clock)?;
    let app = http::build_router(state, &cfg.assets_dir);

    let addr: SocketAddr = cfg
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {:?}", cfg.listen))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("serving {} on http://{addr}", cfg.assets_dir);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
