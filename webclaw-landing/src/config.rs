use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LandingConfig {
    pub listen: String,
    pub webhook_url: Option<String>,      // SLACK_WEBHOOK_URL wins when set
    pub webhook_timeout_ms: u64,
    pub allowed_origins: Vec<String>,
    pub cors_origin: Option<String>,      // preflight origin, defaults to the first allowed one
    pub rate_limit: RateLimitConf,
    pub freshness: FreshnessConf,
    pub assets_dir: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RateLimitConf {
    pub window_ms: u64,
    pub max: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FreshnessConf {
    pub max_age_ms: u64,
    pub max_skew_ms: u64,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8787".into(),
            webhook_url: None,
            webhook_timeout_ms: 10_000,
            allowed_origins: vec!["https://webclaw.dev".into()],
            cors_origin: None,
            rate_limit: RateLimitConf::default(),
            freshness: FreshnessConf::default(),
            assets_dir: "./dist".into(),
        }
    }
}

impl Default for RateLimitConf {
    fn default() -> Self {
        Self { window_ms: 60_000, max: 8 }
    }
}

impl Default for FreshnessConf {
    fn default() -> Self {
        Self { max_age_ms: 15 * 60_000, max_skew_ms: 5_000 }
    }
}

impl LandingConfig {
    /// The relay has nowhere to send leads without it.
    pub fn require_webhook_url(&self) -> Result<&str> {
        match self.webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("no webhook URL configured (set SLACK_WEBHOOK_URL or webhook_url)"),
        }
    }

    pub fn cors_origin(&self) -> &str {
        self.cors_origin
            .as_deref()
            .or_else(|| self.allowed_origins.first().map(String::as_str))
            .unwrap_or("")
    }

    fn apply_env(mut self, webhook_env: Option<String>) -> Self {
        if let Some(url) = webhook_env.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        self
    }
}

pub async fn load_config() -> LandingConfig {
    let path = std::env::var("WEBCLAW_LANDING_CONFIG").unwrap_or_else(|_| "landing.yaml".into());
    load_config_from(&path)
        .await
        .apply_env(std::env::var("SLACK_WEBHOOK_URL").ok())
}

pub async fn load_config_from(path: impl AsRef<Path>) -> LandingConfig {
    let path = path.as_ref();
    if !path.exists() {
        info!("no {} found, using default config", path.display());
        return LandingConfig::default();
    }

    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return LandingConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!("invalid config {}: {e}", path.display());
        LandingConfig::default()
    })
}
