/**
 * LANDING HTTP SERVER
 *
 * ROLE:
 * Serves the built landing page and relays the "request a workspace" form
 * to the team's webhook.
 *
 * ROUTES:
 * - OPTIONS /api/lead  CORS preflight for the allowed origin
 * - POST    /api/lead  lead intake (origin, rate limit, validation, relay)
 * - other methods on /api/lead -> 405
 * - everything else    static assets
 *
 * Every rejection is a plain-text body with its status; success is {"ok": true}.
 */

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tracing::info;

use crate::clock::Clock;
use crate::config::{FreshnessConf, LandingConfig};
use crate::error::LeadError;
use crate::lead::LeadPayload;
use crate::origin::{client_key, OriginPolicy};
use crate::ratelimit::RateLimiter;
use crate::webhook::WebhookClient;

#[derive(Clone)]
pub struct AppState {
    pub origins: OriginPolicy,
    pub cors_origin: HeaderValue,
    pub limiter: RateLimiter,
    pub freshness: FreshnessConf,
    pub webhook: WebhookClient,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        cfg: &LandingConfig,
        limiter: RateLimiter,
        webhook: WebhookClient,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            origins: OriginPolicy::new(&cfg.allowed_origins),
            cors_origin: HeaderValue::from_str(cfg.cors_origin())?,
            limiter,
            freshness: cfg.freshness,
            webhook,
            clock,
        })
    }
}

pub fn build_router(app_state: AppState, assets_dir: &str) -> Router {
    Router::new()
        .route(
            "/api/lead",
            post(submit_lead).options(preflight).fallback(method_not_allowed),
        )
        .fallback_service(ServeDir::new(assets_dir))
        .with_state(app_state)
}

// OPTIONS /api/lead
async fn preflight(State(app): State<AppState>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, app.cors_origin.clone()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS")),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
        ],
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

// POST /api/lead
async fn submit_lead(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    match handle_lead(&app, &headers, &body).await {
        Ok(origin) => ok_response(&origin),
        Err(e) => {
            // webhook failures are already logged by the client
            if e != LeadError::WebhookFailed {
                info!("lead rejected: {}", e);
            }
            e.into_response()
        }
    }
}

/// Runs the checks in order; returns the validated origin to echo back.
async fn handle_lead(app: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<String, LeadError> {
    let origin = app.origins.check(headers)?;

    let now = app.clock.now_ms();
    if !app.limiter.allow(&client_key(headers), now) {
        return Err(LeadError::RateLimited);
    }

    let payload = LeadPayload::parse(body)?;
    payload.require_email()?;

    if payload.is_spam() {
        info!("honeypot filled, dropping lead from {}", origin);
        return Ok(origin);
    }

    payload.check_freshness(now, &app.freshness)?;

    app.webhook.send(&payload.to_webhook_message()).await?;
    info!("lead relayed from {}", origin);
    Ok(origin)
}

fn ok_response(origin: &str) -> Response {
    let mut response = Json(serde_json::json!({ "ok": true })).into_response();
    if let Ok(value) = HeaderValue::from_str(origin) {
        response.headers_mut().insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    response
}
