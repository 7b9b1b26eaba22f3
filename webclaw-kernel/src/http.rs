/**
 * WEBCLAW KERNEL REST API
 *
 * ROLE:
 * HTTP surface the dashboard polls for local machine state.
 *
 * ROUTES:
 * - GET /health        liveness probe
 * - GET /api/services  listening services detected on this host
 *
 * Sessions, chat and cron endpoints belong to the gateway, not to this server.
 */

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::get, Json, Router};
use tracing::error;

use crate::models::{ServicesErrorResponse, ServicesResponse};
use crate::services::source::SocketSource;
use crate::services::ServiceDetector;

pub struct AppState<S> {
    pub detector: Arc<ServiceDetector<S>>,
}

// derive(Clone) would require S: Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self { detector: self.detector.clone() }
    }
}

pub fn build_router<S: SocketSource>(app_state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/services", get(list_services::<S>))
        .with_state(app_state)
}

// GET /api/services
async fn list_services<S: SocketSource>(State(app): State<AppState<S>>) -> Response {
    let detector = app.detector.clone();
    // own task: a panic in the detector becomes a 500 instead of a dropped connection
    let scan = tokio::spawn(async move { detector.detect_listening_ports().await });

    match scan.await {
        Ok(services) => Json(ServicesResponse { services }).into_response(),
        Err(e) => {
            error!("service detection failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServicesErrorResponse { error: e.to_string(), services: Vec::new() }),
            )
                .into_response()
        }
    }
}
