/*!
Stub webhook for relay tests

Real HTTP server on 127.0.0.1 standing in for the chat webhook the landing relay
forwards leads to. Records every payload it receives and answers with a
configurable status, so tests can assert on call counts and message text.
*/

use anyhow::Result;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct StubState {
    received: Arc<Mutex<Vec<Value>>>,
    status: Arc<Mutex<u16>>,
}

/// Running stub; the server stops when this is dropped.
pub struct StubWebhook {
    addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubWebhook {
    /// Stub answering 200 to every POST.
    pub async fn start() -> Result<Self> {
        Self::with_status(200).await
    }

    pub async fn with_status(status: u16) -> Result<Self> {
        let state = StubState::default();
        *state.status.lock() = status;

        let app = Router::new()
            .route("/hook", post(receive))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("stub webhook stopped: {}", e);
            }
        });

        tracing::debug!("stub webhook listening on {}", addr);
        Ok(Self { addr, state, handle })
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        *self.state.status.lock() = status;
    }

    /// Every payload received so far, oldest first.
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.received.lock().len()
    }

    /// `text` field of the last payload, if any.
    pub fn last_text(&self) -> Option<String> {
        self.state
            .received
            .lock()
            .last()
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl Drop for StubWebhook {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn receive(State(state): State<StubState>, body: Bytes) -> StatusCode {
    let payload = serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    state.received.lock().push(payload);

    let status = *state.status.lock();
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// URL of a port nothing listens on: connections are refused.
pub async fn unreachable_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/hook", addr))
}
