/*!
Helpers shared by router tests

- tracing output routed to the test harness
- response body readers for `tower::ServiceExt::oneshot` results
*/

use anyhow::Result;
use axum::response::Response;
use serde_json::Value;

/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub async fn read_text(response: Response) -> Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn read_json(response: Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use axum::Json;

    #[tokio::test]
    async fn test_body_readers() {
        init_test_tracing();
        init_test_tracing();

        let text = read_text("plain".into_response()).await.unwrap();
        assert_eq!(text, "plain");

        let json = read_json(Json(serde_json::json!({"ok": true})).into_response()).await.unwrap();
        assert_eq!(json["ok"], true);
    }
}
