// File: zyra-server/src/health.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::info;
use twilight_cache_inmemory::InMemoryCache;

use zyra_core::Error;
use zyra_core::services::music::SessionRegistry;

#[derive(Clone)]
pub struct HealthState {
    started: Instant,
    registry: Arc<SessionRegistry>,
    cache: Arc<InMemoryCache>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HealthStatus {
    pub status: &'static str,
    /// Bot username, or "connecting" before the gateway is ready.
    pub bot: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

impl HealthState {
    pub fn new(registry: Arc<SessionRegistry>, cache: Arc<InMemoryCache>) -> Self {
        Self {
            started: Instant::now(),
            registry,
            cache,
        }
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            bot: self
                .cache
                .current_user()
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "connecting".to_string()),
            uptime_secs: self.started.elapsed().as_secs(),
            sessions: self.registry.len(),
        }
    }
}

async fn health(State(state): State<HealthState>) -> Json<HealthStatus> {
    Json(state.status())
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "status": "not_found" })))
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

/// Serves the health endpoint on `0.0.0.0:port` until `shutdown` fires.
pub async fn serve(port: u16, state: HealthState, shutdown: CancellationToken) -> Result<(), Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Health endpoint listening on http://{addr}/health");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_connecting_before_ready() {
        let state = HealthState::new(Arc::new(SessionRegistry::new()), Arc::new(InMemoryCache::new()));
        let status = state.status();
        assert_eq!(status.status, "ok");
        assert_eq!(status.bot, "connecting");
        assert_eq!(status.sessions, 0);

        let body = serde_json::to_value(&status).unwrap();
        assert!(body.get("uptime_secs").is_some());
    }
}
