//! Keep-alive HTTP endpoint for hosts that ping the process to keep it awake.

use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::lifecycle::BotState;

#[derive(Clone)]
struct KeepAliveState {
    liveness: watch::Receiver<BotState>,
    started_at: Instant,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    uptime_secs: u64,
}

async fn root_handler() -> &'static str {
    "Bot is alive"
}

async fn health_handler(State(state): State<KeepAliveState>) -> Json<HealthBody> {
    let status = state.liveness.borrow().as_str();
    Json(HealthBody {
        status,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// `GET /` → "Bot is alive"; `GET /health` → liveness and uptime as JSON.
pub fn router(liveness: watch::Receiver<BotState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(KeepAliveState {
            liveness,
            started_at: Instant::now(),
        })
}

/// Serves the keep-alive router on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, liveness: watch::Receiver<BotState>) -> Result<()> {
    axum::serve(listener, router(liveness))
        .await
        .context("keep-alive server failed")
}

/// Binds `addr` and serves in the background. Failures are logged; the bot keeps running.
pub fn spawn_keep_alive(addr: String, liveness: watch::Receiver<BotState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, addr = %addr, "Keep-alive server failed to bind");
                return;
            }
        };
        info!(addr = %addr, "Keep-alive server listening");
        if let Err(e) = serve(listener, liveness).await {
            error!(error = %e, "Keep-alive server stopped");
        }
    })
}
