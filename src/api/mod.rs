//! REST API server for meetcap.
//!
//! Provides HTTP endpoints for:
//! - Session control (start, stop, list, inspect)
//! - Transcript retrieval
//! - Platform integration listing

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::session::CaptureService;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    port: u16,
    service: Arc<CaptureService>,
}

impl ApiServer {
    pub fn new(service: Arc<CaptureService>, config: &Config) -> Self {
        Self {
            port: config.api.port,
            service,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .route("/", get(status))
            .route("/version", get(version))
            .merge(routes::sessions::router(self.service.clone()))
            .merge(routes::platforms::router(self.service))
            .layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /                          - Service info");
        info!("  GET  /version                   - Version info");
        info!("  GET  /platforms                 - List platform integrations");
        info!("  POST /sessions                  - Start a capture session");
        info!("  GET  /sessions                  - List active sessions");
        info!("  GET  /sessions/:id              - Get one session");
        info!("  GET  /sessions/:id/transcript   - Get transcript text");
        info!("  POST /sessions/:id/stop         - Stop a session");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "meetcap",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "meetcap"
    }))
}
