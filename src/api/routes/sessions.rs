//! Capture session API endpoints.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::platform::Platform;
use crate::session::{CaptureService, SessionId};
use crate::summary::transcript_text;

/// Request body for starting a capture session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub platform: String,
    pub meeting_url: String,
}

pub fn router(service: Arc<CaptureService>) -> Router {
    Router::new()
        .route("/sessions", post(start_session).get(list_sessions))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/transcript", get(get_transcript))
        .route("/sessions/:id/stop", post(stop_session))
        .with_state(service)
}

async fn start_session(
    State(service): State<Arc<CaptureService>>,
    Json(req): Json<StartSessionRequest>,
) -> ApiResult<Json<Value>> {
    let platform = Platform::parse(&req.platform);
    info!(
        "Session start requested via API: {} {}",
        platform, req.meeting_url
    );

    let id = service.start_capture(platform, &req.meeting_url).await?;

    Ok(Json(json!({
        "success": true,
        "session_id": id,
        "platform": platform.as_str(),
    })))
}

async fn list_sessions(State(service): State<Arc<CaptureService>>) -> Json<Value> {
    let sessions = service.active_sessions().await;
    Json(json!({ "sessions": sessions }))
}

async fn get_session(
    Path(id): Path<String>,
    State(service): State<Arc<CaptureService>>,
) -> ApiResult<Json<Value>> {
    let id = SessionId::new(id);
    match service.active_session(&id).await {
        Some(snapshot) => Ok(Json(json!(snapshot))),
        None => Err(ApiError::not_found(format!(
            "no capture session with id {id}"
        ))),
    }
}

async fn get_transcript(
    Path(id): Path<String>,
    State(service): State<Arc<CaptureService>>,
) -> ApiResult<String> {
    let id = SessionId::new(id);
    match service.active_session(&id).await {
        Some(snapshot) => Ok(transcript_text(&snapshot.transcript_entries)),
        None => Err(ApiError::not_found(format!(
            "no capture session with id {id}"
        ))),
    }
}

async fn stop_session(
    Path(id): Path<String>,
    State(service): State<Arc<CaptureService>>,
) -> ApiResult<Json<Value>> {
    let id = SessionId::new(id);
    info!("Session stop requested via API: {}", id);

    service.stop_capture(&id).await?;

    Ok(Json(json!({
        "success": true,
        "session_id": id,
        "message": "Capture session stopped",
    })))
}
