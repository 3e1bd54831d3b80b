//! Platform integration endpoints.

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::session::CaptureService;

pub fn router(service: Arc<CaptureService>) -> Router {
    Router::new()
        .route("/platforms", get(list_platforms))
        .with_state(service)
}

async fn list_platforms(State(service): State<Arc<CaptureService>>) -> Json<Value> {
    Json(json!({ "platforms": service.platform_integrations() }))
}
