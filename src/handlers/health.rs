use axum::{extract::State, response::Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health - liveness check, no auth and no dependencies
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}
