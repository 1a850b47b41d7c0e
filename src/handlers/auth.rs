use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/refresh - exchange a refresh token for a new token pair
pub async fn refresh_session(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(body) = payload?;

    let pair = state.tokens.refresh(&body.refresh_token).map_err(|e| {
        tracing::warn!(error = %e, "Refresh token rejected");
        ApiError::unauthorized("Invalid or expired refresh token")
    })?;

    tracing::info!(session_id = %pair.session_id, "Session refreshed");
    Ok(ApiResponse::success(pair))
}
