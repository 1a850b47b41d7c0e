use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{Claims, TokenError};
use crate::error::ApiError;

/// Caller identity attached to the request once the bearer token checks out
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub session_id: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
        }
    }
}

/// Reject the request with 401 unless it carries a valid `Bearer` access token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let headers = request.headers();
        let token = extract_bearer_token(headers)
            .ok_or_else(|| ApiError::unauthorized("Missing or invalid authorization header"))?;

        state.tokens.verify_access(token).map_err(|e| {
            log_rejected_token(headers, &e);
            ApiError::unauthorized("Invalid or expired token")
        })?
    };

    request.extensions_mut().insert(Identity::from(claims));
    Ok(next.run(request).await)
}

/// Attach an identity when a valid token is present; never rejects
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = extract_bearer_token(request.headers())
        .and_then(|token| state.tokens.verify_access(token).ok())
        .map(Identity::from);

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }

    next.run(request).await
}

/// `Authorization: Bearer <token>` with a non-empty token
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn log_rejected_token(headers: &HeaderMap, error: &TokenError) {
    let source = headers
        .get("x-auth-source")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("clerk");
    tracing::warn!(auth_source = source, error = %error, "Rejected bearer token");
}
