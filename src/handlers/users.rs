use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::database::models::{UpdateUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Identity};

/// GET /api/users/me - profile of the authenticated caller
pub async fn get_current_user(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> ApiResult<User> {
    let Some(Extension(identity)) = identity else {
        return Err(ApiError::unauthorized("User not authenticated"));
    };

    let user = state
        .users
        .get_user_by_id(&identity.user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %identity.user_id, error = %e, "Get current user error");
            ApiError::internal("Failed to fetch user")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// PATCH /api/users/me - partial profile update (name, email, metadata)
pub async fn update_profile(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<User> {
    let Some(Extension(identity)) = identity else {
        return Err(ApiError::unauthorized("User not authenticated"));
    };
    let Json(update) = payload?;

    let user = state
        .users
        .update_user(&identity.user_id, update)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %identity.user_id, error = %e, "Update profile error");
            ApiError::internal("Failed to update profile")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %identity.user_id, session_id = %identity.session_id, "Profile updated");
    Ok(ApiResponse::success(user).with_message("Profile updated successfully"))
}

/// GET /api/users/:id
pub async fn get_user_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state
        .users
        .get_user_by_id(&id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %id, error = %e, "Get user by ID error");
            ApiError::internal("Failed to fetch user")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}
