use axum::http::HeaderMap;
use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::auth::{authenticate, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{ChangePasswordRequest, UpdateAvatarRequest, UpdateProfileRequest};
use crate::state::AppState;

use super::enforce_rate_limit;

// GET /api/user/profile
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/user/profile")?;

    let user = authenticate(&state, &headers)?;
    Ok(Json(json!({ "user": user })))
}

// PUT /api/user/profile
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/user/profile")?;

    let user = authenticate(&state, &headers)?;

    let mut entry = state
        .store
        .users
        .get_mut(&user.id)
        .ok_or(ApiError::NotFound("User"))?;
    if payload.first_name.is_some() {
        entry.first_name = payload.first_name;
    }
    if payload.last_name.is_some() {
        entry.last_name = payload.last_name;
    }
    entry.updated_at = Utc::now();
    let updated = entry.clone();
    drop(entry);

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": updated,
    })))
}

// POST /api/user/change-password
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.auth, &headers, "/api/user/change-password")?;

    let user = authenticate(&state, &headers)?;

    if !verify_password(&payload.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Current password is incorrect"));
    }
    if payload.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "New password must be at least 8 characters".to_string(),
        ));
    }

    let mut entry = state
        .store
        .users
        .get_mut(&user.id)
        .ok_or(ApiError::NotFound("User"))?;
    entry.password_hash = hash_password(&payload.new_password);
    entry.updated_at = Utc::now();
    drop(entry);

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

// PUT /api/user/avatar
pub async fn update_avatar_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateAvatarRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.uploads, &headers, "/api/user/avatar")?;

    let user = authenticate(&state, &headers)?;

    if payload.avatar.is_empty() {
        return Err(ApiError::Validation("Avatar is required".to_string()));
    }

    let mut entry = state
        .store
        .users
        .get_mut(&user.id)
        .ok_or(ApiError::NotFound("User"))?;
    entry.avatar = Some(payload.avatar);
    entry.updated_at = Utc::now();
    let updated = entry.clone();
    drop(entry);

    Ok(Json(json!({
        "message": "Avatar updated successfully",
        "user": updated,
    })))
}
