use axum::http::{HeaderMap, StatusCode};
use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{authenticate, bearer_token, generate_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::metrics::{ACTIVE_SESSIONS, REQUEST_TOTAL};
use crate::models::{LoginRequest, RegisterRequest, Role, User};
use crate::state::AppState;

use super::enforce_rate_limit;

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    if !payload.email.contains('@') || !payload.email.contains('.') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if payload.username.len() < 3 || payload.username.len() > 20 {
        return Err(ApiError::Validation(
            "Username must be between 3 and 20 characters".to_string(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

// POST /api/auth/register
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.auth, &headers, "/api/auth/register")?;

    validate_registration(&payload)?;

    if state.store.find_user_by_email(&payload.email).is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }
    if state
        .store
        .find_user_by_username(&payload.username)
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    // first account gets the admin role
    let role = if state.store.users.is_empty() {
        Role::Admin
    } else {
        Role::User
    };

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: payload.email,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password_hash: hash_password(&payload.password),
        role,
        avatar: None,
        created_at: now,
        updated_at: now,
    };
    state.store.users.insert(user.id, user.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

// POST /api/auth/login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.auth, &headers, "/api/auth/login")?;

    let user = state
        .store
        .find_user_by_email(&payload.email)
        .ok_or(ApiError::Unauthorized("Invalid email or password"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let token = generate_token();
    state.store.sessions.insert(token.clone(), user.id);
    ACTIVE_SESSIONS.set(state.store.sessions.len() as f64);

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}

// POST /api/auth/logout
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();

    let token = bearer_token(&headers)?;
    state.store.sessions.remove(token);
    ACTIVE_SESSIONS.set(state.store.sessions.len() as f64);

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

// GET /api/auth/me
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();

    let user = authenticate(&state, &headers)?;
    Ok(Json(json!({ "user": user })))
}
