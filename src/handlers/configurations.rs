use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{Configuration, SetConfigurationRequest};
use crate::state::AppState;

use super::enforce_rate_limit;

// GET /api/configurations
pub async fn list_configurations_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/configurations")?;

    authenticate(&state, &headers)?;

    let configurations = state.store.configurations_sorted();
    Ok(Json(json!({ "configurations": configurations })))
}

// POST /api/configurations - upsert by key
pub async fn set_configuration_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SetConfigurationRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/configurations")?;

    authenticate(&state, &headers)?;

    if payload.key.is_empty() {
        return Err(ApiError::Validation("Configuration key is required".to_string()));
    }

    let now = Utc::now();
    let configuration = state
        .store
        .configurations
        .entry(payload.key.clone())
        .and_modify(|c| {
            c.value = payload.value.clone();
            c.updated_at = now;
        })
        .or_insert(Configuration {
            key: payload.key,
            value: payload.value,
            created_at: now,
            updated_at: now,
        })
        .clone();

    Ok(Json(json!({
        "message": "Configuration saved successfully",
        "configuration": configuration,
    })))
}
