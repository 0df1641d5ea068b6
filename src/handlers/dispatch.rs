use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{CreateDispatchRequest, Dispatch};
use crate::state::AppState;

use super::enforce_rate_limit;

fn parse_dispatch_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::Validation("Please select a dispatch date".to_string()))
}

// POST /api/dispatch
pub async fn create_dispatch_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateDispatchRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/dispatch")?;

    let user = authenticate(&state, &headers)?;

    if !payload.dispatched_kg.is_finite() || payload.dispatched_kg <= 0.0 {
        return Err(ApiError::Validation(
            "Please enter a valid dispatched amount".to_string(),
        ));
    }
    let dispatch_date = parse_dispatch_date(&payload.dispatch_date)?;

    let now = Utc::now();
    let dispatch = Dispatch {
        id: Uuid::new_v4(),
        user_id: user.id,
        dispatched_kg: payload.dispatched_kg,
        dispatch_date,
        dispatch_notes: payload.dispatch_notes.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    state.store.dispatches.insert(dispatch.id, dispatch.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Dispatch recorded successfully",
            "dispatch": dispatch,
        })),
    ))
}

// GET /api/dispatch
pub async fn list_dispatches_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/dispatch")?;

    let user = authenticate(&state, &headers)?;

    let dispatches = state.store.dispatches_for(user.id);
    Ok(Json(json!({ "dispatches": dispatches })))
}
