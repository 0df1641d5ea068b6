use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{
    CreateWorkRecordRequest, EmployeeRef, UpdateWorkRecordRequest, WorkRecord,
};
use crate::state::AppState;

use super::enforce_rate_limit;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecordListQuery {
    pub employee_id: Option<Uuid>,
    pub date: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

// Accepts plain dates and full RFC 3339 datetimes, like the original API
fn parse_record_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::Validation("Invalid date format. Use YYYY-MM-DD or ISO datetime".to_string())
        })
}

fn validate_kilograms(kilograms: f64) -> Result<(), ApiError> {
    if !kilograms.is_finite() || kilograms < 0.0 {
        return Err(ApiError::Validation("Kilograms must be positive".to_string()));
    }
    if kilograms > 9999.999 {
        return Err(ApiError::Validation(
            "Kilograms must be less than 10000".to_string(),
        ));
    }
    Ok(())
}

fn with_employee(state: &AppState, record: WorkRecord) -> Value {
    let employee = state
        .store
        .employees
        .get(&record.employee_id)
        .map(|e| EmployeeRef {
            id: e.id,
            name: e.name.clone(),
        });
    json!({
        "id": record.id,
        "employeeId": record.employee_id,
        "kilograms": record.kilograms,
        "date": record.date,
        "notes": record.notes,
        "createdAt": record.created_at,
        "updatedAt": record.updated_at,
        "employee": employee,
    })
}

// GET /api/work-records
pub async fn list_work_records_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WorkRecordListQuery>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.work_records, &headers, "/api/work-records")?;

    let user = authenticate(&state, &headers)?;

    let mut records = state.store.work_records_for(user.id);

    if let Some(employee_id) = query.employee_id {
        records.retain(|r| r.employee_id == employee_id);
    }
    if let Some(date) = query.date.as_deref() {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ApiError::Validation("Invalid date format. Use YYYY-MM-DD".to_string())
        })?;
        records.retain(|r| r.date.date_naive() == day);
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).max(1);
    let total = records.len();
    let pages = total.div_ceil(limit);
    let records: Vec<Value> = records
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .map(|r| with_employee(&state, r))
        .collect();

    Ok(Json(json!({
        "workRecords": records,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": pages,
        },
    })))
}

// POST /api/work-records
pub async fn create_work_record_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateWorkRecordRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.work_records, &headers, "/api/work-records")?;

    let user = authenticate(&state, &headers)?;

    validate_kilograms(payload.kilograms)?;
    let date = parse_record_date(&payload.date)?;

    // the referenced employee must exist and belong to the caller
    state
        .store
        .employee_for(user.id, payload.employee_id)
        .ok_or(ApiError::NotFound("Employee"))?;

    let now = Utc::now();
    let record = WorkRecord {
        id: Uuid::new_v4(),
        employee_id: payload.employee_id,
        kilograms: payload.kilograms,
        date,
        notes: payload.notes,
        created_by: user.id,
        created_at: now,
        updated_at: now,
    };
    state.store.work_records.insert(record.id, record.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Work record created successfully",
            "workRecord": with_employee(&state, record),
        })),
    ))
}

// PUT /api/work-records/{id}
pub async fn update_work_record_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkRecordRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.work_records, &headers, "/api/work-records/id")?;

    let user = authenticate(&state, &headers)?;

    if let Some(kilograms) = payload.kilograms {
        validate_kilograms(kilograms)?;
    }
    let date = match payload.date.as_deref() {
        Some(raw) => Some(parse_record_date(raw)?),
        None => None,
    };

    state
        .store
        .work_record_for(user.id, id)
        .ok_or(ApiError::NotFound("Work record"))?;

    let mut entry = state
        .store
        .work_records
        .get_mut(&id)
        .ok_or(ApiError::NotFound("Work record"))?;
    if let Some(date) = date {
        entry.date = date;
    }
    if let Some(kilograms) = payload.kilograms {
        entry.kilograms = kilograms;
    }
    if payload.notes.is_some() {
        entry.notes = payload.notes;
    }
    entry.updated_at = Utc::now();
    let updated = entry.clone();
    drop(entry);

    Ok(Json(json!({
        "message": "Work record updated successfully",
        "workRecord": with_employee(&state, updated),
    })))
}

// DELETE /api/work-records/{id}
pub async fn delete_work_record_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.work_records, &headers, "/api/work-records/id")?;

    let user = authenticate(&state, &headers)?;

    state
        .store
        .work_record_for(user.id, id)
        .ok_or(ApiError::NotFound("Work record"))?;
    state.store.work_records.remove(&id);

    Ok(Json(json!({ "message": "Work record deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_date_parses_to_midnight_utc() {
        let parsed = parse_record_date("2025-03-10").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-03-10T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_datetime_parses() {
        let parsed = parse_record_date("2025-03-10T08:30:00Z").unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2025-03-10");
    }

    #[test]
    fn garbage_date_is_rejected() {
        assert!(parse_record_date("10/03/2025").is_err());
    }

    #[test]
    fn kilogram_bounds() {
        assert!(validate_kilograms(0.0).is_ok());
        assert!(validate_kilograms(9999.999).is_ok());
        assert!(validate_kilograms(-1.0).is_err());
        assert!(validate_kilograms(10_000.0).is_err());
        assert!(validate_kilograms(f64::NAN).is_err());
    }
}
