use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{CreateEmployeeRequest, Employee, UpdateEmployeeRequest};
use crate::state::AppState;

use super::enforce_rate_limit;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::Validation("Employee name is required".to_string()));
    }
    if name.len() > 100 {
        return Err(ApiError::Validation(
            "Name must be less than 100 characters".to_string(),
        ));
    }
    Ok(())
}

// GET /api/employees
pub async fn list_employees_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<EmployeeListQuery>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.employees, &headers, "/api/employees")?;

    let user = authenticate(&state, &headers)?;

    let mut employees = state.store.employees_for(user.id);

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        employees.retain(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.special_notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        });
    }
    if let Some(is_active) = query.is_active {
        employees.retain(|e| e.is_active == is_active);
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);
    let total = employees.len();
    let pages = total.div_ceil(limit);
    let employees: Vec<Employee> = employees
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Ok(Json(json!({
        "employees": employees,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "pages": pages,
        },
    })))
}

// POST /api/employees
pub async fn create_employee_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.employees, &headers, "/api/employees")?;

    let user = authenticate(&state, &headers)?;
    validate_name(&payload.name)?;

    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4(),
        name: payload.name,
        special_notes: payload.special_notes,
        is_active: true,
        created_by: user.id,
        created_at: now,
        updated_at: now,
    };
    state.store.employees.insert(employee.id, employee.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee created successfully",
            "employee": employee,
        })),
    ))
}

// GET /api/employees/{id}
pub async fn get_employee_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.employees, &headers, "/api/employees/id")?;

    let user = authenticate(&state, &headers)?;

    let employee = state
        .store
        .employee_for(user.id, id)
        .ok_or(ApiError::NotFound("Employee"))?;

    Ok(Json(json!({ "employee": employee })))
}

// PUT /api/employees/{id}
pub async fn update_employee_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.employees, &headers, "/api/employees/id")?;

    let user = authenticate(&state, &headers)?;

    if let Some(name) = payload.name.as_deref() {
        validate_name(name)?;
    }

    state
        .store
        .employee_for(user.id, id)
        .ok_or(ApiError::NotFound("Employee"))?;

    let mut entry = state
        .store
        .employees
        .get_mut(&id)
        .ok_or(ApiError::NotFound("Employee"))?;
    if let Some(name) = payload.name {
        entry.name = name;
    }
    if payload.special_notes.is_some() {
        entry.special_notes = payload.special_notes;
    }
    if let Some(is_active) = payload.is_active {
        entry.is_active = is_active;
    }
    entry.updated_at = Utc::now();
    let updated = entry.clone();
    drop(entry);

    Ok(Json(json!({
        "message": "Employee updated successfully",
        "employee": updated,
    })))
}

// DELETE /api/employees/{id}
pub async fn delete_employee_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.employees, &headers, "/api/employees/id")?;

    let user = authenticate(&state, &headers)?;

    state
        .store
        .employee_for(user.id, id)
        .ok_or(ApiError::NotFound("Employee"))?;
    state.store.employees.remove(&id);

    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}
