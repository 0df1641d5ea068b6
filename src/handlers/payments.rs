use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{
    CreatePaymentRequest, Employee, EmployeeRef, MarkPaidRequest, Payment, PaymentState,
    UpdatePaymentRequest,
};
use crate::payment_status::payment_status_summaries;
use crate::state::AppState;

use super::enforce_rate_limit;

fn with_employee(state: &AppState, payment: Payment) -> Value {
    let employee = state
        .store
        .employees
        .get(&payment.employee_id)
        .map(|e| EmployeeRef {
            id: e.id,
            name: e.name.clone(),
        });
    json!({
        "id": payment.id,
        "employeeId": payment.employee_id,
        "amount": payment.amount,
        "status": payment.status,
        "notes": payment.notes,
        "createdAt": payment.created_at,
        "paidAt": payment.paid_at,
        "employee": employee,
    })
}

// GET /api/payments
pub async fn list_payments_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments")?;

    let user = authenticate(&state, &headers)?;

    let payments: Vec<Value> = state
        .store
        .payments_for(user.id)
        .into_iter()
        .map(|p| with_employee(&state, p))
        .collect();

    Ok(Json(json!({ "payments": payments })))
}

// POST /api/payments
pub async fn create_payment_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments")?;

    let user = authenticate(&state, &headers)?;

    if !payload.amount.is_finite() || payload.amount < 0.0 {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }

    state
        .store
        .employee_for(user.id, payload.employee_id)
        .ok_or(ApiError::NotFound("Employee"))?;

    let payment = Payment {
        id: Uuid::new_v4(),
        employee_id: payload.employee_id,
        amount: payload.amount,
        status: PaymentState::Pending,
        notes: payload.notes,
        created_by: user.id,
        created_at: Utc::now(),
        paid_at: None,
    };
    state.store.payments.insert(payment.id, payment.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Payment created successfully",
            "payment": with_employee(&state, payment),
        })),
    ))
}

// GET /api/payments/{id}
pub async fn get_payment_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments/id")?;

    let user = authenticate(&state, &headers)?;

    let payment = state
        .store
        .payment_for(user.id, id)
        .ok_or(ApiError::NotFound("Payment"))?;

    Ok(Json(json!({ "payment": with_employee(&state, payment) })))
}

// PUT /api/payments/{id}
pub async fn update_payment_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments/id")?;

    let user = authenticate(&state, &headers)?;

    state
        .store
        .payment_for(user.id, id)
        .ok_or(ApiError::NotFound("Payment"))?;

    let mut entry = state
        .store
        .payments
        .get_mut(&id)
        .ok_or(ApiError::NotFound("Payment"))?;
    entry.status = payload.status;
    if payload.notes.is_some() {
        entry.notes = payload.notes;
    }
    // marking as paid stamps the watermark the reconciliation cuts on
    if payload.status == PaymentState::Paid {
        entry.paid_at = Some(Utc::now());
    }
    let updated = entry.clone();
    drop(entry);

    Ok(Json(json!({
        "message": "Payment updated successfully",
        "payment": with_employee(&state, updated),
    })))
}

// GET /api/payments/status - reconciliation over the caller's full data set
pub async fn payment_status_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments/status")?;

    let user = authenticate(&state, &headers)?;
    let start_time = Instant::now();

    // load all three collections once, then compute over the snapshots
    let employees: Vec<Employee> = state
        .store
        .employees_for(user.id)
        .into_iter()
        .filter(|e| e.is_active)
        .collect();
    let work_records = state.store.work_records_for(user.id);
    let payments = state.store.payments_for(user.id);

    let summaries = payment_status_summaries(&employees, &work_records, &payments);

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(json!({ "paymentStatus": summaries })))
}

// POST /api/payments/status - mark an employee as paid
pub async fn mark_paid_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<MarkPaidRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/payments/status")?;

    let user = authenticate(&state, &headers)?;

    if !payload.amount.is_finite() || payload.amount < 0.0 {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }

    state
        .store
        .employee_for(user.id, payload.employee_id)
        .ok_or(ApiError::NotFound("Employee"))?;

    let now = Utc::now();
    let payment = Payment {
        id: Uuid::new_v4(),
        employee_id: payload.employee_id,
        amount: payload.amount,
        status: PaymentState::Paid,
        notes: payload.notes,
        created_by: user.id,
        created_at: now,
        paid_at: Some(now),
    };
    state.store.payments.insert(payment.id, payment.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee marked as paid",
            "payment": with_employee(&state, payment),
        })),
    ))
}
