use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::authenticate;
use crate::error::ApiResult;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{Dispatch, Employee, Payment, PaymentState, WorkRecord};
use crate::state::AppState;

use super::enforce_rate_limit;

const DEFAULT_PAYMENT_RATE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_employees: usize,
    pub active_employees: usize,
    pub total_work_records: usize,
    pub total_kilograms: f64,
    pub today_kilograms: f64,
    pub total_dispatched_kg: f64,
    pub payment_rate: f64,
    pub total_paid: f64,
    pub pending_payment_amount: f64,
}

// Aggregates for the dashboard view. Pure over the loaded snapshots; the
// caller supplies today's date so the computation stays clock-free.
fn dashboard_metrics(
    employees: &[Employee],
    work_records: &[WorkRecord],
    payments: &[Payment],
    dispatches: &[Dispatch],
    payment_rate: f64,
    today: NaiveDate,
) -> DashboardMetrics {
    let total_kilograms: f64 = work_records.iter().map(|r| r.kilograms).sum();
    let today_kilograms: f64 = work_records
        .iter()
        .filter(|r| r.date.date_naive() == today)
        .map(|r| r.kilograms)
        .sum();
    let total_paid: f64 = payments
        .iter()
        .filter(|p| p.status == PaymentState::Paid)
        .map(|p| p.amount)
        .sum();

    DashboardMetrics {
        total_employees: employees.len(),
        active_employees: employees.iter().filter(|e| e.is_active).count(),
        total_work_records: work_records.len(),
        total_kilograms,
        today_kilograms,
        total_dispatched_kg: dispatches.iter().map(|d| d.dispatched_kg).sum(),
        payment_rate,
        total_paid,
        pending_payment_amount: total_kilograms * payment_rate - total_paid,
    }
}

// GET /api/dashboard
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    REQUEST_TOTAL.inc();
    enforce_rate_limit(&state.limiters.api, &headers, "/api/dashboard")?;

    let user = authenticate(&state, &headers)?;
    let start_time = Instant::now();

    let employees = state.store.employees_for(user.id);
    let work_records = state.store.work_records_for(user.id);
    let payments = state.store.payments_for(user.id);
    let dispatches = state.store.dispatches_for(user.id);

    let payment_rate = state
        .store
        .configurations
        .get("payment_rate_per_kg")
        .and_then(|c| c.value.parse::<f64>().ok())
        .unwrap_or(DEFAULT_PAYMENT_RATE);

    let metrics = dashboard_metrics(
        &employees,
        &work_records,
        &payments,
        &dispatches,
        payment_rate,
        Utc::now().date_naive(),
    );

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(json!({ "dashboard": metrics })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use uuid::Uuid;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn record(kilograms: f64, date: DateTime<Utc>) -> WorkRecord {
        WorkRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            kilograms,
            date,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: date,
            updated_at: date,
        }
    }

    fn paid_payment(amount: f64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            amount,
            status: PaymentState::Paid,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at: ts(0),
            paid_at: Some(ts(0)),
        }
    }

    #[test]
    fn pending_amount_is_rate_minus_paid() {
        let records = vec![record(10.0, ts(0)), record(20.0, ts(1))];
        let payments = vec![paid_payment(500.0)];

        let metrics = dashboard_metrics(&[], &records, &payments, &[], 50.0, ts(0).date_naive());
        assert_eq!(metrics.total_kilograms, 30.0);
        assert_eq!(metrics.total_paid, 500.0);
        // 30kg * 50/kg - 500 paid
        assert_eq!(metrics.pending_payment_amount, 1000.0);
    }

    #[test]
    fn today_filter_only_counts_matching_dates() {
        let today = ts(0).date_naive();
        let records = vec![
            record(5.0, ts(0)),
            record(7.0, ts(0) + chrono::Duration::days(1)),
        ];

        let metrics = dashboard_metrics(&[], &records, &[], &[], 50.0, today);
        assert_eq!(metrics.today_kilograms, 5.0);
        assert_eq!(metrics.total_kilograms, 12.0);
    }
}
