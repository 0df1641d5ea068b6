use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Employee, Payment, WorkRecord};

// Per-employee summary of unpaid work, computed fresh per request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusSummary {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub has_payment: bool,
    pub payment_status: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub total_kilograms: f64,
    pub pending_kilograms: f64,
    pub has_new_records_after_payment: bool,
}

// Compute one summary per employee, in input order. Pure function over
// snapshots the caller already loaded: no storage access, no clock.
//
// The watermark is the paid_at of the latest payment, latest meaning highest
// created_at regardless of status. A PENDING payment carries no paid_at, so
// it never advances the watermark and all records stay pending.
pub fn payment_status_summaries(
    employees: &[Employee],
    work_records: &[WorkRecord],
    payments: &[Payment],
) -> Vec<PaymentStatusSummary> {
    // group records once up front instead of rescanning per employee
    let mut records_by_employee: HashMap<Uuid, Vec<&WorkRecord>> = HashMap::new();
    for record in work_records {
        records_by_employee
            .entry(record.employee_id)
            .or_default()
            .push(record);
    }

    let mut latest_by_employee: HashMap<Uuid, &Payment> = HashMap::new();
    for payment in payments {
        latest_by_employee
            .entry(payment.employee_id)
            .and_modify(|latest| {
                if payment.created_at > latest.created_at {
                    *latest = payment;
                }
            })
            .or_insert(payment);
    }

    employees
        .iter()
        .map(|employee| {
            let records: &[&WorkRecord] = records_by_employee
                .get(&employee.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let latest = latest_by_employee.get(&employee.id).copied();

            let total_kilograms: f64 = records.iter().map(|r| r.kilograms).sum();

            let (pending_kilograms, pending_count) = match latest.and_then(|p| p.paid_at) {
                Some(paid_at) => {
                    // only records created strictly after the payment count
                    let pending = records.iter().filter(|r| r.created_at > paid_at);
                    let mut sum = 0.0;
                    let mut count = 0;
                    for record in pending {
                        sum += record.kilograms;
                        count += 1;
                    }
                    (sum, count)
                }
                None => (total_kilograms, records.len()),
            };

            PaymentStatusSummary {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                has_payment: latest.is_some(),
                payment_status: latest
                    .map(|p| p.status.as_str().to_string())
                    .unwrap_or_else(|| "NONE".to_string()),
                last_payment_date: latest.map(|p| p.created_at),
                paid_at: latest.and_then(|p| p.paid_at),
                total_kilograms,
                pending_kilograms,
                has_new_records_after_payment: pending_count > 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentState;
    use chrono::TimeZone;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn employee(name: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.to_string(),
            special_notes: None,
            is_active: true,
            created_by: Uuid::new_v4(),
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn record(employee_id: Uuid, kilograms: f64, created_at: DateTime<Utc>) -> WorkRecord {
        WorkRecord {
            id: Uuid::new_v4(),
            employee_id,
            kilograms,
            date: created_at,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at,
            updated_at: created_at,
        }
    }

    fn payment(
        employee_id: Uuid,
        status: PaymentState,
        created_at: DateTime<Utc>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            employee_id,
            amount: 100.0,
            status,
            notes: None,
            created_by: Uuid::new_v4(),
            created_at,
            paid_at,
        }
    }

    #[test]
    fn employee_without_records_gets_zeroed_summary() {
        let e = employee("Kamal");
        let summaries = payment_status_summaries(&[e.clone()], &[], &[]);

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.employee_id, e.id);
        assert_eq!(summary.total_kilograms, 0.0);
        assert_eq!(summary.pending_kilograms, 0.0);
        assert!(!summary.has_new_records_after_payment);
        assert!(!summary.has_payment);
        assert_eq!(summary.payment_status, "NONE");
    }

    #[test]
    fn no_payment_means_everything_pending() {
        let e = employee("Nimal");
        let records = vec![record(e.id, 10.0, ts(1)), record(e.id, 5.0, ts(2))];

        let summaries = payment_status_summaries(&[e], &records, &[]);
        assert_eq!(summaries[0].total_kilograms, 15.0);
        assert_eq!(summaries[0].pending_kilograms, 15.0);
        assert!(summaries[0].has_new_records_after_payment);
    }

    #[test]
    fn paid_watermark_splits_records() {
        let e = employee("Sunil");
        // 10kg at t1, payment paid at t2, 5kg at t3
        let records = vec![record(e.id, 10.0, ts(1)), record(e.id, 5.0, ts(3))];
        let payments = vec![payment(e.id, PaymentState::Paid, ts(2), Some(ts(2)))];

        let summaries = payment_status_summaries(&[e], &records, &payments);
        let summary = &summaries[0];
        assert_eq!(summary.total_kilograms, 15.0);
        assert_eq!(summary.pending_kilograms, 5.0);
        assert!(summary.has_new_records_after_payment);
        assert_eq!(summary.payment_status, "PAID");
        assert_eq!(summary.paid_at, Some(ts(2)));
    }

    #[test]
    fn pending_payment_without_paid_at_leaves_everything_pending() {
        let e = employee("Saman");
        let records = vec![record(e.id, 10.0, ts(1)), record(e.id, 5.0, ts(3))];
        let payments = vec![payment(e.id, PaymentState::Pending, ts(2), None)];

        let summaries = payment_status_summaries(&[e], &records, &payments);
        let summary = &summaries[0];
        assert_eq!(summary.total_kilograms, 15.0);
        assert_eq!(summary.pending_kilograms, 15.0);
        assert!(summary.has_payment);
        assert_eq!(summary.payment_status, "PENDING");
    }

    #[test]
    fn latest_payment_picked_by_creation_time() {
        let e = employee("Ruwan");
        let records = vec![record(e.id, 10.0, ts(1)), record(e.id, 5.0, ts(30))];
        // a newer PENDING payment shadows the older PAID one, so the
        // watermark never applies and everything counts as pending
        let payments = vec![
            payment(e.id, PaymentState::Paid, ts(10), Some(ts(20))),
            payment(e.id, PaymentState::Pending, ts(25), None),
        ];

        let summaries = payment_status_summaries(&[e], &records, &payments);
        let summary = &summaries[0];
        assert_eq!(summary.payment_status, "PENDING");
        assert_eq!(summary.last_payment_date, Some(ts(25)));
        assert_eq!(summary.pending_kilograms, 15.0);
    }

    #[test]
    fn one_summary_per_employee_in_input_order() {
        let a = employee("A");
        let b = employee("B");
        let records = vec![record(b.id, 7.5, ts(1))];

        let summaries = payment_status_summaries(&[a.clone(), b.clone()], &records, &[]);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].employee_id, a.id);
        assert_eq!(summaries[1].employee_id, b.id);
        assert_eq!(summaries[0].total_kilograms, 0.0);
        assert_eq!(summaries[1].total_kilograms, 7.5);
    }

    #[test]
    fn recomputing_on_same_inputs_is_identical() {
        let e = employee("Tharindu");
        let records = vec![record(e.id, 12.0, ts(1)), record(e.id, 3.0, ts(5))];
        let payments = vec![payment(e.id, PaymentState::Paid, ts(3), Some(ts(3)))];

        let first = payment_status_summaries(&[e.clone()], &records, &payments);
        let second = payment_status_summaries(&[e], &records, &payments);
        assert_eq!(first, second);
    }
}
