mod auth;
mod configurations;
mod dashboard;
mod dispatch;
mod employees;
mod health;
mod metrics;
mod payments;
mod user;
mod work_records;

pub use auth::{login_handler, logout_handler, me_handler, register_handler};
pub use configurations::{list_configurations_handler, set_configuration_handler};
pub use dashboard::dashboard_handler;
pub use dispatch::{create_dispatch_handler, list_dispatches_handler};
pub use employees::{
    create_employee_handler, delete_employee_handler, get_employee_handler,
    list_employees_handler, update_employee_handler,
};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use payments::{
    create_payment_handler, get_payment_handler, list_payments_handler, mark_paid_handler,
    payment_status_handler, update_payment_handler,
};
pub use user::{
    change_password_handler, get_profile_handler, update_avatar_handler, update_profile_handler,
};
pub use work_records::{
    create_work_record_handler, delete_work_record_handler, list_work_records_handler,
    update_work_record_handler,
};

use axum::http::HeaderMap;

use crate::auth::client_ip;
use crate::error::ApiError;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::rate_limit::{Decision, RateLimiter};

// Rate limit pre-check shared by the guarded handlers. The key combines the
// client address with the route, so routes never share a bucket. On Deny the
// handler short-circuits before touching storage.
pub(crate) fn enforce_rate_limit(
    limiter: &RateLimiter,
    headers: &HeaderMap,
    route: &str,
) -> Result<(), ApiError> {
    let key = format!("{}:{}", client_ip(headers), route);
    match limiter.check(&key) {
        Decision::Allow => Ok(()),
        Decision::Deny { retry_after_secs } => {
            RATE_LIMITED_TOTAL.inc();
            Err(ApiError::RateLimited {
                message: limiter.message().to_string(),
                retry_after: retry_after_secs,
            })
        }
    }
}
