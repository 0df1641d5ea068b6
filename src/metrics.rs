use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("areca_requests_total", "Total number of API requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "areca_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "areca_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref ACTIVE_SESSIONS: Gauge =
        register_gauge!("areca_active_sessions", "Currently active login sessions").unwrap();
}
