use std::time::Duration;

use crate::config::Args;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::store::Store;

// Per-endpoint-class limiter instances. Separate instances mean separate
// bucket stores, so exhausting one class never touches another. Auth gets a
// tight quota against credential stuffing; uploads a long window.
pub struct RateLimiters {
    pub auth: RateLimiter,
    pub api: RateLimiter,
    pub employees: RateLimiter,
    pub work_records: RateLimiter,
    pub uploads: RateLimiter,
}

// app's shared state
pub struct AppState {
    pub store: Store,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(args: &Args) -> Self {
        Self {
            store: Store::new(),
            limiters: RateLimiters {
                auth: RateLimiter::new(RateLimitConfig {
                    window: Duration::from_secs(args.auth_rate_window),
                    max: args.auth_rate_limit,
                    message: "Too many authentication attempts, please try again later",
                }),
                api: RateLimiter::new(RateLimitConfig {
                    window: Duration::from_secs(args.rate_window),
                    max: args.rate_limit,
                    message: "Too many API requests, please try again later",
                }),
                employees: RateLimiter::new(RateLimitConfig {
                    window: Duration::from_secs(5 * 60),
                    max: 30,
                    message: "Too many employee operations, please try again later",
                }),
                work_records: RateLimiter::new(RateLimitConfig {
                    window: Duration::from_secs(5 * 60),
                    max: 50,
                    message: "Too many work record operations, please try again later",
                }),
                uploads: RateLimiter::new(RateLimitConfig {
                    window: Duration::from_secs(60 * 60),
                    max: 20,
                    message: "Upload limit exceeded, please try again later",
                }),
            },
        }
    }
}
