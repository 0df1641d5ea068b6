use dashmap::DashMap;
use std::time::{Duration, Instant};

// Limiter config - one per endpoint class
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max: u32,
    pub message: &'static str,
}

// Rate limit entry - tracks requests per client/route key
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { retry_after_secs: u64 },
}

// Fixed-window request counter. Each limiter owns its own bucket store, so
// endpoint classes get independent quotas and tests get isolated instances.
// Fixed windows tolerate a burst of up to 2*max across a window boundary,
// which is fine for abuse deterrence.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<String, RateLimitEntry>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    pub fn message(&self) -> &'static str {
        self.config.message
    }

    // Check the quota for a key right now
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    // Check with an explicit clock
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        // drop buckets whose window has passed so idle keys don't pile up
        self.buckets.retain(|_, entry| entry.reset_at >= now);

        let mut entry = self
            .buckets
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                reset_at: now + self.config.window,
            });

        // window expired? start a fresh one
        if entry.reset_at <= now {
            entry.count = 1;
            entry.reset_at = now + self.config.window;
            return Decision::Allow;
        }

        // under the limit? count it
        if entry.count < self.config.max {
            entry.count += 1;
            return Decision::Allow;
        }

        // over the limit
        let remaining = entry.reset_at.saturating_duration_since(now);
        Decision::Deny {
            retry_after_secs: remaining.as_millis().div_ceil(1000) as u64,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_ms: u64, max: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            window: Duration::from_millis(window_ms),
            max,
            message: "too many requests",
        })
    }

    #[test]
    fn allows_up_to_max_then_denies() {
        let limiter = limiter(60_000, 5);
        let now = Instant::now();

        for _ in 0..5 {
            assert_eq!(limiter.check_at("1.2.3.4:/api/employees", now), Decision::Allow);
        }
        assert!(matches!(
            limiter.check_at("1.2.3.4:/api/employees", now),
            Decision::Deny { .. }
        ));
    }

    #[test]
    fn window_expiry_starts_fresh_count() {
        let limiter = limiter(1_000, 2);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("k", t0), Decision::Allow);
        assert_eq!(limiter.check_at("k", t0), Decision::Allow);
        assert!(matches!(limiter.check_at("k", t0), Decision::Deny { .. }));

        // past the reset point the count restarts at 1, so two more fit
        let t1 = t0 + Duration::from_millis(1_001);
        assert_eq!(limiter.check_at("k", t1), Decision::Allow);
        assert_eq!(limiter.check_at("k", t1), Decision::Allow);
        assert!(matches!(limiter.check_at("k", t1), Decision::Deny { .. }));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let limiter = limiter(60_000, 2);
        let now = Instant::now();

        assert_eq!(limiter.check_at("a:/login", now), Decision::Allow);
        assert_eq!(limiter.check_at("a:/login", now), Decision::Allow);
        assert!(matches!(limiter.check_at("a:/login", now), Decision::Deny { .. }));

        // same address, different route - separate bucket
        assert_eq!(limiter.check_at("a:/register", now), Decision::Allow);
        // different address, same route
        assert_eq!(limiter.check_at("b:/login", now), Decision::Allow);
    }

    #[test]
    fn retry_after_is_bounded_by_window() {
        let limiter = limiter(5_000, 1);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("k", t0), Decision::Allow);
        match limiter.check_at("k", t0 + Duration::from_millis(1)) {
            Decision::Deny { retry_after_secs } => {
                assert!(retry_after_secs <= 5);
            }
            Decision::Allow => panic!("expected deny"),
        }

        // right before reset the hint rounds up to one second
        match limiter.check_at("k", t0 + Duration::from_millis(4_900)) {
            Decision::Deny { retry_after_secs } => assert_eq!(retry_after_secs, 1),
            Decision::Allow => panic!("expected deny"),
        }
    }

    #[test]
    fn boundary_scenario_two_per_second() {
        let limiter = limiter(1_000, 2);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("k", t0), Decision::Allow);
        assert_eq!(limiter.check_at("k", t0 + Duration::from_millis(100)), Decision::Allow);
        assert_eq!(
            limiter.check_at("k", t0 + Duration::from_millis(900)),
            Decision::Deny { retry_after_secs: 1 }
        );
        // window rolled over, fresh count
        assert_eq!(limiter.check_at("k", t0 + Duration::from_millis(1_100)), Decision::Allow);
    }

    #[test]
    fn expired_buckets_are_swept() {
        let limiter = limiter(1_000, 2);
        let t0 = Instant::now();

        limiter.check_at("a", t0);
        limiter.check_at("b", t0);
        assert_eq!(limiter.bucket_count(), 2);

        // a check on any key sweeps every expired bucket
        limiter.check_at("c", t0 + Duration::from_millis(2_000));
        assert_eq!(limiter.bucket_count(), 1);
    }
}
