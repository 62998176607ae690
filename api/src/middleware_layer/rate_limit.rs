//! Fixed-window admission control for the guide endpoint.
//!
//! Lives entirely in the HTTP layer: the pipeline never sees rejected
//! requests. Counters are in-memory per process; a multi-instance
//! deployment would need a shared backend behind the same trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{extract::{Request, State}, middleware::Next, response::Response};
use axum::response::IntoResponse;
use tracing::warn;

use crate::core::app_state::AppState;
use crate::error_handler::AppError;

/// Decides whether a request identified by `key` may proceed.
pub trait AdmissionControl: Send + Sync {
    fn allow(&self, key: &str) -> bool;
}

struct WindowSlot {
    window_start: Instant,
    count: u32,
}

/// In-memory fixed-window counter, one window per client key.
///
/// The window resets lazily on the first request after it expires; an idle
/// client costs nothing between requests.
pub struct FixedWindowLimiter {
    quota: u32,
    window: Duration,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl FixedWindowLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The production shape: `quota` requests per 60-second window.
    pub fn per_minute(quota: u32) -> Self {
        Self::new(quota, Duration::from_secs(60))
    }
}

impl AdmissionControl for FixedWindowLimiter {
    fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());

        let slot = slots.entry(key.to_string()).or_insert(WindowSlot {
            window_start: now,
            count: 0,
        });

        if now.duration_since(slot.window_start) >= self.window {
            slot.window_start = now;
            slot.count = 0;
        }

        if slot.count < self.quota {
            slot.count += 1;
            true
        } else {
            false
        }
    }
}

/// Axum middleware guarding the guide route.
///
/// The client key comes from the `x-client-id` header; callers that send
/// none share the "anonymous" bucket.
pub async fn admission_guard(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .headers()
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous");

    if state.limiter.allow(key) {
        next.run(req).await
    } else {
        warn!(client = %key, "request rejected by admission control");
        AppError::RateLimited.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_exactly_the_quota_within_one_window() {
        let limiter = FixedWindowLimiter::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.allow("alice"));
        }
        assert!(!limiter.allow("alice"));
        assert!(!limiter.allow("alice"));
    }

    #[test]
    fn keys_have_independent_budgets() {
        let limiter = FixedWindowLimiter::per_minute(1);
        assert!(limiter.allow("alice"));
        assert!(!limiter.allow("alice"));
        assert!(limiter.allow("bob"));
        assert!(limiter.allow("anonymous"));
    }

    #[test]
    fn budget_resets_in_the_next_window() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.allow("alice"));
        assert!(!limiter.allow("alice"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.allow("alice"));
    }
}
