//! Fixed-window rate limiting.
//!
//! An injected component with its own lifecycle: construct one per surface
//! that needs it and share it explicitly, never through process globals.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

const DEFAULT_WINDOW: Duration = Duration::from_secs(30);
const DEFAULT_MAX: u32 = 20;

/// Verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Fixed-window counter per key (typically the shop domain).
#[derive(Debug)]
pub struct RateLimiter {
    window: chrono::Duration,
    max: u32,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            window: chrono::Duration::from_std(window).unwrap_or(chrono::Duration::seconds(30)),
            max,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request against `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Utc::now();
        let mut buckets = self.buckets.lock().unwrap();

        match buckets.get_mut(key) {
            Some(bucket) if bucket.reset_at >= now => {
                if bucket.count >= self.max {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: bucket.reset_at,
                    };
                }
                bucket.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: self.max.saturating_sub(bucket.count),
                    reset_at: bucket.reset_at,
                }
            }
            // Missing or expired bucket: start a fresh window.
            _ => {
                let reset_at = now + self.window;
                buckets.insert(key.to_string(), Bucket { count: 1, reset_at });
                RateLimitDecision {
                    allowed: true,
                    remaining: self.max.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }
}
