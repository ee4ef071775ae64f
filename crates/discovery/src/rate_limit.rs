//! Process-local fixed-window rate limiter.
//!
//! Counters are keyed by `(subject, resource)` and live in a bounded map.
//! Expired windows are swept when the map fills; if it is still full the
//! entry with the oldest window is evicted.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub subject: Uuid,
    pub resource: Uuid,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    capacity: usize,
    windows: Arc<Mutex<HashMap<RateLimitKey, Window>>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_capacity(limit, window, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(limit: u32, window: Duration, capacity: usize) -> Self {
        Self {
            limit,
            window,
            capacity: capacity.max(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a request and report whether it is within the limit.
    pub fn check(&self, key: RateLimitKey) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: RateLimitKey, now: Instant) -> bool {
        if self.limit == 0 {
            return false;
        }
        let mut windows = self.lock();

        if let Some(window) = windows.get_mut(&key) {
            if now.saturating_duration_since(window.started_at) >= self.window {
                *window = Window {
                    started_at: now,
                    count: 1,
                };
                return true;
            }
            if window.count >= self.limit {
                return false;
            }
            window.count += 1;
            return true;
        }

        if windows.len() >= self.capacity {
            Self::sweep_locked(&mut windows, self.window, now);
        }
        if windows.len() >= self.capacity {
            let oldest = windows
                .iter()
                .min_by_key(|(_, w)| w.started_at)
                .map(|(k, _)| *k);
            if let Some(oldest) = oldest {
                windows.remove(&oldest);
            }
        }

        windows.insert(
            key,
            Window {
                started_at: now,
                count: 1,
            },
        );
        true
    }

    /// Drop every window that has expired. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let mut windows = self.lock();
        Self::sweep_locked(&mut windows, self.window, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep_locked(
        windows: &mut HashMap<RateLimitKey, Window>,
        window: Duration,
        now: Instant,
    ) -> usize {
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        let removed = before - windows.len();
        if removed > 0 {
            tracing::debug!(removed, "swept expired rate limit windows");
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RateLimitKey, Window>> {
        // A poisoned map only holds counters; keep serving with its contents.
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }
}
