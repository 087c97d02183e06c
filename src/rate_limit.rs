//! Process-local fixed-window rate limiter.
//!
//! Each identifier owns one window. The first call (or the first call after
//! the window has expired) opens a new window with a count of one; every
//! other call increments the count. A call is allowed while the count stays
//! within the limit, so the call that crosses the limit is itself rejected
//! and the identifier stays rejected until its window resets.
//!
//! State lives in this struct only. Multiple instances of the service do not
//! share counters.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tokio::task::JoinHandle;
use tracing::debug;

/// Distinct identifiers tracked before an inline sweep runs.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    records: Mutex<HashMap<String, RateLimitRecord>>,
    max_entries: usize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// Returns `true` if the call is within the limit for `identifier`.
    pub fn check(&self, identifier: &str, max_attempts: u32, window: Duration) -> bool {
        self.check_at(identifier, max_attempts, window, Instant::now())
    }

    pub fn check_at(
        &self,
        identifier: &str,
        max_attempts: u32,
        window: Duration,
        now: Instant,
    ) -> bool {
        let mut records = self.lock();

        let count = match records.get_mut(identifier) {
            Some(record) if now > record.reset_at => {
                record.count = 1;
                record.reset_at = now + window;
                record.count
            }
            Some(record) => {
                record.count = record.count.saturating_add(1);
                record.count
            }
            None => {
                records.insert(
                    identifier.to_owned(),
                    RateLimitRecord {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                1
            }
        };

        if records.len() > self.max_entries {
            // Drop windows that ended more than one window ago.
            if let Some(oldest_allowed) = now.checked_sub(window) {
                let before = records.len();
                records.retain(|_, r| r.reset_at >= oldest_allowed);
                debug!(removed = before - records.len(), "rate limiter inline sweep");
            }
        }

        count <= max_attempts
    }

    /// Removes every record whose window has already ended.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, r| r.reset_at >= now);
        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically sweeps expired records until the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let removed = limiter.sweep_expired(Instant::now());
                if removed > 0 {
                    debug!(removed, remaining = limiter.len(), "rate limiter sweep");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitRecord>> {
        // A panic while holding the lock cannot leave a record half-written.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
