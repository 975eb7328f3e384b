use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::gate::GateError;

/// Sliding-log rate limiter keyed by source IP. Each key holds the
/// timestamps of its admitted requests inside the trailing window; denied
/// requests are not recorded, so only admitted traffic consumes the quota.
pub struct SlidingWindow {
    window: Duration,
    max_requests: usize,
    hits: RwLock<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindow {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            hits: RwLock::new(HashMap::new()),
        }
    }

    /// Check the key's window and record the request if admitted. Check and
    /// record happen under one write guard, so concurrent requests from the
    /// same source cannot slip past the cap or lose increments.
    pub fn try_admit(&self, key: &str) -> Result<bool, GateError> {
        let now = Instant::now();
        let mut hits = self.hits.write().map_err(|_| GateError::LimiterPoisoned)?;
        let stamps = hits.entry(key.to_string()).or_default();
        stamps.retain(|&t| now.duration_since(t) < self.window);
        if stamps.len() >= self.max_requests {
            return Ok(false);
        }
        stamps.push(now);
        Ok(true)
    }

    /// Drop keys whose entries have all aged out of the window.
    pub fn sweep(&self) {
        let now = Instant::now();
        if let Ok(mut hits) = self.hits.write() {
            hits.retain(|_, stamps| {
                stamps.retain(|&t| now.duration_since(t) < self.window);
                !stamps.is_empty()
            });
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.hits.read().map(|h| h.len()).unwrap_or(0)
    }
}
