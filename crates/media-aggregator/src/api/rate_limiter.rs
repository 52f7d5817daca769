//! Rate limiter for the REST catalog provider.
//!
//! Enforces both per-second and per-minute rate limits. Callers queue on an
//! async mutex, so concurrent requests are paced in arrival order. A caller
//! that gives up while queued leaves no trace in the window.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct WindowState {
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    max_per_minute: usize,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            max_per_minute: max_per_minute.max(1) as usize,
            state: Mutex::new(WindowState::default()),
        }
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        state
            .recent_requests
            .retain(|&timestamp| now.duration_since(timestamp) < WINDOW);

        // Per-minute limit: wait until the oldest request leaves the window
        if state.recent_requests.len() >= self.max_per_minute {
            if let Some(&oldest) = state.recent_requests.front() {
                let wait_time = WINDOW.saturating_sub(now.duration_since(oldest));
                tracing::debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limit: waiting for per-minute limit"
                );
                sleep(wait_time).await;
                state.recent_requests.pop_front();
            }
        }

        // Per-second limit
        if let Some(last) = state.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis() as u64,
                    "Rate limit: waiting for per-second limit"
                );
                sleep(wait_time).await;
            }
        }

        let request_time = Instant::now();
        state.last_request = Some(request_time);
        state.recent_requests.push_back(request_time);
    }

    /// Like [`acquire`](Self::acquire), but give up after `max_wait`.
    ///
    /// Returns `false` when no slot was obtained in time.
    pub async fn acquire_within(&self, max_wait: Duration) -> bool {
        timeout(max_wait, self.acquire()).await.is_ok()
    }
}
