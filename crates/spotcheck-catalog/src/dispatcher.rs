// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};

/// Admission gate for outbound catalog calls.
///
/// Bounds in-flight requests with a semaphore (`max_concurrent` permits,
/// FIFO) and enforces a minimum spacing between the *starts* of successive
/// admitted calls. The spacing is stamped at admission, so a call that later
/// fails does not disturb the schedule of the next one.
#[derive(Debug, Clone)]
pub struct RateLimitedDispatcher {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    last_admitted: Arc<tokio::sync::Mutex<Option<Instant>>>,
}

/// Held for the duration of one catalog call; dropping it frees a
/// concurrency slot without touching the interval schedule.
#[derive(Debug)]
pub struct DispatchPermit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimitedDispatcher {
    /// Create a dispatcher admitting at most `max_concurrent` in-flight
    /// calls, with at least `min_interval` between admission times.
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            min_interval,
            last_admitted: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Wait until a call may start according to the rate limit.
    ///
    /// Returns a permit that must be held until the call completes.
    pub async fn admit(&self) -> DispatchPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed");

        let mut last = self.last_admitted.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!(
                    target: "catalog",
                    "rate limiting: waiting {:?}",
                    wait_time
                );
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());

        DispatchPermit { _permit: permit }
    }
}
