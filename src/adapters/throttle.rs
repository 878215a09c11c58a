use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces consecutive calls to one remote endpoint by a minimum delay, to
/// respect provider quotas. The delay is an explicit awaited sleep, so the
/// policy holds regardless of how the caller schedules its work.
pub struct Throttle {
    min_delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Wait until at least `min_delay` has passed since the previous call
    /// returned from this method. The first call never waits.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                tokio::time::sleep(self.min_delay - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
