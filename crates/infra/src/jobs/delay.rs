//! Simulated processing latency.

use std::time::Duration;

/// Pause taken by the worker between applying a mutation and marking the
/// job completed. Tests use [`ProcessingDelay::none`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ProcessingDelay(Duration);

impl ProcessingDelay {
    pub fn none() -> Self {
        Self(Duration::ZERO)
    }

    pub fn fixed(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}
