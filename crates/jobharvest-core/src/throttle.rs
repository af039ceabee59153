//! Jittered politeness delays between requests.
//!
//! Every fetch in a run is followed by a [`Pacer::pause`], a sleep drawn
//! uniformly from a [`JitterRange`]. Requests are strictly sequential, so
//! there is no per-domain bookkeeping: the pause alone spaces them out.

use std::time::Duration;

use rand::Rng;

use crate::config::JitterRange;

/// Sleeps a random duration within its range.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    range: JitterRange,
}

impl Pacer {
    pub fn new(range: JitterRange) -> Self {
        Self { range }
    }

    /// A pacer that never sleeps.
    pub fn none() -> Self {
        Self::new(JitterRange::none())
    }

    /// Draw the next delay, uniform in `[min, max]`.
    pub fn next_delay(&self) -> Duration {
        let min = self.range.min.as_millis() as u64;
        let max = self.range.max.as_millis() as u64;
        if max <= min {
            return self.range.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        tracing::debug!(sleep_ms = %delay.as_millis(), "Pacing request");
        tokio::time::sleep(delay).await;
    }
}
