//! Scheduler clock backed by the embassy time driver.

use embassy_time::Instant;
use link_core::Monotonic;

/// Microseconds since boot from the RP2350 timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    #[inline]
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}
