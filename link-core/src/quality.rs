//! Moving-average link quality filter.
//!
//! Every radio interrupt contributes one sample: [`SAMPLE_FAILURE`] when the
//! radio gave up retransmitting, [`SAMPLE_SUCCESS`] when a packet was acked,
//! or the previous sample again for events that say nothing about the
//! transmit path. The filter averages the last `N` samples, so the result is
//! a 0-100 success percentage over the last `N` events.

/// Sample recorded when the transmitter exhausted its retransmits.
pub const SAMPLE_FAILURE: u8 = 0;

/// Sample recorded when a transmitted packet was acknowledged.
pub const SAMPLE_SUCCESS: u8 = 100;

/// Default window length (events, not time).
pub const QUALITY_WINDOW: usize = 256;

/// Fixed-window moving average over a ring buffer.
///
/// `sum` always equals the sum of `samples`; the average is `sum / N` with
/// truncating integer division. Slots that have not been written yet hold
/// the seed value given at construction.
#[derive(Clone, Debug)]
pub struct SignalQualityFilter<const N: usize = QUALITY_WINDOW> {
    samples: [u8; N],
    sum: u32,
    pos: usize,
}

impl<const N: usize> SignalQualityFilter<N> {
    /// Filter whose window starts out full of failures.
    ///
    /// Quality ramps up from 0 as acked packets arrive, so the pilot never sees
    /// a good link that has not been demonstrated yet.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_seed(SAMPLE_FAILURE)
    }

    /// Filter whose window starts out full of `seed`.
    ///
    /// A zero-length window is rejected at compile time.
    #[must_use]
    pub const fn with_seed(seed: u8) -> Self {
        const { assert!(N > 0, "quality window must hold at least one sample") };
        Self {
            samples: [seed; N],
            sum: seed as u32 * N as u32,
            pos: 0,
        }
    }

    /// Push one sample and return the new average.
    pub fn update(&mut self, sample: u8) -> u8 {
        self.sum = self.sum - u32::from(self.samples[self.pos]) + u32::from(sample);
        self.samples[self.pos] = sample;
        self.pos = (self.pos + 1) % N;
        self.average()
    }

    /// Current average without pushing a sample.
    #[inline]
    #[must_use]
    pub fn average(&self) -> u8 {
        // Samples are at most 255 so the average always fits
        (self.sum / N as u32) as u8
    }

    /// Running sum of the window.
    #[inline]
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Slot the next sample will overwrite.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Window contents in slot order.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[u8; N] {
        &self.samples
    }
}

impl<const N: usize> Default for SignalQualityFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recomputed_sum<const N: usize>(filter: &SignalQualityFilter<N>) -> u32 {
        filter.samples().iter().map(|&s| u32::from(s)).sum()
    }

    #[test]
    fn test_constant_input_converges_after_window() {
        for value in [SAMPLE_FAILURE, 37, SAMPLE_SUCCESS] {
            let mut filter = SignalQualityFilter::<QUALITY_WINDOW>::new();
            let mut last = 0;
            for _ in 0..QUALITY_WINDOW {
                last = filter.update(value);
            }
            assert_eq!(last, value);
        }
    }

    #[test]
    fn test_all_zero_and_all_hundred_windows() {
        let zero = SignalQualityFilter::<QUALITY_WINDOW>::new();
        assert_eq!(zero.average(), 0);

        let full = SignalQualityFilter::<QUALITY_WINDOW>::with_seed(SAMPLE_SUCCESS);
        assert_eq!(full.average(), 100);
    }

    #[test]
    fn test_ramp_from_empty_window() {
        let mut filter = SignalQualityFilter::<4>::new();
        assert_eq!(filter.update(100), 25);
        assert_eq!(filter.update(100), 50);
        assert_eq!(filter.update(0), 50);
        assert_eq!(filter.update(100), 75);
        // Oldest sample (100) replaced by 0
        assert_eq!(filter.update(0), 50);
    }

    #[test]
    fn test_truncating_average() {
        let mut filter = SignalQualityFilter::<3>::new();
        filter.update(100);
        assert_eq!(filter.average(), 33);
    }

    #[test]
    fn test_single_slot_window_tracks_last_sample() {
        let mut filter = SignalQualityFilter::<1>::with_seed(SAMPLE_SUCCESS);
        assert_eq!(filter.average(), 100);
        assert_eq!(filter.update(SAMPLE_FAILURE), 0);
        assert_eq!(filter.update(SAMPLE_SUCCESS), 100);
        assert_eq!(filter.position(), 0);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut filter = SignalQualityFilter::<3>::new();
        for expected in [1, 2, 0, 1] {
            filter.update(1);
            assert_eq!(filter.position(), expected);
        }
    }

    #[test]
    fn test_sum_matches_buffer_contents() {
        let mut filter = SignalQualityFilter::<QUALITY_WINDOW>::with_seed(50);
        assert_eq!(filter.sum(), recomputed_sum(&filter));

        // Deterministic pseudo-random sequence of samples and carry-overs
        let mut state: u32 = 0x1234_5678;
        for _ in 0..(QUALITY_WINDOW * 3 + 17) {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let sample = match state % 3 {
                0 => SAMPLE_FAILURE,
                1 => SAMPLE_SUCCESS,
                _ => (state >> 8) as u8,
            };
            filter.update(sample);
            assert_eq!(filter.sum(), recomputed_sum(&filter));
        }
    }
}
