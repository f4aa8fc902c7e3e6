//! Dual-rate cooperative scheduler.
//!
//! Two elapsed-time counters are polled on every loop iteration. When a
//! counter reaches its period the associated cycle runs and the counter is
//! restarted from the time the cycle *finished*, so a slow cycle stretches
//! its own period instead of bunching up.
//!
//! Nothing here blocks or sleeps; the caller owns the loop and decides how to
//! yield between polls.

/// Period of the control (sample and transmit) cycle.
pub const CONTROL_PERIOD_US: u64 = 10_001;

/// Period of the display refresh cycle.
pub const DISPLAY_PERIOD_US: u64 = 100_000;

/// Free-running microsecond clock.
pub trait Monotonic {
    fn now_us(&self) -> u64;
}

/// Work units driven by the scheduler.
pub trait CycleHandler {
    /// Sample inputs and transmit one packet.
    fn control_cycle(&mut self);

    /// Refresh the display.
    fn display_cycle(&mut self);
}

/// Elapsed-time counter with a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicTimer {
    period_us: u64,
    started_at_us: u64,
}

impl PeriodicTimer {
    #[must_use]
    pub const fn new(period_us: u64, now_us: u64) -> Self {
        Self {
            period_us,
            started_at_us: now_us,
        }
    }

    #[inline]
    #[must_use]
    pub const fn elapsed_us(&self, now_us: u64) -> u64 {
        now_us.wrapping_sub(self.started_at_us)
    }

    #[inline]
    #[must_use]
    pub const fn is_due(&self, now_us: u64) -> bool {
        self.elapsed_us(now_us) >= self.period_us
    }

    /// Restart the counter from `now_us`.
    #[inline]
    pub fn reset(&mut self, now_us: u64) {
        self.started_at_us = now_us;
    }

    #[inline]
    #[must_use]
    pub const fn period_us(&self) -> u64 {
        self.period_us
    }
}

/// Which cycles ran during one [`DualRateScheduler::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclesRun {
    pub control: bool,
    pub display: bool,
}

/// Fast control cycle plus slow display cycle on one thread.
pub struct DualRateScheduler<C> {
    clock: C,
    control: PeriodicTimer,
    display: PeriodicTimer,
}

impl<C: Monotonic> DualRateScheduler<C> {
    /// Scheduler with the standard periods.
    pub fn new(clock: C) -> Self {
        Self::with_periods(clock, CONTROL_PERIOD_US, DISPLAY_PERIOD_US)
    }

    /// Scheduler with custom periods. Both counters start now.
    pub fn with_periods(clock: C, control_period_us: u64, display_period_us: u64) -> Self {
        let now = clock.now_us();
        Self {
            clock,
            control: PeriodicTimer::new(control_period_us, now),
            display: PeriodicTimer::new(display_period_us, now),
        }
    }

    /// Check both counters once, running whichever cycles are due.
    ///
    /// The display check comes first; the control check reads the clock again
    /// so a long display refresh cannot hide an overdue control cycle.
    pub fn poll<H: CycleHandler>(&mut self, handler: &mut H) -> CyclesRun {
        let mut ran = CyclesRun::default();

        if self.display.is_due(self.clock.now_us()) {
            handler.display_cycle();
            self.display.reset(self.clock.now_us());
            ran.display = true;
        }

        if self.control.is_due(self.clock.now_us()) {
            handler.control_cycle();
            self.control.reset(self.clock.now_us());
            ran.control = true;
        }

        ran
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
