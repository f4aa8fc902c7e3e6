//! Control input capability.

use core::fmt::Debug;

use crate::packet::Switches;
use crate::stick::Axis;

/// Trait for the sticks, switches and battery sense pin.
///
/// This abstracts the ADC and GPIO so the control cycle can run against real
/// hardware or a scripted source. Reads are short blocking conversions.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ControlInputs {
    /// ADC or GPIO error.
    type Error: Debug;

    /// Sample one stick, scaled to the full 16-bit range.
    fn read_axis(&mut self, axis: Axis) -> Result<u16, Self::Error>;

    fn read_switches(&mut self) -> Result<Switches, Self::Error>;

    /// Sample the transmitter battery sense pin, scaled to the full 16-bit range.
    fn read_battery(&mut self) -> Result<u16, Self::Error>;
}
