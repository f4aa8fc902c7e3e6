//! Stick, switch and battery sampling on the RP2350B ADC.

use embassy_rp::adc::{self, Adc, Blocking};
use embassy_rp::gpio::Input;
use link_core::{Axis, ControlInputs, Switches};

/// Widen a 12-bit conversion to the full 16-bit range.
///
/// The top bits are replicated into the low nibble so 0xFFF maps to 0xFFFF.
#[inline]
const fn scale_to_u16(raw: u16) -> u16 {
    let raw = raw & 0x0FFF;
    (raw << 4) | (raw >> 8)
}

/// Input source backed by blocking one-shot ADC conversions.
///
/// Channels are held in [`Axis::ALL`] order so an axis indexes its channel
/// directly.
pub struct AdcInputs<'d> {
    adc: Adc<'d, Blocking>,
    sticks: [adc::Channel<'d>; 4],
    battery: adc::Channel<'d>,
    switch1: Input<'d>,
    switch2: Input<'d>,
}

impl<'d> AdcInputs<'d> {
    pub fn new(
        adc: Adc<'d, Blocking>,
        sticks: [adc::Channel<'d>; 4],
        battery: adc::Channel<'d>,
        switch1: Input<'d>,
        switch2: Input<'d>,
    ) -> Self {
        Self {
            adc,
            sticks,
            battery,
            switch1,
            switch2,
        }
    }
}

impl ControlInputs for AdcInputs<'_> {
    type Error = adc::Error;

    fn read_axis(&mut self, axis: Axis) -> Result<u16, Self::Error> {
        let raw = self.adc.blocking_read(&mut self.sticks[axis.index()])?;
        Ok(scale_to_u16(raw))
    }

    fn read_switches(&mut self) -> Result<Switches, Self::Error> {
        Ok(Switches::new(self.switch1.is_high(), self.switch2.is_high()))
    }

    fn read_battery(&mut self) -> Result<u16, Self::Error> {
        let raw = self.adc.blocking_read(&mut self.battery)?;
        Ok(scale_to_u16(raw))
    }
}
