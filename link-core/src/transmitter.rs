//! Transmitter: ties inputs, link and display to the two scheduler cycles.

use crate::display::{Display, DisplayFrame};
use crate::fmt::Debug2Format;
use crate::input::ControlInputs;
use crate::link::LinkHandle;
use crate::packet::{ControlFrame, LinkPacket, Switches};
use crate::profile::TransmitterProfile;
use crate::scheduler::CycleHandler;
use crate::stick::{Axis, HALF_SCALE};
use crate::telemetry::{BacklightBlinker, DroneTelemetry};

/// Samples the sticks, transmits control packets and refreshes the display.
///
/// The control cycle is the only writer of the normalized stick values and
/// the display cycle only reads them. Both run on the same thread so no
/// locking is needed between them; link state written by the radio interrupt
/// is read through [`LinkHandle::snapshot`].
///
/// # Error Handling
///
/// An input error skips the transmission for that cycle and leaves the last
/// good stick values on screen. A battery read error keeps the last reading.
pub struct Transmitter<I, L, D> {
    profile: TransmitterProfile,
    inputs: I,
    link: L,
    display: D,
    /// Last normalized value per axis, in [`Axis::ALL`] order.
    normalized: [u16; 4],
    switches: Switches,
    tx_battery_cv: i32,
    drone_battery_cv: Option<i32>,
    blinker: BacklightBlinker,
    skipped_cycles: u32,
}

impl<I, L, D> Transmitter<I, L, D>
where
    I: ControlInputs,
    L: LinkHandle,
    D: Display,
{
    /// Create a transmitter. Sticks start centered until the first sample.
    pub fn new(profile: TransmitterProfile, inputs: I, link: L, display: D) -> Self {
        Self {
            profile,
            inputs,
            link,
            display,
            normalized: [HALF_SCALE; 4],
            switches: Switches::default(),
            tx_battery_cv: 0,
            drone_battery_cv: None,
            blinker: BacklightBlinker::new(profile.battery_critical_cv),
            skipped_cycles: 0,
        }
    }

    /// Draw the static labels and switch the backlight on.
    pub fn draw_start_screen(&mut self) -> Result<(), D::Error> {
        self.display.draw_layout()
    }

    /// Sample all inputs, encode and transmit one packet.
    ///
    /// Returns the packet handed to the link for testing purposes.
    pub fn process_control(&mut self) -> Result<LinkPacket, CycleError<I::Error, L::Error>> {
        let frame = match self.sample() {
            Ok(frame) => frame,
            Err(e) => {
                self.skipped_cycles = self.skipped_cycles.wrapping_add(1);
                return Err(CycleError::Input(e));
            }
        };

        let packet = LinkPacket::from(&frame);
        self.link.transmit(&packet).map_err(CycleError::Link)?;
        Ok(packet)
    }

    /// Read the battery and telemetry, update the backlight and redraw values.
    ///
    /// Returns the rendered frame for testing purposes.
    pub fn process_display(&mut self) -> Result<DisplayFrame, D::Error> {
        match self.inputs.read_battery() {
            Ok(raw) => self.tx_battery_cv = self.profile.tx_battery.centivolts(raw),
            Err(e) => warn!("Battery read failed: {:?}", Debug2Format(&e)),
        }

        let snapshot = self.link.snapshot();
        if let Some(telemetry) = snapshot.telemetry.as_deref().and_then(DroneTelemetry::decode) {
            self.drone_battery_cv = Some(telemetry.battery_cv(&self.profile.drone_battery));
        }

        if let Some(on) = self.blinker.update(self.tx_battery_cv) {
            if let Err(e) = self.display.set_backlight(on) {
                warn!("Backlight switch failed: {:?}", Debug2Format(&e));
            }
        }

        let frame = self.frame(snapshot.link_quality);
        self.display.render(&frame)?;
        Ok(frame)
    }

    /// Frame with the current values and the given link quality.
    #[must_use]
    pub fn frame(&self, link_quality: u8) -> DisplayFrame {
        let mut sticks = [0i32; 4];
        for axis in Axis::ALL {
            sticks[axis.index()] = self
                .profile
                .display_value(axis, self.normalized[axis.index()]);
        }
        DisplayFrame {
            tx_battery_cv: self.tx_battery_cv,
            drone_battery_cv: self.drone_battery_cv,
            sticks,
            link_quality,
        }
    }

    /// Last normalized stick values in [`Axis::ALL`] order.
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> [u16; 4] {
        self.normalized
    }

    #[inline]
    #[must_use]
    pub fn switches(&self) -> Switches {
        self.switches
    }

    /// Control cycles skipped because of an input error.
    #[inline]
    #[must_use]
    pub fn skipped_cycles(&self) -> u32 {
        self.skipped_cycles
    }

    #[inline]
    #[must_use]
    pub fn profile(&self) -> &TransmitterProfile {
        &self.profile
    }

    /// Get a reference to the link handle.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Get a mutable reference to the input source.
    pub fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    /// Get a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Decompose into the inputs, link handle and display.
    pub fn into_parts(self) -> (I, L, D) {
        (self.inputs, self.link, self.display)
    }

    /// Read every input; state is only updated once all reads succeeded.
    fn sample(&mut self) -> Result<ControlFrame, I::Error> {
        let mut normalized = [0u16; 4];
        for axis in Axis::ALL {
            let raw = self.inputs.read_axis(axis)?;
            normalized[axis.index()] = self.profile.normalize(axis, raw);
        }
        let switches = self.inputs.read_switches()?;

        self.normalized = normalized;
        self.switches = switches;

        let mut axes = [0u16; 4];
        for axis in Axis::ALL {
            axes[axis.index()] = self.profile.wire_value(axis, normalized[axis.index()]);
        }
        Ok(ControlFrame { axes, switches })
    }
}

impl<I, L, D> CycleHandler for Transmitter<I, L, D>
where
    I: ControlInputs,
    L: LinkHandle,
    D: Display,
{
    fn control_cycle(&mut self) {
        match self.process_control() {
            Ok(_) => {}
            Err(CycleError::Input(e)) => {
                warn!("Input read failed, skipping transmit: {:?}", Debug2Format(&e))
            }
            Err(CycleError::Link(e)) => warn!("Transmit failed: {:?}", Debug2Format(&e)),
        }
    }

    fn display_cycle(&mut self) {
        if let Err(e) = self.process_display() {
            warn!("Display refresh failed: {:?}", Debug2Format(&e));
        }
    }
}

/// Error type for a control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError<IE, LE> {
    /// Error from the input source.
    Input(IE),
    /// Error from the link.
    Link(LE),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::link::tests::{MockError, MockRadio, Op};
    use crate::link::{LinkController, LinkError, DEFAULT_LINK_CONFIG};
    use crate::profile::{DEFAULT_PROFILE, RAW_OUTPUT_PROFILE};
    use crate::stick::FULL_SCALE;
    use core::cell::RefCell;
    use std::vec;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct InputFault;

    /// Scripted sticks: fixed raw values, optional failure on one read.
    struct MockInputs {
        raw: [u16; 4],
        switches: Switches,
        battery: u16,
        fail_axis: Option<Axis>,
        fail_battery: bool,
    }

    impl MockInputs {
        fn centered() -> Self {
            Self {
                raw: [2000, 29100, 34100, 27350],
                switches: Switches::new(true, false),
                battery: 65535,
                fail_axis: None,
                fail_battery: false,
            }
        }
    }

    impl ControlInputs for MockInputs {
        type Error = InputFault;

        fn read_axis(&mut self, axis: Axis) -> Result<u16, InputFault> {
            if self.fail_axis == Some(axis) {
                return Err(InputFault);
            }
            Ok(self.raw[axis.index()])
        }

        fn read_switches(&mut self) -> Result<Switches, InputFault> {
            Ok(self.switches)
        }

        fn read_battery(&mut self) -> Result<u16, InputFault> {
            if self.fail_battery {
                return Err(InputFault);
            }
            Ok(self.battery)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Drawn {
        Layout,
        Frame(DisplayFrame),
        Backlight(bool),
    }

    #[derive(Default)]
    struct MockDisplay {
        drawn: Vec<Drawn>,
    }

    impl Display for MockDisplay {
        type Error = core::convert::Infallible;

        fn draw_layout(&mut self) -> Result<(), Self::Error> {
            self.drawn.push(Drawn::Layout);
            Ok(())
        }

        fn render(&mut self, frame: &DisplayFrame) -> Result<(), Self::Error> {
            self.drawn.push(Drawn::Frame(*frame));
            Ok(())
        }

        fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
            self.drawn.push(Drawn::Backlight(on));
            Ok(())
        }
    }

    type TestTransmitter = Transmitter<MockInputs, RefCell<LinkController<MockRadio>>, MockDisplay>;

    fn transmitter(profile: TransmitterProfile, statuses: Vec<u8>) -> TestTransmitter {
        let link = LinkController::new(MockRadio::new(statuses), profile.link);
        Transmitter::new(
            profile,
            MockInputs::centered(),
            RefCell::new(link),
            MockDisplay::default(),
        )
    }

    fn written_packets(tx: &TestTransmitter) -> Vec<Vec<u8>> {
        tx.link()
            .borrow()
            .radio()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(0, bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_control_cycle_transmits_encoded_sticks() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        let packet = tx.process_control().unwrap();

        // Throttle at its low stop is full-scale, centered sticks encode as 0
        assert_eq!(tx.normalized(), [FULL_SCALE, HALF_SCALE, HALF_SCALE, HALF_SCALE]);
        assert_eq!(
            packet.as_bytes(),
            &[0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0b10, 0]
        );
        assert_eq!(written_packets(&tx), vec![packet.as_bytes().to_vec()]);
    }

    #[test]
    fn test_raw_profile_sends_unshifted_values() {
        let mut tx = transmitter(RAW_OUTPUT_PROFILE, vec![]);
        let packet = tx.process_control().unwrap();
        assert_eq!(
            packet.as_bytes(),
            &[0xFF, 0xFF, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0b10, 0]
        );
    }

    #[test]
    fn test_input_error_skips_transmit_and_keeps_values() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        tx.process_control().unwrap();

        tx.inputs_mut().raw = [60000, 60000, 60000, 60000];
        tx.inputs_mut().fail_axis = Some(Axis::Yaw);
        let result = tx.process_control();

        assert_eq!(result, Err(CycleError::Input(InputFault)));
        assert_eq!(tx.skipped_cycles(), 1);
        assert_eq!(tx.normalized(), [FULL_SCALE, HALF_SCALE, HALF_SCALE, HALF_SCALE]);
        assert_eq!(written_packets(&tx).len(), 1);
    }

    #[test]
    fn test_link_error_is_reported() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        tx.link().borrow_mut().radio_mut().fail_writes = true;
        assert_eq!(
            tx.process_control(),
            Err(CycleError::Link(LinkError::Radio(MockError)))
        );
        // Sampling still succeeded
        assert_eq!(tx.switches(), Switches::new(true, false));
    }

    #[test]
    fn test_display_cycle_renders_frame() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![0x20 | 0x40]);
        tx.draw_start_screen().unwrap();
        tx.process_control().unwrap();
        tx.link().borrow_mut().handle_interrupt();

        let frame = tx.process_display().unwrap();

        // Mock payload starts with 0x1234
        let expected = DEFAULT_PROFILE.drone_battery.centivolts(0x1234);
        assert_eq!(frame.drone_battery_cv, Some(expected));
        assert_eq!(frame.tx_battery_cv, 1416);
        assert_eq!(frame.sticks, [65535, 0, 0, 0]);
        assert_eq!(tx.display().drawn, vec![Drawn::Layout, Drawn::Frame(frame)]);
    }

    #[test]
    fn test_drone_battery_absent_until_telemetry() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        let frame = tx.process_display().unwrap();
        assert_eq!(frame.drone_battery_cv, None);
        assert_eq!(frame.link_quality, 0);
    }

    #[test]
    fn test_battery_error_keeps_previous_reading() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        tx.process_display().unwrap();

        tx.inputs_mut().fail_battery = true;
        let frame = tx.process_display().unwrap();
        assert_eq!(frame.tx_battery_cv, 1416);
    }

    #[test]
    fn test_low_battery_blinks_backlight() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        // About 9.33 V after the offset
        tx.inputs_mut().battery = 52000;
        tx.process_display().unwrap();
        tx.process_display().unwrap();

        let backlight: Vec<_> = tx
            .display()
            .drawn
            .iter()
            .filter(|d| matches!(d, Drawn::Backlight(_)))
            .cloned()
            .collect();
        assert_eq!(backlight, vec![Drawn::Backlight(false), Drawn::Backlight(true)]);
    }

    #[test]
    fn test_cycle_handler_swallows_errors() {
        let mut tx = transmitter(DEFAULT_PROFILE, vec![]);
        tx.inputs_mut().fail_axis = Some(Axis::Throttle);
        tx.control_cycle();
        tx.display_cycle();
        assert_eq!(tx.skipped_cycles(), 1);
        assert_eq!(tx.display().drawn.len(), 1);
    }

    #[test]
    fn test_default_link_config_matches_profile() {
        assert_eq!(DEFAULT_PROFILE.link, DEFAULT_LINK_CONFIG);
    }
}
