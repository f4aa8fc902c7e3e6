//! Radio link state machine.
//!
//! [`LinkController`] owns the transceiver together with everything the
//! radio interrupt updates: the link quality filter, the last quality sample
//! and the most recent telemetry payload. It has two entry points:
//!
//! - [`LinkController::transmit`] from the control cycle, queueing one packet.
//! - [`LinkController::handle_interrupt`] from the radio interrupt edge,
//!   reading the status register and reacting to each asserted flag.
//!
//! The interrupt path never fails. Radio errors during recovery are logged
//! and counted; the next interrupt starts from a clean slate.
//!
//! # Sharing
//!
//! The interrupt context is the only writer of the quality and telemetry
//! state. Readers in the main loop take a [`LinkSnapshot`] while the
//! interrupt is masked (see [`LinkHandle`](crate::LinkHandle)) so they never
//! observe a half-updated filter or payload.

use core::cell::RefCell;
use core::fmt::Debug;

use heapless::Vec;

use crate::fmt::Debug2Format;
use crate::packet::{LinkPacket, PACKET_SIZE};
use crate::quality::{SignalQualityFilter, SAMPLE_FAILURE, SAMPLE_SUCCESS};
use crate::status::{RadioStatus, STATUS_REGISTER};
use crate::transceiver::{CrcWidth, DataRate, Transceiver};

/// Largest telemetry payload the transceiver can deliver.
pub const MAX_TELEMETRY_LEN: usize = 32;

/// Pipe used for both transmitting and auto-acknowledge.
pub const CONTROL_PIPE: u8 = 0;

/// Static radio link parameters, applied once by [`LinkController::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Carrier frequency in MHz (2400 + channel).
    pub rf_frequency_mhz: u16,
    /// Fixed on-air payload size.
    pub transfer_size: u8,
    pub crc: CrcWidth,
    pub address: u64,
    pub address_width: u8,
    pub data_rate: DataRate,
    pub retransmit_delay_us: u16,
    pub retransmit_count: u8,
    /// Expected telemetry payload length; other lengths are dropped.
    pub telemetry_len: usize,
    /// Extra status reads allowed while the register reports not-ready.
    pub status_retry_limit: u16,
}

/// Link parameters shared by both ends of the pair.
pub const DEFAULT_LINK_CONFIG: LinkConfig = LinkConfig {
    rf_frequency_mhz: 2400 + 101,
    transfer_size: PACKET_SIZE as u8,
    crc: CrcWidth::Bits16,
    address: 0x00_7FFF_FFFF,
    address_width: 5,
    data_rate: DataRate::Kbps250,
    retransmit_delay_us: 500,
    retransmit_count: 3,
    telemetry_len: 4,
    status_retry_limit: 64,
};

/// Error type for transmit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The transceiver reported an error.
    Radio(E),
    /// The controller is already borrowed by the other context.
    Busy,
}

/// What one interrupt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkEvent {
    /// Status read from the radio (`NOT_READY` if the read stalled).
    pub status: RadioStatus,
    /// Sample fed to the quality filter.
    pub sample: u8,
    /// Filter output after the sample.
    pub link_quality: u8,
    /// A telemetry payload of the expected length was stored.
    pub telemetry_received: bool,
    /// The status register never became ready within the retry limit.
    pub stalled: bool,
}

/// Consistent copy of the interrupt-owned link state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkSnapshot {
    /// Smoothed 0-100 transmit success percentage.
    pub link_quality: u8,
    /// Last telemetry payload of the expected length, if any arrived yet.
    pub telemetry: Option<Vec<u8, MAX_TELEMETRY_LEN>>,
    pub stalls: u32,
    pub dropped_telemetry: u32,
    pub tx_failures: u32,
}

/// Transceiver plus the link state its interrupt maintains.
pub struct LinkController<R> {
    radio: R,
    config: LinkConfig,
    quality: SignalQualityFilter,
    /// Carried over into interrupts that neither acked nor failed a packet.
    last_sample: u8,
    link_quality: u8,
    telemetry: Option<Vec<u8, MAX_TELEMETRY_LEN>>,
    stalls: u32,
    dropped_telemetry: u32,
    tx_failures: u32,
}

impl<R: Transceiver> LinkController<R> {
    /// Wrap a transceiver. Call [`configure`](Self::configure) before use.
    pub fn new(radio: R, config: LinkConfig) -> Self {
        Self {
            radio,
            config,
            quality: SignalQualityFilter::new(),
            last_sample: SAMPLE_FAILURE,
            link_quality: 0,
            telemetry: None,
            stalls: 0,
            dropped_telemetry: 0,
            tx_failures: 0,
        }
    }

    /// Run the radio bring-up sequence and switch to transmit mode.
    ///
    /// The transceiver keeps its state across an MCU reset, so the sequence
    /// ends by dropping any stale TX payload and clearing latched interrupt
    /// flags. Otherwise the IRQ line could already be low and no edge would
    /// ever arrive.
    pub fn configure(&mut self) -> Result<(), LinkError<R::Error>> {
        self.bring_up().map_err(LinkError::Radio)?;
        debug!("Radio link configured on {} MHz", self.config.rf_frequency_mhz);
        Ok(())
    }

    /// Queue one control packet. Delivery is reported by the next interrupt.
    pub fn transmit(&mut self, packet: &LinkPacket) -> Result<(), LinkError<R::Error>> {
        self.radio
            .write(CONTROL_PIPE, packet.as_bytes())
            .map_err(LinkError::Radio)
    }

    /// React to a radio interrupt edge.
    pub fn handle_interrupt(&mut self) -> LinkEvent {
        let Some(status) = self.read_status() else {
            self.stalls = self.stalls.wrapping_add(1);
            warn!(
                "Radio status not ready after {} reads",
                self.config.status_retry_limit.saturating_add(1)
            );
            self.last_sample = SAMPLE_FAILURE;
            self.link_quality = self.quality.update(SAMPLE_FAILURE);
            return LinkEvent {
                status: RadioStatus::NOT_READY,
                sample: SAMPLE_FAILURE,
                link_quality: self.link_quality,
                telemetry_received: false,
                stalled: true,
            };
        };

        if status.contains(RadioStatus::TX_FIFO_FULL) {
            self.stop_transmitter();
        }

        if status.contains(RadioStatus::MAX_RETRANSMITS) {
            self.stop_transmitter();
            self.clear(RadioStatus::MAX_RETRANSMITS);
            self.tx_failures = self.tx_failures.wrapping_add(1);
            self.last_sample = SAMPLE_FAILURE;
        }

        if status.contains(RadioStatus::TX_SENT) {
            self.stop_transmitter();
            self.clear(RadioStatus::TX_SENT);
            self.last_sample = SAMPLE_SUCCESS;
        }

        let mut telemetry_received = false;
        if status.contains(RadioStatus::RX_RECEIVED) {
            telemetry_received = self.receive_telemetry(status);
            self.clear(RadioStatus::RX_RECEIVED);
        }

        self.link_quality = self.quality.update(self.last_sample);

        trace!(
            "Radio status {=u8:#x}, quality {}",
            status.raw(),
            self.link_quality
        );

        LinkEvent {
            status,
            sample: self.last_sample,
            link_quality: self.link_quality,
            telemetry_received,
            stalled: false,
        }
    }

    /// Copy the interrupt-owned state.
    #[must_use]
    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            link_quality: self.link_quality,
            telemetry: self.telemetry.clone(),
            stalls: self.stalls,
            dropped_telemetry: self.dropped_telemetry,
            tx_failures: self.tx_failures,
        }
    }

    #[inline]
    #[must_use]
    pub fn link_quality(&self) -> u8 {
        self.link_quality
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Get a reference to the transceiver.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Get a mutable reference to the transceiver.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Decompose into the transceiver.
    pub fn into_radio(self) -> R {
        self.radio
    }

    fn bring_up(&mut self) -> Result<(), R::Error> {
        let cfg = self.config;
        self.radio.power_up()?;
        self.radio.set_rf_frequency(cfg.rf_frequency_mhz)?;
        self.radio.set_transfer_size(cfg.transfer_size, CONTROL_PIPE)?;
        self.radio.set_crc_width(cfg.crc)?;
        self.radio.set_tx_address(cfg.address, cfg.address_width)?;
        self.radio
            .set_rx_address(cfg.address, cfg.address_width, CONTROL_PIPE)?;
        self.radio.enable_auto_acknowledge(CONTROL_PIPE)?;
        self.radio.set_air_data_rate(cfg.data_rate)?;
        self.radio
            .enable_auto_retransmit(cfg.retransmit_delay_us, cfg.retransmit_count)?;
        self.radio.set_transmit_mode()?;
        self.radio.flush_tx()?;
        self.radio
            .set_register(STATUS_REGISTER, RadioStatus::INTERRUPT_FLAGS.raw())
    }

    /// Read the status register, re-reading while it reports not-ready.
    fn read_status(&mut self) -> Option<RadioStatus> {
        for _ in 0..=self.config.status_retry_limit {
            match self.radio.status_register() {
                Ok(raw) if raw != RadioStatus::NOT_READY.raw() => return Some(RadioStatus(raw)),
                Ok(_) => {}
                Err(e) => warn!("Status read failed: {:?}", Debug2Format(&e)),
            }
        }
        None
    }

    fn stop_transmitter(&mut self) {
        if let Err(e) = self.radio.disable() {
            warn!("Radio disable failed: {:?}", Debug2Format(&e));
        }
        if let Err(e) = self.radio.flush_tx() {
            warn!("TX flush failed: {:?}", Debug2Format(&e));
        }
    }

    fn clear(&mut self, flag: RadioStatus) {
        if let Err(e) = self.radio.set_register(STATUS_REGISTER, flag.raw()) {
            warn!("Status clear failed: {:?}", Debug2Format(&e));
        }
    }

    /// Store the received payload if it names a valid pipe and has the
    /// expected length. Returns whether it was stored.
    fn receive_telemetry(&mut self, status: RadioStatus) -> bool {
        let expected = self.config.telemetry_len.min(MAX_TELEMETRY_LEN);
        let Some(pipe) = status.rx_pipe() else {
            self.dropped_telemetry = self.dropped_telemetry.wrapping_add(1);
            warn!("RX flag without a valid pipe ({=u8:#x})", status.raw());
            return false;
        };

        let mut buf = [0u8; MAX_TELEMETRY_LEN];
        match self.radio.read(pipe, &mut buf[..expected]) {
            Ok(len) if len == expected => {
                // expected <= MAX_TELEMETRY_LEN, so this cannot overflow
                self.telemetry = Vec::from_slice(&buf[..expected]).ok();
                self.telemetry.is_some()
            }
            Ok(len) => {
                self.dropped_telemetry = self.dropped_telemetry.wrapping_add(1);
                warn!("Short telemetry payload: {} of {} bytes", len, expected);
                false
            }
            Err(e) => {
                self.dropped_telemetry = self.dropped_telemetry.wrapping_add(1);
                warn!("Telemetry read failed: {:?}", Debug2Format(&e));
                false
            }
        }
    }
}

/// Shared access to a [`LinkController`] from the main loop.
///
/// The radio interrupt mutates the controller concurrently, so implementors
/// must make both calls atomic with respect to it (for example by masking the
/// interrupt for their duration).
pub trait LinkHandle {
    type Error: Debug;

    /// Queue one control packet.
    fn transmit(&self, packet: &LinkPacket) -> Result<(), Self::Error>;

    /// Consistent copy of the interrupt-owned state.
    fn snapshot(&self) -> LinkSnapshot;
}

impl<T: LinkHandle + ?Sized> LinkHandle for &T {
    type Error = T::Error;

    fn transmit(&self, packet: &LinkPacket) -> Result<(), Self::Error> {
        T::transmit(self, packet)
    }

    fn snapshot(&self) -> LinkSnapshot {
        T::snapshot(self)
    }
}

/// Single-context sharing: main loop and interrupt handler run on one stack.
impl<R: Transceiver> LinkHandle for RefCell<LinkController<R>> {
    type Error = LinkError<R::Error>;

    fn transmit(&self, packet: &LinkPacket) -> Result<(), Self::Error> {
        self.try_borrow_mut()
            .map_err(|_| LinkError::Busy)?
            .transmit(packet)
    }

    fn snapshot(&self) -> LinkSnapshot {
        match self.try_borrow() {
            Ok(link) => link.snapshot(),
            Err(_) => LinkSnapshot::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use super::*;
    use std::vec;
    use std::vec::Vec as StdVec;

    /// Operations recorded by [`MockRadio`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        PowerUp,
        Frequency(u16),
        TransferSize(u8, u8),
        Crc(CrcWidth),
        TxAddress(u64, u8),
        RxAddress(u64, u8, u8),
        AutoAck(u8),
        DataRate(DataRate),
        AutoRetransmit(u16, u8),
        TransmitMode,
        StatusRead,
        SetRegister(u8, u8),
        Disable,
        FlushTx,
        Read(u8, usize),
        Write(u8, StdVec<u8>),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct MockError;

    /// Scripted transceiver that records every call.
    pub(crate) struct MockRadio {
        pub ops: StdVec<Op>,
        /// Status reads returned in order; `0` once exhausted.
        pub statuses: StdVec<u8>,
        pub rx_payload: StdVec<u8>,
        pub fail_writes: bool,
    }

    impl MockRadio {
        pub fn new(statuses: StdVec<u8>) -> Self {
            Self {
                ops: StdVec::new(),
                statuses,
                rx_payload: vec![0x34, 0x12, 0xAA, 0xBB],
                fail_writes: false,
            }
        }
    }

    impl Transceiver for MockRadio {
        type Error = MockError;

        fn power_up(&mut self) -> Result<(), MockError> {
            self.ops.push(Op::PowerUp);
            Ok(())
        }
        fn set_rf_frequency(&mut self, mhz: u16) -> Result<(), MockError> {
            self.ops.push(Op::Frequency(mhz));
            Ok(())
        }
        fn set_transfer_size(&mut self, size: u8, pipe: u8) -> Result<(), MockError> {
            self.ops.push(Op::TransferSize(size, pipe));
            Ok(())
        }
        fn set_crc_width(&mut self, width: CrcWidth) -> Result<(), MockError> {
            self.ops.push(Op::Crc(width));
            Ok(())
        }
        fn set_tx_address(&mut self, address: u64, width: u8) -> Result<(), MockError> {
            self.ops.push(Op::TxAddress(address, width));
            Ok(())
        }
        fn set_rx_address(&mut self, address: u64, width: u8, pipe: u8) -> Result<(), MockError> {
            self.ops.push(Op::RxAddress(address, width, pipe));
            Ok(())
        }
        fn enable_auto_acknowledge(&mut self, pipe: u8) -> Result<(), MockError> {
            self.ops.push(Op::AutoAck(pipe));
            Ok(())
        }
        fn set_air_data_rate(&mut self, rate: DataRate) -> Result<(), MockError> {
            self.ops.push(Op::DataRate(rate));
            Ok(())
        }
        fn enable_auto_retransmit(&mut self, delay_us: u16, count: u8) -> Result<(), MockError> {
            self.ops.push(Op::AutoRetransmit(delay_us, count));
            Ok(())
        }
        fn set_transmit_mode(&mut self) -> Result<(), MockError> {
            self.ops.push(Op::TransmitMode);
            Ok(())
        }
        fn status_register(&mut self) -> Result<u8, MockError> {
            self.ops.push(Op::StatusRead);
            if self.statuses.is_empty() {
                Ok(0)
            } else {
                Ok(self.statuses.remove(0))
            }
        }
        fn set_register(&mut self, address: u8, value: u8) -> Result<(), MockError> {
            self.ops.push(Op::SetRegister(address, value));
            Ok(())
        }
        fn disable(&mut self) -> Result<(), MockError> {
            self.ops.push(Op::Disable);
            Ok(())
        }
        fn flush_tx(&mut self) -> Result<(), MockError> {
            self.ops.push(Op::FlushTx);
            Ok(())
        }
        fn read(&mut self, pipe: u8, buf: &mut [u8]) -> Result<usize, MockError> {
            self.ops.push(Op::Read(pipe, buf.len()));
            let len = buf.len().min(self.rx_payload.len());
            buf[..len].copy_from_slice(&self.rx_payload[..len]);
            Ok(len)
        }
        fn write(&mut self, pipe: u8, data: &[u8]) -> Result<(), MockError> {
            if self.fail_writes {
                return Err(MockError);
            }
            self.ops.push(Op::Write(pipe, data.to_vec()));
            Ok(())
        }
    }

    fn controller(statuses: StdVec<u8>) -> LinkController<MockRadio> {
        LinkController::new(MockRadio::new(statuses), DEFAULT_LINK_CONFIG)
    }

    #[test]
    fn test_configure_sequence() {
        let mut link = controller(vec![]);
        link.configure().unwrap();
        assert_eq!(
            link.radio().ops,
            vec![
                Op::PowerUp,
                Op::Frequency(2501),
                Op::TransferSize(10, 0),
                Op::Crc(CrcWidth::Bits16),
                Op::TxAddress(0x00_7FFF_FFFF, 5),
                Op::RxAddress(0x00_7FFF_FFFF, 5, 0),
                Op::AutoAck(0),
                Op::DataRate(DataRate::Kbps250),
                Op::AutoRetransmit(500, 3),
                Op::TransmitMode,
                Op::FlushTx,
                Op::SetRegister(STATUS_REGISTER, 0x70),
            ]
        );
    }

    #[test]
    fn test_transmit_writes_packet_on_control_pipe() {
        let mut link = controller(vec![]);
        let packet = LinkPacket::encode(1, 2, 3, 4, true, false);
        link.transmit(&packet).unwrap();
        assert_eq!(
            link.radio().ops,
            vec![Op::Write(0, packet.as_bytes().to_vec())]
        );
    }

    #[test]
    fn test_transmit_error_is_reported() {
        let mut link = controller(vec![]);
        link.radio_mut().fail_writes = true;
        let packet = LinkPacket::encode(0, 0, 0, 0, false, false);
        assert_eq!(link.transmit(&packet), Err(LinkError::Radio(MockError)));
    }

    #[test]
    fn test_tx_sent_records_success() {
        let mut link = controller(vec![0x20]);
        let event = link.handle_interrupt();

        assert_eq!(event.sample, SAMPLE_SUCCESS);
        assert!(!event.stalled);
        assert_eq!(
            link.radio().ops,
            vec![
                Op::StatusRead,
                Op::Disable,
                Op::FlushTx,
                Op::SetRegister(STATUS_REGISTER, 0x20),
            ]
        );
        // One success in a window of 256 failures
        assert_eq!(event.link_quality, 0);
        assert_eq!(link.quality.sum(), 100);
    }

    #[test]
    fn test_max_retransmits_records_failure() {
        let mut link = controller(vec![0x20, 0x10]);
        link.handle_interrupt();
        let event = link.handle_interrupt();

        assert_eq!(event.sample, SAMPLE_FAILURE);
        assert_eq!(link.snapshot().tx_failures, 1);
        assert!(link
            .radio()
            .ops
            .ends_with(&[Op::Disable, Op::FlushTx, Op::SetRegister(STATUS_REGISTER, 0x10)]));
    }

    #[test]
    fn test_fifo_full_flushes_without_sample() {
        let mut link = controller(vec![0x20, 0x01]);
        link.handle_interrupt();
        let event = link.handle_interrupt();

        // Carried over from the previous acked packet
        assert_eq!(event.sample, SAMPLE_SUCCESS);
        assert!(link.radio().ops.ends_with(&[Op::StatusRead, Op::Disable, Op::FlushTx]));
    }

    #[test]
    fn test_no_tx_flag_carries_previous_sample() {
        // RX only, pipe 0
        let mut link = controller(vec![0x10, 0x40]);
        link.handle_interrupt();
        let event = link.handle_interrupt();
        assert_eq!(event.sample, SAMPLE_FAILURE);

        let mut link = controller(vec![0x20, 0x40]);
        link.handle_interrupt();
        let event = link.handle_interrupt();
        assert_eq!(event.sample, SAMPLE_SUCCESS);
        assert_eq!(link.quality.sum(), 200);
    }

    #[test]
    fn test_combined_flags_handled_independently() {
        let mut link = controller(vec![0x20 | 0x40 | (1 << 1)]);
        let event = link.handle_interrupt();

        assert_eq!(event.sample, SAMPLE_SUCCESS);
        assert!(event.telemetry_received);
        assert_eq!(
            link.radio().ops,
            vec![
                Op::StatusRead,
                Op::Disable,
                Op::FlushTx,
                Op::SetRegister(STATUS_REGISTER, 0x20),
                Op::Read(1, 4),
                Op::SetRegister(STATUS_REGISTER, 0x40),
            ]
        );
    }

    #[test]
    fn test_failure_and_success_in_one_status_ends_as_success() {
        let mut link = controller(vec![0x10 | 0x20]);
        let event = link.handle_interrupt();
        assert_eq!(event.sample, SAMPLE_SUCCESS);
    }

    #[test]
    fn test_rx_stores_telemetry_until_replaced() {
        let mut link = controller(vec![0x40, 0x20]);
        let event = link.handle_interrupt();
        assert!(event.telemetry_received);
        assert_eq!(
            link.snapshot().telemetry.as_deref(),
            Some(&[0x34, 0x12, 0xAA, 0xBB][..])
        );

        // A later interrupt without RX keeps the last payload
        let event = link.handle_interrupt();
        assert!(!event.telemetry_received);
        assert_eq!(
            link.snapshot().telemetry.as_deref(),
            Some(&[0x34, 0x12, 0xAA, 0xBB][..])
        );
    }

    #[test]
    fn test_two_byte_telemetry_variant() {
        let config = LinkConfig {
            telemetry_len: 2,
            ..DEFAULT_LINK_CONFIG
        };
        let mut link = LinkController::new(MockRadio::new(vec![0x40]), config);
        link.handle_interrupt();
        assert_eq!(link.snapshot().telemetry.as_deref(), Some(&[0x34, 0x12][..]));
    }

    #[test]
    fn test_short_payload_is_dropped() {
        let mut link = controller(vec![0x40, 0x40]);
        link.handle_interrupt();

        link.radio_mut().rx_payload = vec![0x01];
        let event = link.handle_interrupt();

        assert!(!event.telemetry_received);
        let snapshot = link.snapshot();
        assert_eq!(snapshot.dropped_telemetry, 1);
        // Last good payload is kept
        assert_eq!(snapshot.telemetry.as_deref(), Some(&[0x34, 0x12, 0xAA, 0xBB][..]));
        // Flag still cleared
        assert!(link
            .radio()
            .ops
            .ends_with(&[Op::SetRegister(STATUS_REGISTER, 0x40)]));
    }

    #[test]
    fn test_invalid_pipe_is_dropped_without_read() {
        let mut link = controller(vec![0x40 | (RadioStatus::RX_FIFO_EMPTY << 1)]);
        let event = link.handle_interrupt();

        assert!(!event.telemetry_received);
        assert_eq!(link.snapshot().dropped_telemetry, 1);
        assert!(!link.radio().ops.iter().any(|op| matches!(op, Op::Read(..))));
        assert!(link
            .radio()
            .ops
            .contains(&Op::SetRegister(STATUS_REGISTER, 0x40)));
    }

    #[test]
    fn test_not_ready_status_is_reread() {
        let mut link = controller(vec![0, 0, 0x20]);
        let event = link.handle_interrupt();
        assert!(!event.stalled);
        assert_eq!(event.status, RadioStatus::TX_SENT);
        let reads = link.radio().ops.iter().filter(|op| **op == Op::StatusRead).count();
        assert_eq!(reads, 3);
    }

    #[test]
    fn test_status_wait_is_bounded() {
        let config = LinkConfig {
            status_retry_limit: 5,
            ..DEFAULT_LINK_CONFIG
        };
        let mut link = LinkController::new(MockRadio::new(vec![]), config);
        link.quality = SignalQualityFilter::with_seed(SAMPLE_SUCCESS);

        let event = link.handle_interrupt();

        assert!(event.stalled);
        assert_eq!(event.sample, SAMPLE_FAILURE);
        assert_eq!(link.radio().ops.len(), 6);
        assert_eq!(link.snapshot().stalls, 1);
        assert_eq!(link.quality.sum(), 100 * 255);
    }

    #[test]
    fn test_quality_converges_to_success_rate() {
        let mut statuses = vec![];
        for i in 0..256 {
            statuses.push(if i % 4 == 0 { 0x10 } else { 0x20 });
        }
        let mut link = controller(statuses);
        let mut last = LinkEvent {
            status: RadioStatus::NOT_READY,
            sample: 0,
            link_quality: 0,
            telemetry_received: false,
            stalled: false,
        };
        for _ in 0..256 {
            last = link.handle_interrupt();
        }
        assert_eq!(last.link_quality, 75);
        assert_eq!(link.snapshot().link_quality, 75);
    }

    #[test]
    fn test_refcell_handle_reports_busy() {
        let shared = RefCell::new(controller(vec![0x40]));
        let packet = LinkPacket::encode(0, 0, 0, 0, false, false);
        assert_eq!(LinkHandle::transmit(&shared, &packet), Ok(()));

        shared.borrow_mut().handle_interrupt();
        assert!(LinkHandle::snapshot(&shared).telemetry.is_some());

        let _guard = shared.borrow_mut();
        assert_eq!(LinkHandle::transmit(&shared, &packet), Err(LinkError::Busy));
        assert_eq!(LinkHandle::snapshot(&shared), LinkSnapshot::default());
    }
}
