//! Packet radio capability.

use core::fmt::Debug;

/// Over-the-air bit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Kbps250,
    Mbps1,
    Mbps2,
}

/// Width of the link-layer CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcWidth {
    Disabled,
    Bits8,
    Bits16,
}

/// Trait for the packet radio the link runs over.
///
/// This abstracts the transceiver chip and its bus so the link state machine
/// can be driven by real hardware or by a test double. Methods map one-to-one
/// onto transceiver operations; none of them block for longer than a bus
/// transfer.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transceiver {
    /// Bus or argument error reported by the driver.
    type Error: Debug;

    /// Leave power-down and enter standby.
    fn power_up(&mut self) -> Result<(), Self::Error>;

    /// Tune to `2400 + channel` MHz, given as the absolute frequency in MHz.
    fn set_rf_frequency(&mut self, mhz: u16) -> Result<(), Self::Error>;

    /// Fixed payload length for `pipe`.
    fn set_transfer_size(&mut self, size: u8, pipe: u8) -> Result<(), Self::Error>;

    fn set_crc_width(&mut self, width: CrcWidth) -> Result<(), Self::Error>;

    /// Destination address for transmitted packets (`width` bytes, LSB first).
    fn set_tx_address(&mut self, address: u64, width: u8) -> Result<(), Self::Error>;

    /// Receive address of `pipe` (`width` bytes, LSB first).
    fn set_rx_address(&mut self, address: u64, width: u8, pipe: u8) -> Result<(), Self::Error>;

    fn enable_auto_acknowledge(&mut self, pipe: u8) -> Result<(), Self::Error>;

    fn set_air_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error>;

    /// Let the radio retry unacked packets `count` times, `delay_us` apart.
    fn enable_auto_retransmit(&mut self, delay_us: u16, count: u8) -> Result<(), Self::Error>;

    fn set_transmit_mode(&mut self) -> Result<(), Self::Error>;

    /// Read the status register. `0` means the value is not ready yet.
    fn status_register(&mut self) -> Result<u8, Self::Error>;

    fn set_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;

    /// Stop the current transmission or reception (chip enable low).
    fn disable(&mut self) -> Result<(), Self::Error>;

    fn flush_tx(&mut self) -> Result<(), Self::Error>;

    /// Read the head-of-FIFO payload received on `pipe` into `buf`.
    ///
    /// Returns the number of bytes actually read.
    fn read(&mut self, pipe: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue `data` for transmission on `pipe` and start sending.
    fn write(&mut self, pipe: u8, data: &[u8]) -> Result<(), Self::Error>;
}
