//! Blocking nRF24L01+ driver.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};
use link_core::{CrcWidth, DataRate, Transceiver};

use crate::registers::*;

/// Error type for driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE, PinE> {
    /// SPI transfer failed.
    Spi(SpiE),
    /// Chip-enable pin could not be driven.
    Pin(PinE),
    /// Argument outside what the chip supports (channel, pipe, width, length).
    InvalidArgument,
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> fmt::Display for Error<SpiE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {:?}", e),
            Self::Pin(e) => write!(f, "CE pin error: {:?}", e),
            Self::InvalidArgument => write!(f, "argument out of range"),
        }
    }
}

/// nRF24L01+ on an SPI device with a chip-enable pin.
///
/// Chip select is owned by the [`SpiDevice`]; every command is one SPI
/// transaction. The chip is left in standby (CE low) except while a
/// transmission is being started.
pub struct Nrf24<SPI, CE, D> {
    spi: SPI,
    ce: CE,
    delay: D,
}

type DriverResult<T, SPI, CE> = Result<
    T,
    Error<<SPI as embedded_hal::spi::ErrorType>::Error, <CE as embedded_hal::digital::ErrorType>::Error>,
>;

impl<SPI, CE, D> Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    /// Create a driver. The chip is not touched until the first call.
    pub fn new(spi: SPI, ce: CE, delay: D) -> Self {
        Self { spi, ce, delay }
    }

    /// Decompose into the bus, pin and delay.
    pub fn release(self) -> (SPI, CE, D) {
        (self.spi, self.ce, self.delay)
    }

    /// Read a single-byte register.
    pub fn read_register(&mut self, register: u8) -> DriverResult<u8, SPI, CE> {
        if register > REGISTER_MASK {
            return Err(Error::InvalidArgument);
        }
        let mut buf = [R_REGISTER | register, NOP];
        self.spi.transfer_in_place(&mut buf).map_err(Error::Spi)?;
        Ok(buf[1])
    }

    /// Write a single-byte register.
    pub fn write_register(&mut self, register: u8, value: u8) -> DriverResult<(), SPI, CE> {
        if register > REGISTER_MASK {
            return Err(Error::InvalidArgument);
        }
        self.spi
            .write(&[W_REGISTER | register, value])
            .map_err(Error::Spi)
    }

    fn write_register_bytes(&mut self, register: u8, bytes: &[u8]) -> DriverResult<(), SPI, CE> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[W_REGISTER | register]),
                Operation::Write(bytes),
            ])
            .map_err(Error::Spi)
    }

    /// Read-modify-write: clear `clear`, then set `set`.
    fn update_register(&mut self, register: u8, clear: u8, set: u8) -> DriverResult<(), SPI, CE> {
        let value = self.read_register(register)?;
        self.write_register(register, (value & !clear) | set)
    }

    fn command(&mut self, command: u8) -> DriverResult<(), SPI, CE> {
        self.spi.write(&[command]).map_err(Error::Spi)
    }

    fn check_pipe(pipe: u8) -> DriverResult<(), SPI, CE> {
        if pipe < PIPE_COUNT {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }

    fn address_bytes(address: u64, width: u8) -> DriverResult<([u8; 8], usize), SPI, CE> {
        if !(3..=5).contains(&width) {
            return Err(Error::InvalidArgument);
        }
        Ok((address.to_le_bytes(), usize::from(width)))
    }
}

impl<SPI, CE, D> Transceiver for Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    type Error = Error<SPI::Error, CE::Error>;

    fn power_up(&mut self) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(Error::Pin)?;
        self.update_register(CONFIG, 0, PWR_UP)?;
        self.delay.delay_us(POWER_UP_DELAY_US);
        Ok(())
    }

    fn set_rf_frequency(&mut self, mhz: u16) -> Result<(), Self::Error> {
        let channel = mhz
            .checked_sub(BASE_FREQUENCY_MHZ)
            .filter(|ch| *ch <= MAX_CHANNEL)
            .ok_or(Error::InvalidArgument)?;
        // channel <= 125
        self.write_register(RF_CH, channel as u8)
    }

    fn set_transfer_size(&mut self, size: u8, pipe: u8) -> Result<(), Self::Error> {
        Self::check_pipe(pipe)?;
        if size == 0 || usize::from(size) > MAX_PAYLOAD {
            return Err(Error::InvalidArgument);
        }
        self.write_register(RX_PW_P0 + pipe, size)
    }

    fn set_crc_width(&mut self, width: CrcWidth) -> Result<(), Self::Error> {
        let set = match width {
            CrcWidth::Disabled => 0,
            CrcWidth::Bits8 => EN_CRC,
            CrcWidth::Bits16 => EN_CRC | CRCO,
        };
        self.update_register(CONFIG, EN_CRC | CRCO, set)
    }

    fn set_tx_address(&mut self, address: u64, width: u8) -> Result<(), Self::Error> {
        let (bytes, len) = Self::address_bytes(address, width)?;
        self.write_register(SETUP_AW, width - 2)?;
        self.write_register_bytes(TX_ADDR, &bytes[..len])
    }

    fn set_rx_address(&mut self, address: u64, width: u8, pipe: u8) -> Result<(), Self::Error> {
        Self::check_pipe(pipe)?;
        let (bytes, len) = Self::address_bytes(address, width)?;
        self.write_register(SETUP_AW, width - 2)?;
        // Pipes 2-5 share the upper bytes of pipe 1 and only store the LSB
        let len = if pipe < 2 { len } else { 1 };
        self.write_register_bytes(RX_ADDR_P0 + pipe, &bytes[..len])?;
        self.update_register(EN_RXADDR, 0, 1 << pipe)
    }

    fn enable_auto_acknowledge(&mut self, pipe: u8) -> Result<(), Self::Error> {
        Self::check_pipe(pipe)?;
        self.update_register(EN_AA, 0, 1 << pipe)
    }

    fn set_air_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error> {
        let set = match rate {
            DataRate::Kbps250 => RF_DR_LOW,
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => RF_DR_HIGH,
        };
        self.update_register(RF_SETUP, RF_DR_LOW | RF_DR_HIGH, set)
    }

    fn enable_auto_retransmit(&mut self, delay_us: u16, count: u8) -> Result<(), Self::Error> {
        if !(RETRANSMIT_STEP_US..=MAX_RETRANSMIT_DELAY_US).contains(&delay_us)
            || count > MAX_RETRANSMIT_COUNT
        {
            return Err(Error::InvalidArgument);
        }
        // Rounded up to the next 250 us step; fits in 4 bits
        let ard = (delay_us.div_ceil(RETRANSMIT_STEP_US) - 1) as u8;
        self.write_register(SETUP_RETR, (ard << 4) | count)
    }

    fn set_transmit_mode(&mut self) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(Error::Pin)?;
        self.update_register(CONFIG, PRIM_RX, 0)
    }

    fn status_register(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [NOP];
        self.spi.transfer_in_place(&mut buf).map_err(Error::Spi)?;
        Ok(buf[0])
    }

    fn set_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.write_register(address, value)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(Error::Pin)
    }

    fn flush_tx(&mut self) -> Result<(), Self::Error> {
        self.command(FLUSH_TX)
    }

    fn read(&mut self, pipe: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Self::check_pipe(pipe)?;
        let len = buf.len().min(MAX_PAYLOAD);
        self.spi
            .transaction(&mut [
                Operation::Write(&[R_RX_PAYLOAD]),
                Operation::Read(&mut buf[..len]),
            ])
            .map_err(Error::Spi)?;
        Ok(len)
    }

    fn write(&mut self, pipe: u8, data: &[u8]) -> Result<(), Self::Error> {
        Self::check_pipe(pipe)?;
        if data.is_empty() || data.len() > MAX_PAYLOAD {
            return Err(Error::InvalidArgument);
        }
        self.ce.set_low().map_err(Error::Pin)?;
        self.spi
            .transaction(&mut [Operation::Write(&[W_TX_PAYLOAD]), Operation::Write(data)])
            .map_err(Error::Spi)?;

        // A CE pulse sends the packet; completion is reported on IRQ
        self.ce.set_high().map_err(Error::Pin)?;
        self.delay.delay_us(CE_PULSE_US);
        self.ce.set_low().map_err(Error::Pin)
    }
}
