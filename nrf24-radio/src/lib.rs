//! nRF24L01+ transceiver driver.
//!
//! This crate provides a chip-agnostic blocking driver for the Nordic
//! nRF24L01+ 2.4 GHz transceiver, implementing [`link_core::Transceiver`].
//! It is written against the `embedded-hal` 1.0 traits so it runs on any MCU
//! and can be tested on host with fake buses.
//!
//! # Features
//!
//! - Register-level configuration: channel, payload width, CRC, addresses,
//!   auto-acknowledge, air data rate and auto-retransmit
//! - Single-transaction commands (chip select handled by the [`SpiDevice`](embedded_hal::spi::SpiDevice))
//! - Argument checking before anything reaches the bus
//!
//! # Example
//!
//! ```ignore
//! use link_core::{LinkController, DEFAULT_LINK_CONFIG};
//! use nrf24_radio::Nrf24;
//!
//! let radio = Nrf24::new(spi_device, ce_pin, delay);
//! let mut link = LinkController::new(radio, DEFAULT_LINK_CONFIG);
//! link.configure()?;
//! ```
//!
//! # SPI Configuration
//!
//! - Mode 0 (CPOL = 0, CPHA = 0), MSB first
//! - Up to 10 MHz clock
//! - CSN active low, managed by the `SpiDevice`

#![cfg_attr(not(feature = "std"), no_std)]

pub mod driver;
pub mod registers;

pub use driver::{Error, Nrf24};

/// Highest SPI clock the chip accepts.
pub const MAX_SPI_FREQUENCY_HZ: u32 = 10_000_000;
