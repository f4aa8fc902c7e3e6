//! Hand-held RC transmitter firmware for RP2350B.
//!
//! This crate wires the platform-agnostic [`link_core`] logic and the
//! [`nrf24_radio`] driver to the RP2350B peripherals: ADC sticks, GPIO
//! switches, an HD44780 character display behind a PCF8574 I2C expander and
//! the radio interrupt line.
//!
//! # Hardware
//!
//! | Signal              | Pin                  |
//! |---------------------|----------------------|
//! | Throttle/roll/pitch/yaw | GPIO40-43 (ADC0-3) |
//! | Battery sense       | GPIO44 (ADC4)        |
//! | Switch 1 / 2        | GPIO2 / GPIO3, pulled down |
//! | Radio SCK/MOSI/MISO | GPIO18 / 19 / 16 (SPI0) |
//! | Radio CSN / CE      | GPIO17 / GPIO20      |
//! | Radio IRQ           | GPIO21, pulled up, active low |
//! | Display SDA / SCL   | GPIO4 / GPIO5 (I2C0) |

#![no_std]

#[cfg(all(feature = "profile-signed", feature = "profile-raw"))]
compile_error!("features `profile-signed` and `profile-raw` are mutually exclusive");

// Re-export core types for convenience
pub use link_core::{
    Axis, ControlInputs, Display, DisplayFrame, DualRateScheduler, LinkController, LinkEvent,
    LinkHandle, LinkSnapshot, Monotonic, Switches, Transceiver, TransmitterProfile, Transmitter,
};

pub mod adc_input;
pub mod clock;
pub mod lcd;
pub mod shared;

pub use adc_input::AdcInputs;
pub use clock::EmbassyClock;
pub use lcd::{Lcd, LCD_ADDRESS};
pub use shared::{service_interrupts, SharedLink};

/// Profile compiled into this build.
#[cfg(not(feature = "profile-raw"))]
pub const PROFILE: TransmitterProfile = link_core::DEFAULT_PROFILE;

/// Profile compiled into this build.
#[cfg(feature = "profile-raw")]
pub const PROFILE: TransmitterProfile = link_core::RAW_OUTPUT_PROFILE;
