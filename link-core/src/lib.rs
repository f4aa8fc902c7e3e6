//! Platform-agnostic core of a hand-held RC transmitter.
//!
//! This crate holds everything between the ADC and the radio driver that
//! has real logic in it, without any platform-specific dependencies. It can
//! be used both in embedded `no_std` firmware and on host for testing.
//!
//! # Overview
//!
//! - [`stick`]: calibration, deadzone and inversion ([`AxisDescriptor`])
//! - [`packet`]: the fixed 10-byte control packet ([`LinkPacket`])
//! - [`quality`]: moving-average link quality ([`SignalQualityFilter`])
//! - [`link`]: radio interrupt state machine ([`LinkController`])
//! - [`scheduler`]: dual-rate cooperative loop ([`DualRateScheduler`])
//! - [`transmitter`]: the two cycles wired to inputs, link and display ([`Transmitter`])
//! - [`telemetry`], [`display`]: battery gauges and screen contents
//! - [`profile`]: compile-time build configuration ([`TransmitterProfile`])
//!
//! Hardware is reached through capability traits: [`Transceiver`],
//! [`ControlInputs`], [`Display`], [`LinkHandle`] and [`Monotonic`].
//!
//! # Example
//!
//! ```rust
//! use link_core::{Axis, LinkPacket, DEFAULT_PROFILE};
//!
//! let profile = DEFAULT_PROFILE;
//! let mut axes = [0u16; 4];
//! for (axis, raw) in Axis::ALL.into_iter().zip([2000, 29100, 34100, 27350]) {
//!     let normalized = profile.normalize(axis, raw);
//!     axes[axis.index()] = profile.wire_value(axis, normalized);
//! }
//!
//! let packet = LinkPacket::encode(axes[0], axes[1], axes[2], axes[3], true, false);
//! assert_eq!(packet.as_bytes(), &[0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0b10, 0]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod display;
pub mod input;
pub mod link;
pub mod packet;
pub mod profile;
pub mod quality;
pub mod scheduler;
pub mod status;
pub mod stick;
pub mod telemetry;
pub mod transceiver;
pub mod transmitter;

// Re-export main types at crate root
pub use display::{Display, DisplayFrame, FieldPosition, FieldText, LAYOUT};
pub use input::ControlInputs;
pub use link::{
    LinkConfig, LinkController, LinkError, LinkEvent, LinkHandle, LinkSnapshot,
    DEFAULT_LINK_CONFIG, MAX_TELEMETRY_LEN,
};
pub use packet::{ControlFrame, LinkPacket, PacketError, Switches, PACKET_SIZE};
pub use profile::{ConfigError, TransmitterProfile, DEFAULT_PROFILE, RAW_OUTPUT_PROFILE};
pub use quality::SignalQualityFilter;
pub use scheduler::{CycleHandler, DualRateScheduler, Monotonic, PeriodicTimer};
pub use status::RadioStatus;
pub use stick::{
    Axis, AxisCalibration, AxisDescriptor, CalibrationError, OutputEncoding, FULL_SCALE,
    HALF_SCALE,
};
pub use telemetry::{BacklightBlinker, BatteryGauge, DroneTelemetry};
pub use transceiver::{CrcWidth, DataRate, Transceiver};
pub use transmitter::{CycleError, Transmitter};
