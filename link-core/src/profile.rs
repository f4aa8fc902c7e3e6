//! Compile-time transmitter profiles.
//!
//! A [`TransmitterProfile`] gathers every constant that differs between
//! hardware builds: stick calibration, output encoding, link parameters,
//! battery gauges and loop periods. Two builds exist:
//!
//! - [`DEFAULT_PROFILE`]: throttle inverted, other sticks signed-centered,
//!   4-byte telemetry.
//! - [`RAW_OUTPUT_PROFILE`]: every stick inverted, 2-byte telemetry.

use core::fmt;

use crate::link::{LinkConfig, DEFAULT_LINK_CONFIG, MAX_TELEMETRY_LEN};
use crate::packet::PACKET_SIZE;
use crate::scheduler::{CONTROL_PERIOD_US, DISPLAY_PERIOD_US};
use crate::stick::{Axis, AxisCalibration, AxisDescriptor, CalibrationError, OutputEncoding};
use crate::telemetry::{BatteryGauge, BATTERY_CRITICAL_CV, DRONE_BATTERY_GAUGE, TX_BATTERY_GAUGE};

/// Dead band at both ends of every stick and around each center.
pub const STICK_MARGIN: u16 = 1500;

/// Highest carrier the transceiver can tune to (channel 125).
pub const MAX_RF_FREQUENCY_MHZ: u16 = 2525;

const STICKS: [AxisDescriptor; 4] = [
    AxisDescriptor::Unidirectional(AxisCalibration::new(2000, 56845, STICK_MARGIN, STICK_MARGIN)),
    AxisDescriptor::Bidirectional {
        calibration: AxisCalibration::new(500, 58000, STICK_MARGIN, STICK_MARGIN),
        mid: 29100,
    },
    AxisDescriptor::Bidirectional {
        calibration: AxisCalibration::new(6000, 63000, STICK_MARGIN, STICK_MARGIN),
        mid: 34100,
    },
    AxisDescriptor::Bidirectional {
        calibration: AxisCalibration::new(2400, 62000, STICK_MARGIN, STICK_MARGIN),
        mid: 27350,
    },
];

/// Full configuration of one transmitter build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitterProfile {
    /// Per-axis calibration in [`Axis::ALL`] order.
    pub sticks: [AxisDescriptor; 4],
    /// Per-axis output encoding in [`Axis::ALL`] order.
    pub encodings: [OutputEncoding; 4],
    pub link: LinkConfig,
    pub tx_battery: BatteryGauge,
    pub drone_battery: BatteryGauge,
    /// Transmitter battery level that triggers the backlight alert.
    pub battery_critical_cv: i32,
    pub control_period_us: u64,
    pub display_period_us: u64,
}

/// Throttle inverted, roll/pitch/yaw signed-centered, 4-byte telemetry.
pub const DEFAULT_PROFILE: TransmitterProfile = TransmitterProfile {
    sticks: STICKS,
    encodings: [
        OutputEncoding::Inverted,
        OutputEncoding::SignedCentered,
        OutputEncoding::SignedCentered,
        OutputEncoding::SignedCentered,
    ],
    link: DEFAULT_LINK_CONFIG,
    tx_battery: TX_BATTERY_GAUGE,
    drone_battery: DRONE_BATTERY_GAUGE,
    battery_critical_cv: BATTERY_CRITICAL_CV,
    control_period_us: CONTROL_PERIOD_US,
    display_period_us: DISPLAY_PERIOD_US,
};

/// Every stick inverted full-scale, 2-byte telemetry.
pub const RAW_OUTPUT_PROFILE: TransmitterProfile = TransmitterProfile {
    encodings: [OutputEncoding::Inverted; 4],
    link: LinkConfig {
        telemetry_len: 2,
        ..DEFAULT_LINK_CONFIG
    },
    ..DEFAULT_PROFILE
};

/// Problems detected by [`TransmitterProfile::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// An axis calibration leaves a segment without travel.
    Calibration(Axis, CalibrationError),
    /// The on-air payload size does not match the control packet.
    TransferSize(u8),
    /// Telemetry length cannot carry a battery word or exceeds the FIFO.
    TelemetryLength(usize),
    /// Carrier outside 2400-2525 MHz.
    Frequency(u16),
    /// Address width outside 3-5 bytes.
    AddressWidth(u8),
    /// More than 15 automatic retransmits.
    RetransmitCount(u8),
    /// A loop period or battery gauge scale is zero.
    ZeroScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calibration(axis, e) => write!(f, "{:?} calibration: {}", axis, e),
            Self::TransferSize(n) => {
                write!(f, "transfer size {} does not match {}-byte packet", n, PACKET_SIZE)
            }
            Self::TelemetryLength(n) => write!(f, "telemetry length {} out of range", n),
            Self::Frequency(mhz) => write!(f, "RF frequency {} MHz out of range", mhz),
            Self::AddressWidth(w) => write!(f, "address width {} out of range", w),
            Self::RetransmitCount(n) => write!(f, "retransmit count {} exceeds 15", n),
            Self::ZeroScale => write!(f, "zero period or gauge scale"),
        }
    }
}

impl TransmitterProfile {
    /// Check every constant before the hardware is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in Axis::ALL {
            self.sticks[axis.index()]
                .validate()
                .map_err(|e| ConfigError::Calibration(axis, e))?;
        }

        let link = &self.link;
        if usize::from(link.transfer_size) != PACKET_SIZE {
            return Err(ConfigError::TransferSize(link.transfer_size));
        }
        if !(2..=MAX_TELEMETRY_LEN).contains(&link.telemetry_len) {
            return Err(ConfigError::TelemetryLength(link.telemetry_len));
        }
        if !(2400..=MAX_RF_FREQUENCY_MHZ).contains(&link.rf_frequency_mhz) {
            return Err(ConfigError::Frequency(link.rf_frequency_mhz));
        }
        if !(3..=5).contains(&link.address_width) {
            return Err(ConfigError::AddressWidth(link.address_width));
        }
        if link.retransmit_count > 15 {
            return Err(ConfigError::RetransmitCount(link.retransmit_count));
        }

        if self.control_period_us == 0
            || self.display_period_us == 0
            || self.tx_battery.full_scale == 0
            || self.drone_battery.full_scale == 0
        {
            return Err(ConfigError::ZeroScale);
        }
        Ok(())
    }

    /// Normalize a raw sample for `axis`.
    #[inline]
    #[must_use]
    pub fn normalize(&self, axis: Axis, raw: u16) -> u16 {
        self.sticks[axis.index()].normalize(raw)
    }

    /// Wire word for a normalized `axis` value.
    #[inline]
    #[must_use]
    pub fn wire_value(&self, axis: Axis, normalized: u16) -> u16 {
        self.encodings[axis.index()].wire_value(normalized)
    }

    /// Pilot-facing value for a normalized `axis` value.
    #[inline]
    #[must_use]
    pub fn display_value(&self, axis: Axis, normalized: u16) -> i32 {
        self.encodings[axis.index()].display_value(normalized)
    }
}
