//! Battery telemetry and the low-battery alert.
//!
//! Both ends of the link report a battery voltage as a raw ADC count. A
//! [`BatteryGauge`] turns the count into centivolts (100 = 1 V) with
//! fixed-point arithmetic; the drone's count arrives in the first two bytes
//! of the telemetry payload.

use fixed::types::I32F32;
use fixed_macro::fixed;

/// Transmitter battery level below which the backlight starts blinking.
pub const BATTERY_CRITICAL_CV: i32 = 960;

/// Linear ADC count to centivolt conversion.
///
/// `centivolts = raw / full_scale * reference_v * divider * 100 - offset_cv`,
/// truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryGauge {
    /// ADC count that corresponds to `reference_v` at the pin.
    pub full_scale: u32,
    pub reference_v: I32F32,
    /// Ratio of the resistor divider in front of the ADC pin.
    pub divider: I32F32,
    pub offset_cv: I32F32,
}

/// Transmitter pack: 3.54 divider on a 2-cell tap, with a fixed offset.
pub const TX_BATTERY_GAUGE: BatteryGauge = BatteryGauge {
    full_scale: 65535,
    reference_v: fixed!(3.3: I32F32),
    divider: fixed!(7.08: I32F32),
    offset_cv: fixed!(920: I32F32),
};

/// Drone pack as measured by the receiver.
pub const DRONE_BATTERY_GAUGE: BatteryGauge = BatteryGauge {
    full_scale: 65536,
    reference_v: fixed!(3.3: I32F32),
    divider: fixed!(5.854: I32F32),
    offset_cv: I32F32::ZERO,
};

impl BatteryGauge {
    /// Convert a raw ADC count to centivolts.
    ///
    /// A zero `full_scale` reads as an empty battery.
    #[must_use]
    pub fn centivolts(&self, raw: u16) -> i32 {
        let Some(ratio) = I32F32::from_num(raw).checked_div(I32F32::from_num(self.full_scale))
        else {
            return 0;
        };
        let volts = ratio.saturating_mul(self.reference_v).saturating_mul(self.divider);
        volts
            .saturating_mul_int(100)
            .saturating_sub(self.offset_cv)
            .round_to_zero()
            .to_num::<i32>()
    }
}

/// Telemetry payload sent back by the drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DroneTelemetry {
    /// Raw battery ADC count (payload bytes 0-1, little-endian).
    pub battery_raw: u16,
}

impl DroneTelemetry {
    /// Decode a payload. Returns `None` if it is too short for a battery word.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        match payload {
            [lo, hi, ..] => Some(Self {
                battery_raw: u16::from_le_bytes([*lo, *hi]),
            }),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn battery_cv(&self, gauge: &BatteryGauge) -> i32 {
        gauge.centivolts(self.battery_raw)
    }
}

/// Backlight state machine for the low-battery alert.
///
/// While the battery is below the critical level the backlight toggles on
/// every update; otherwise it is held on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightBlinker {
    critical_cv: i32,
    on: bool,
}

impl BacklightBlinker {
    /// Start with the backlight on, as the start screen leaves it.
    #[must_use]
    pub const fn new(critical_cv: i32) -> Self {
        Self {
            critical_cv,
            on: true,
        }
    }

    /// Feed the latest battery level. Returns the new backlight state when it
    /// changes.
    pub fn update(&mut self, battery_cv: i32) -> Option<bool> {
        let next = if battery_cv < self.critical_cv {
            !self.on
        } else {
            true
        };
        if next == self.on {
            return None;
        }
        self.on = next;
        Some(next)
    }

    #[inline]
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }
}
