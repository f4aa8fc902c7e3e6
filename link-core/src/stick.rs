//! Stick calibration and normalization.
//!
//! Raw analog samples (16-bit, 0-65535) are mapped onto the normalized axis
//! range with the low raw end producing the *high* output. Each axis is
//! described by an [`AxisDescriptor`]:
//!
//! - **Unidirectional** (throttle): one linear segment between the inner
//!   bounds `min + margin_min` and `max - margin_max`.
//! - **Bidirectional** (roll, pitch, yaw): two segments split at `mid`, with a
//!   deadzone band `[mid - margin_max, mid + margin_min]` that maps to
//!   exactly [`HALF_SCALE`].
//!
//! Samples outside the inner bounds saturate to `0` or [`FULL_SCALE`].
//!
//! The bidirectional slope is measured from the start of the active segment
//! (not from `mid`) and the lower segment is anchored at [`FULL_SCALE`]. The
//! last lower sample therefore maps to
//! `FULL_SCALE - ceil(HALF_SCALE * (span - 1) / span)`, which is
//! [`HALF_SCALE`] for spans of 16385 to 32768 samples (every shipped
//! calibration) and slightly above it for shorter spans. Receivers
//! calibrated against this transmitter depend on that exact curve.

use core::fmt;

/// Maximum normalized output.
pub const FULL_SCALE: u16 = 65535;

/// Normalized output for a centered bidirectional stick.
pub const HALF_SCALE: u16 = 32768;

/// Control axes in link order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Throttle,
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    /// All axes in the order they appear on the wire.
    pub const ALL: [Axis; 4] = [Axis::Throttle, Axis::Roll, Axis::Pitch, Axis::Yaw];

    /// Position of the axis in per-axis arrays and in the link packet.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Axis::Throttle => 0,
            Axis::Roll => 1,
            Axis::Pitch => 2,
            Axis::Yaw => 3,
        }
    }
}

/// Raw ADC bounds of one stick plus the dead bands applied at its ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    /// Raw reading at the low mechanical stop.
    pub min: u16,
    /// Raw reading at the high mechanical stop.
    pub max: u16,
    /// Dead band above `min` (and above `mid` for bidirectional axes).
    pub margin_min: u16,
    /// Dead band below `max` (and below `mid` for bidirectional axes).
    pub margin_max: u16,
}

impl AxisCalibration {
    #[must_use]
    pub const fn new(min: u16, max: u16, margin_min: u16, margin_max: u16) -> Self {
        Self {
            min,
            max,
            margin_min,
            margin_max,
        }
    }

    #[inline]
    fn inner_min(&self) -> i32 {
        i32::from(self.min) + i32::from(self.margin_min)
    }

    #[inline]
    fn inner_max(&self) -> i32 {
        i32::from(self.max) - i32::from(self.margin_max)
    }
}

/// Calibration problems detected by [`AxisDescriptor::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The margins leave no usable travel (`min + margin_min >= max - margin_max`).
    EmptyRange,
    /// The lower segment `[min + margin_min, mid - margin_max]` is empty.
    EmptyLowerHalf,
    /// The upper segment `[mid + margin_min, max - margin_max]` is empty.
    EmptyUpperHalf,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange => write!(f, "margins leave no usable stick travel"),
            Self::EmptyLowerHalf => write!(f, "lower stick half has no usable travel"),
            Self::EmptyUpperHalf => write!(f, "upper stick half has no usable travel"),
        }
    }
}

/// Shape and calibration of one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisDescriptor {
    /// Single segment with no center (throttle).
    Unidirectional(AxisCalibration),
    /// Two segments split at `mid` with a centering deadzone.
    Bidirectional { calibration: AxisCalibration, mid: u16 },
}

impl AxisDescriptor {
    /// Check that every active segment has a positive span.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        match *self {
            AxisDescriptor::Unidirectional(cal) => {
                if cal.inner_max() - cal.inner_min() <= 0 {
                    return Err(CalibrationError::EmptyRange);
                }
            }
            AxisDescriptor::Bidirectional { calibration: cal, mid } => {
                let mid = i32::from(mid);
                let lower_max = mid - i32::from(cal.margin_max);
                let upper_min = mid + i32::from(cal.margin_min);
                if lower_max - cal.inner_min() <= 0 {
                    return Err(CalibrationError::EmptyLowerHalf);
                }
                if cal.inner_max() - upper_min <= 0 {
                    return Err(CalibrationError::EmptyUpperHalf);
                }
            }
        }
        Ok(())
    }

    /// Map a raw sample onto the normalized (inverted) output range.
    ///
    /// Total for every calibration: a degenerate segment degrades to a step
    /// instead of dividing by zero.
    #[must_use]
    pub fn normalize(&self, raw: u16) -> u16 {
        match *self {
            AxisDescriptor::Unidirectional(cal) => inverted_ramp(
                raw,
                cal.inner_min(),
                cal.inner_max(),
                FULL_SCALE,
                u32::from(FULL_SCALE),
            ),
            AxisDescriptor::Bidirectional { calibration: cal, mid } => {
                let sample = i32::from(raw);
                let mid = i32::from(mid);
                let upper_min = mid + i32::from(cal.margin_min);
                let lower_max = mid - i32::from(cal.margin_max);

                if sample > upper_min {
                    inverted_ramp(
                        raw,
                        upper_min,
                        cal.inner_max(),
                        HALF_SCALE,
                        u32::from(HALF_SCALE),
                    )
                } else if sample < lower_max {
                    inverted_ramp(
                        raw,
                        cal.inner_min(),
                        lower_max,
                        FULL_SCALE,
                        u32::from(HALF_SCALE),
                    )
                } else {
                    HALF_SCALE
                }
            }
        }
    }
}

/// `top - ceil(scale * (raw - inner_min) / span)`, saturating outside the
/// segment. Equals truncating `top - slope * delta` computed in real numbers.
fn inverted_ramp(raw: u16, inner_min: i32, inner_max: i32, top: u16, scale: u32) -> u16 {
    let sample = i32::from(raw);
    if sample < inner_min {
        return FULL_SCALE;
    }
    if sample > inner_max {
        return 0;
    }

    let span = inner_max - inner_min;
    if span <= 0 {
        return top;
    }

    // delta <= span <= 65535 and scale <= 65535, so the product fits in u32
    let delta = (sample - inner_min) as u32;
    let drop = (scale * delta).div_ceil(span as u32);
    u16::try_from(u32::from(top).saturating_sub(drop)).unwrap_or(0)
}

/// How a normalized value is represented on the wire and on the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputEncoding {
    /// Normalized value as-is: 0 = stick at max, 65535 = stick at min.
    Inverted,
    /// Normalized value minus [`HALF_SCALE`], carried as a two's complement i16.
    SignedCentered,
}

impl OutputEncoding {
    /// 16-bit word placed in the link packet.
    #[inline]
    #[must_use]
    pub const fn wire_value(self, normalized: u16) -> u16 {
        match self {
            OutputEncoding::Inverted => normalized,
            OutputEncoding::SignedCentered => normalized.wrapping_sub(HALF_SCALE),
        }
    }

    /// Value shown to the pilot for a normalized reading.
    #[inline]
    #[must_use]
    pub const fn display_value(self, normalized: u16) -> i32 {
        match self {
            OutputEncoding::Inverted => normalized as i32,
            OutputEncoding::SignedCentered => self.wire_value(normalized) as i16 as i32,
        }
    }
}
