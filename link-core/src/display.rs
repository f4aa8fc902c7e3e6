//! Character display contents.
//!
//! The screen is a 20x4 character panel. Static labels are drawn once by
//! [`Display::draw_layout`]; each refresh then overwrites only the value
//! fields listed by [`DisplayFrame::fields`].
//!
//! ```text
//! Battery tx: 12.34V
//! Battery QC:  9.65V 100
//! T:65535    R:-1234
//! P:  0      Y: 512
//! ```

use core::fmt::{Debug, Write};

use heapless::String;

/// Width of the widest rendered field.
pub const FIELD_WIDTH: usize = 8;

/// Rendered text of one field.
pub type FieldText = String<FIELD_WIDTH>;

/// Static labels, one entry per row.
pub const LAYOUT: [&str; 4] = [
    "Battery tx:     V",
    "Battery QC:     V",
    "T:       R: ",
    "P:       Y: ",
];

/// Zero-based cursor position of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldPosition {
    pub col: u8,
    pub row: u8,
}

impl FieldPosition {
    #[must_use]
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }
}

pub const TX_BATTERY_FIELD: FieldPosition = FieldPosition::new(11, 0);
pub const DRONE_BATTERY_FIELD: FieldPosition = FieldPosition::new(11, 1);

/// Stick value fields in [`Axis::ALL`](crate::Axis::ALL) order.
pub const STICK_FIELDS: [FieldPosition; 4] = [
    FieldPosition::new(2, 2),
    FieldPosition::new(11, 2),
    FieldPosition::new(2, 3),
    FieldPosition::new(11, 3),
];

/// Widest stick field that stays clear of the right-hand label at column 9.
pub const STICK_FIELD_WIDTH: usize = 7;

/// Right of the drone battery label.
pub const LINK_QUALITY_FIELD: FieldPosition = FieldPosition::new(17, 1);

/// Number of fields in one frame.
pub const FIELD_COUNT: usize = 7;

/// Everything shown on one display refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    /// Transmitter battery in centivolts.
    pub tx_battery_cv: i32,
    /// Drone battery in centivolts, `None` until telemetry has arrived.
    pub drone_battery_cv: Option<i32>,
    /// Stick values as presented to the pilot.
    pub sticks: [i32; 4],
    /// Smoothed link quality, 0-100.
    pub link_quality: u8,
}

impl DisplayFrame {
    /// Every value field with its position and rendered text.
    #[must_use]
    pub fn fields(&self) -> [(FieldPosition, FieldText); FIELD_COUNT] {
        [
            (TX_BATTERY_FIELD, format_centivolts(Some(self.tx_battery_cv))),
            (DRONE_BATTERY_FIELD, format_centivolts(self.drone_battery_cv)),
            (STICK_FIELDS[0], format_stick(self.sticks[0])),
            (STICK_FIELDS[1], format_stick(self.sticks[1])),
            (STICK_FIELDS[2], format_stick(self.sticks[2])),
            (STICK_FIELDS[3], format_stick(self.sticks[3])),
            (LINK_QUALITY_FIELD, format_quality(self.link_quality)),
        ]
    }
}

/// Render a voltage into the five-character slot in front of the `V` label.
///
/// Values are clamped to `0.00..=99.99`; a missing reading shows dashes.
#[must_use]
pub fn format_centivolts(centivolts: Option<i32>) -> FieldText {
    let mut out = FieldText::new();
    let Some(cv) = centivolts else {
        let _ = out.push_str(" -.--");
        return out;
    };
    let cv = cv.clamp(0, 9999);
    let pad = if cv < 1000 { " " } else { "" };
    // Fits: at most five characters
    let _ = write!(out, "{}{}.{:02}", pad, cv / 100, cv % 100);
    out
}

/// Render a stick value, padded so a shorter value erases a longer one.
#[must_use]
pub fn format_stick(value: i32) -> FieldText {
    let mut out = FieldText::new();
    let _ = if value <= -10000 {
        write!(out, "{}", value)
    } else if value >= 10000 || value <= -1000 {
        write!(out, "{} ", value)
    } else if value >= 1000 || value <= -100 {
        write!(out, "{}  ", value)
    } else if value >= 100 {
        write!(out, " {} ", value)
    } else if value <= -10 {
        write!(out, "  {}  ", value)
    } else {
        write!(out, "  {}   ", value)
    };
    out
}

/// Render link quality right-aligned in three characters.
#[must_use]
pub fn format_quality(quality: u8) -> FieldText {
    let mut out = FieldText::new();
    let _ = write!(out, "{:>3}", quality.min(100));
    out
}

/// Trait for the character display.
///
/// Implementations position the cursor and write text; all formatting is
/// done by [`DisplayFrame::fields`].
pub trait Display {
    /// Bus error reported by the display.
    type Error: Debug;

    /// Clear the screen, draw [`LAYOUT`] and switch the backlight on.
    fn draw_layout(&mut self) -> Result<(), Self::Error>;

    /// Overwrite the value fields with `frame`.
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), Self::Error>;

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}
