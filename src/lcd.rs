//! HD44780 20x4 character display behind a PCF8574 I2C port expander.
//!
//! The expander drives the display in 4-bit mode:
//!
//! | Expander bit | Display pin |
//! |--------------|-------------|
//! | P0           | RS          |
//! | P1           | RW (held low) |
//! | P2           | EN          |
//! | P3           | Backlight   |
//! | P4-P7        | D4-D7       |

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use link_core::display::{Display, DisplayFrame, FieldPosition, LAYOUT};

/// 7-bit address of the expander (0x7E as an 8-bit write address).
pub const LCD_ADDRESS: u8 = 0x3F;

pub const COLUMNS: u8 = 20;
pub const ROWS: u8 = 4;

const RS: u8 = 1 << 0;
const EN: u8 = 1 << 2;
const BACKLIGHT: u8 = 1 << 3;

// Commands
const CLEAR_DISPLAY: u8 = 0x01;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON: u8 = 0x0C;
const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
const SET_DDRAM_ADDRESS: u8 = 0x80;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40, 0x14, 0x54];

const POWER_ON_DELAY_US: u32 = 50_000;
const CLEAR_DELAY_US: u32 = 2_000;
const COMMAND_DELAY_US: u32 = 50;

/// Character display driver.
pub struct Lcd<I2C, D> {
    i2c: I2C,
    delay: D,
    backlight: bool,
}

impl<I2C: I2c, D: DelayNs> Lcd<I2C, D> {
    /// Wrap the bus. Call [`Lcd::init`] before anything else.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            backlight: true,
        }
    }

    /// Reset the controller into 4-bit, two-line mode with the cursor hidden.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.delay.delay_us(POWER_ON_DELAY_US);

        // Three 8-bit function sets resynchronise the nibble phase whatever
        // state the controller was left in
        self.write_nibble(0x3, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x3, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x3, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x2, 0)?;

        self.command(FUNCTION_SET_4BIT_2LINE)?;
        self.command(DISPLAY_ON)?;
        self.clear()?;
        self.command(ENTRY_MODE_INCREMENT)
    }

    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_us(CLEAR_DELAY_US);
        Ok(())
    }

    /// Move the cursor. Positions outside the screen are clamped.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I2C::Error> {
        let row = row.min(ROWS - 1);
        let col = col.min(COLUMNS - 1);
        self.command(SET_DDRAM_ADDRESS | (ROW_OFFSETS[row as usize] + col))
    }

    /// Write ASCII text at the cursor.
    pub fn write_str(&mut self, text: &str) -> Result<(), I2C::Error> {
        for byte in text.bytes() {
            self.write_byte(byte, RS)?;
        }
        Ok(())
    }

    pub fn write_at(&mut self, position: FieldPosition, text: &str) -> Result<(), I2C::Error> {
        self.set_cursor(position.col, position.row)?;
        self.write_str(text)
    }

    /// Release the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, command: u8) -> Result<(), I2C::Error> {
        self.write_byte(command, 0)?;
        self.delay.delay_us(COMMAND_DELAY_US);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8, mode: u8) -> Result<(), I2C::Error> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    /// Present one nibble and latch it on the falling edge of EN.
    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I2C::Error> {
        let bits = (nibble << 4) | mode | self.backlight_bit();
        self.i2c.write(LCD_ADDRESS, &[bits | EN, bits])
    }

    #[inline]
    fn backlight_bit(&self) -> u8 {
        if self.backlight {
            BACKLIGHT
        } else {
            0
        }
    }
}

impl<I2C: I2c, D: DelayNs> Display for Lcd<I2C, D> {
    type Error = I2C::Error;

    fn draw_layout(&mut self) -> Result<(), Self::Error> {
        self.backlight = true;
        self.clear()?;
        for (row, line) in (0u8..).zip(LAYOUT) {
            self.set_cursor(0, row)?;
            self.write_str(line)?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &DisplayFrame) -> Result<(), Self::Error> {
        for (position, text) in frame.fields() {
            self.write_at(position, &text)?;
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = on;
        self.i2c.write(LCD_ADDRESS, &[self.backlight_bit()])
    }
}
