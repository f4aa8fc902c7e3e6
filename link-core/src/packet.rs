//! Fixed 10-byte control packet.
//!
//! # Layout
//!
//! ```text
//! byte 0-1  throttle  (u16, little-endian)
//! byte 2-3  roll      (u16, little-endian)
//! byte 4-5  pitch     (u16, little-endian)
//! byte 6-7  yaw       (u16, little-endian)
//! byte 8    switches  (bit1 = switch 1, bit0 = switch 2)
//! byte 9    reserved  (always 0)
//! ```
//!
//! Axis words are whatever the configured [`OutputEncoding`](crate::OutputEncoding)
//! produced; the packet itself does not interpret them.

use core::fmt;

/// Size of every packet on the air.
pub const PACKET_SIZE: usize = 10;

const SWITCH_BYTE: usize = 8;
const RESERVED_BYTE: usize = 9;

/// State of the two panel switches.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Switches {
    pub switch1: bool,
    pub switch2: bool,
}

impl Switches {
    pub const SWITCH1_BIT: u8 = 1 << 1;
    pub const SWITCH2_BIT: u8 = 1 << 0;

    #[must_use]
    pub const fn new(switch1: bool, switch2: bool) -> Self {
        Self { switch1, switch2 }
    }

    /// Switch byte as it appears in the packet.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        ((self.switch1 as u8) << 1) | (self.switch2 as u8)
    }

    /// Decode a switch byte, rejecting unused bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !(Self::SWITCH1_BIT | Self::SWITCH2_BIT) != 0 {
            return None;
        }
        Some(Self {
            switch1: bits & Self::SWITCH1_BIT != 0,
            switch2: bits & Self::SWITCH2_BIT != 0,
        })
    }
}

/// Everything one control cycle puts on the air.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFrame {
    /// Wire words in [`Axis::ALL`](crate::Axis::ALL) order.
    pub axes: [u16; 4],
    pub switches: Switches,
}

/// Error type for packet decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Input is not exactly [`PACKET_SIZE`] bytes.
    Length,
    /// Unused switch bits or the reserved byte are non-zero.
    Reserved,
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "packet is not {} bytes", PACKET_SIZE),
            Self::Reserved => write!(f, "reserved packet bits set"),
        }
    }
}

/// Encoded link packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkPacket([u8; PACKET_SIZE]);

impl LinkPacket {
    /// Encode four axis words and the switch states.
    #[must_use]
    pub fn encode(
        throttle: u16,
        roll: u16,
        pitch: u16,
        yaw: u16,
        switch1: bool,
        switch2: bool,
    ) -> Self {
        Self::from(&ControlFrame {
            axes: [throttle, roll, pitch, yaw],
            switches: Switches::new(switch1, switch2),
        })
    }

    /// Decode a received packet back into a frame.
    pub fn decode(bytes: &[u8]) -> Result<ControlFrame, PacketError> {
        let bytes: &[u8; PACKET_SIZE] = bytes.try_into().map_err(|_| PacketError::Length)?;
        if bytes[RESERVED_BYTE] != 0 {
            return Err(PacketError::Reserved);
        }
        let switches = Switches::from_bits(bytes[SWITCH_BYTE]).ok_or(PacketError::Reserved)?;

        let mut axes = [0u16; 4];
        for (i, axis) in axes.iter_mut().enumerate() {
            *axis = u16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]);
        }

        Ok(ControlFrame { axes, switches })
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }
}

impl From<&ControlFrame> for LinkPacket {
    fn from(frame: &ControlFrame) -> Self {
        let mut bytes = [0u8; PACKET_SIZE];
        for (i, word) in frame.axes.iter().enumerate() {
            bytes[2 * i..2 * i + 2].copy_from_slice(&word.to_le_bytes());
        }
        bytes[SWITCH_BYTE] = frame.switches.bits();
        bytes[RESERVED_BYTE] = 0;
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_little_endian_in_axis_order() {
        let packet = LinkPacket::encode(0x1234, 0xABCD, 0x00FF, 0x8000, false, false);
        assert_eq!(
            packet.as_bytes(),
            &[0x34, 0x12, 0xCD, 0xAB, 0xFF, 0x00, 0x00, 0x80, 0x00, 0x00]
        );
    }

    #[test]
    fn test_switch_byte_mapping() {
        let s1 = LinkPacket::encode(0, 0, 0, 0, true, false);
        assert_eq!(s1.as_bytes()[8], 0b10);

        let s2 = LinkPacket::encode(0, 0, 0, 0, false, true);
        assert_eq!(s2.as_bytes()[8], 0b01);

        let both = LinkPacket::encode(0, 0, 0, 0, true, true);
        assert_eq!(both.as_bytes()[8], 0b11);
    }

    #[test]
    fn test_reserved_byte_always_zero() {
        let packet = LinkPacket::encode(u16::MAX, u16::MAX, u16::MAX, u16::MAX, true, true);
        assert_eq!(packet.as_bytes()[9], 0);
    }

    #[test]
    fn test_decode_reproduces_inputs() {
        let samples = [0u16, 1, 0x00FF, 0x0100, 0x7FFF, 0x8000, 0xFFFE, 0xFFFF];
        for (i, &a) in samples.iter().enumerate() {
            let b = samples[(i + 3) % samples.len()];
            let c = samples[(i + 5) % samples.len()];
            let d = samples[(i + 6) % samples.len()];
            for bits in 0..4u8 {
                let switch1 = bits & 0b10 != 0;
                let switch2 = bits & 0b01 != 0;
                let packet = LinkPacket::encode(a, b, c, d, switch1, switch2);
                let frame = LinkPacket::decode(packet.as_bytes()).unwrap();
                assert_eq!(frame.axes, [a, b, c, d]);
                assert_eq!(frame.switches, Switches::new(switch1, switch2));
            }
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(LinkPacket::decode(&[0u8; 9]), Err(PacketError::Length));
        assert_eq!(LinkPacket::decode(&[0u8; 11]), Err(PacketError::Length));

        let mut bytes = [0u8; PACKET_SIZE];
        bytes[9] = 1;
        assert_eq!(LinkPacket::decode(&bytes), Err(PacketError::Reserved));

        let mut bytes = [0u8; PACKET_SIZE];
        bytes[8] = 0b100;
        assert_eq!(LinkPacket::decode(&bytes), Err(PacketError::Reserved));
    }
}
