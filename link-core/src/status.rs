//! Transceiver status register flags.

use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Address of the status register; writing a flag bit back clears it.
pub const STATUS_REGISTER: u8 = 0x07;

/// Raw value of the transceiver status register.
///
/// Several flags can be asserted in a single read and each must be handled.
///
/// # Example
///
/// ```
/// use link_core::RadioStatus;
///
/// let status = RadioStatus(0x20 | 0x40 | (1 << 1));
/// assert!(status.contains(RadioStatus::TX_SENT));
/// assert!(status.contains(RadioStatus::RX_RECEIVED));
/// assert_eq!(status.rx_pipe(), Some(1));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioStatus(pub u8);

impl RadioStatus {
    pub const TX_FIFO_FULL: Self = Self(1 << 0);
    pub const MAX_RETRANSMITS: Self = Self(1 << 4);
    pub const TX_SENT: Self = Self(1 << 5); // Acked when auto-ack is on
    pub const RX_RECEIVED: Self = Self(1 << 6);

    /// Every flag that drives the IRQ line low.
    pub const INTERRUPT_FLAGS: Self = Self(0x70);

    /// Bits 1-3: pipe number of the payload at the head of the RX FIFO.
    pub const RX_PIPE_MASK: u8 = 0b0000_1110;

    /// Pipe field value reported when the RX FIFO is empty.
    pub const RX_FIFO_EMPTY: u8 = 0b111;

    /// Register read value meaning the status is not ready yet.
    pub const NOT_READY: Self = Self(0);

    /// Check if all of the given flag(s) are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, flags: RadioStatus) -> bool {
        (self.0 & flags.0) == flags.0
    }

    #[inline]
    #[must_use]
    pub const fn is_not_ready(self) -> bool {
        self.0 == Self::NOT_READY.0
    }

    /// Pipe holding the received payload, or `None` if the field does not
    /// name a data pipe (FIFO empty or reserved value).
    #[inline]
    #[must_use]
    pub const fn rx_pipe(self) -> Option<u8> {
        let pipe = (self.0 & Self::RX_PIPE_MASK) >> 1;
        if pipe <= 5 {
            Some(pipe)
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for RadioStatus {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RadioStatus {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for RadioStatus {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
