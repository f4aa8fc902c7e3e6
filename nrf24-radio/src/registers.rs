//! nRF24L01+ register map and SPI commands.

// Registers
pub const CONFIG: u8 = 0x00;
pub const EN_AA: u8 = 0x01;
pub const EN_RXADDR: u8 = 0x02;
pub const SETUP_AW: u8 = 0x03;
pub const SETUP_RETR: u8 = 0x04;
pub const RF_CH: u8 = 0x05;
pub const RF_SETUP: u8 = 0x06;
pub const STATUS: u8 = 0x07;
pub const RX_ADDR_P0: u8 = 0x0A;
pub const TX_ADDR: u8 = 0x10;
pub const RX_PW_P0: u8 = 0x11;

/// Highest register address reachable with `R_REGISTER`/`W_REGISTER`.
pub const REGISTER_MASK: u8 = 0x1F;

// Commands
pub const R_REGISTER: u8 = 0x00;
pub const W_REGISTER: u8 = 0x20;
pub const R_RX_PAYLOAD: u8 = 0x61;
pub const W_TX_PAYLOAD: u8 = 0xA0;
pub const FLUSH_TX: u8 = 0xE1;
pub const NOP: u8 = 0xFF;

// CONFIG bits
pub const PRIM_RX: u8 = 1 << 0;
pub const PWR_UP: u8 = 1 << 1;
pub const CRCO: u8 = 1 << 2;
pub const EN_CRC: u8 = 1 << 3;

// RF_SETUP bits
pub const RF_DR_HIGH: u8 = 1 << 3;
pub const RF_DR_LOW: u8 = 1 << 5;

/// Largest payload the FIFOs hold.
pub const MAX_PAYLOAD: usize = 32;

/// Data pipes 0-5.
pub const PIPE_COUNT: u8 = 6;

/// Lowest carrier frequency (channel 0).
pub const BASE_FREQUENCY_MHZ: u16 = 2400;

/// Highest channel number.
pub const MAX_CHANNEL: u16 = 125;

/// Auto-retransmit delay step and range.
pub const RETRANSMIT_STEP_US: u16 = 250;
pub const MAX_RETRANSMIT_DELAY_US: u16 = 4000;
pub const MAX_RETRANSMIT_COUNT: u8 = 15;

/// Power-down to standby settling time with an external clock.
pub const POWER_UP_DELAY_US: u32 = 4500;

/// Minimum chip-enable pulse that starts a transmission.
pub const CE_PULSE_US: u32 = 10;
