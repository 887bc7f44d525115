//! # Trainer Protocol Constants
//!
//! Frame layout (before stuffing):
//!
//! ```text
//! 0x7E | 0x80 | 8 × [c0 lo8, c0 hi4 << 4 | c1 mid4, c1 lo4 << 4 | c1 hi4] | xor | 0x7E
//! ```

use crate::channel::NUM_CHANNELS;

/// Frame delimiter, sent unescaped at both ends
pub const START_STOP: u8 = 0x7E;

/// Escape prefix for in-band delimiter or escape bytes
pub const BYTE_STUFF: u8 = 0x7D;

/// XOR applied to an escaped byte
pub const STUFF_MASK: u8 = 0x20;

/// Trainer frame type
pub const TRAINER_FRAME: u8 = 0x80;

/// Largest frame the BLE line accepts
pub const BLUETOOTH_LINE_LENGTH: usize = 64;

/// Channel value range carried on the wire (12-bit)
pub const TRAINER_VALUE_MAX: u16 = 0x0FFF;

/// Unescaped payload: frame type + 3 bytes per channel pair
pub const TRAINER_PAYLOAD_LEN: usize = 1 + NUM_CHANNELS / 2 * 3;

/// Worst case on the wire: both sentinels plus payload and checksum all stuffed
pub const TRAINER_MAX_STUFFED_LEN: usize = 2 + (TRAINER_PAYLOAD_LEN + 1) * 2;

/// Packs a channel pair into three bytes.
#[inline]
pub fn pack_pair(c0: u16, c1: u16) -> [u8; 3] {
    [
        (c0 & 0x00FF) as u8,
        (((c0 & 0x0F00) >> 4) | ((c1 & 0x00F0) >> 4)) as u8,
        (((c1 & 0x000F) << 4) | ((c1 & 0x0F00) >> 8)) as u8,
    ]
}

/// Unpacks three bytes into a channel pair.
#[inline]
pub fn unpack_pair(bytes: [u8; 3]) -> (u16, u16) {
    let [b0, b1, b2] = bytes.map(u16::from);
    let c0 = b0 | ((b1 & 0xF0) << 4);
    let c1 = ((b1 & 0x0F) << 4) | (b2 >> 4) | ((b2 & 0x0F) << 8);
    (c0, c1)
}
