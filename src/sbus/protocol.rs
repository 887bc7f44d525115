//! # SBUS Protocol Constants and Types
//!
//! Core wire definitions for SBUS: a 25-byte frame with no length field and
//! no checksum, synchronized only by its header and footer values.

use crate::channel::NUM_CHANNELS;

/// SBUS frame length in bytes
pub const SBUS_FRAME_LEN: usize = 25;

/// Frame header byte
pub const SBUS_HEADER: u8 = 0x0F;

/// Standard frame footer byte
pub const SBUS_FOOTER: u8 = 0x00;

/// Footer variant, matched against the low nibble only (SBUS2 telemetry slots)
pub const SBUS_FOOTER2: u8 = 0x04;

/// Packed channel data size (16 channels × 11 bits)
pub const SBUS_PACKED_LEN: usize = 22;

/// Offset of the flag byte
pub const SBUS_FLAGS_OFFSET: usize = 23;

/// Channel value range (11-bit: 0-2047)
pub const SBUS_VALUE_MAX: u16 = 0x07FF;

/// Raw value that maps to the PWM center
pub const SBUS_CENTER: u16 = 992;

/// Raw SBUS counts per PWM microsecond
pub const SBUS_SCALE: f32 = 1.6;

/// Serial line speed
pub const SBUS_BAUD_RATE: u32 = 100_000;

/// Flag byte bits
pub const FLAG_CH17: u8 = 0x01;
pub const FLAG_CH18: u8 = 0x02;
pub const FLAG_LOST_FRAME: u8 = 0x04;
pub const FLAG_FAILSAFE: u8 = 0x08;

/// Raw 11-bit channel values
pub type SbusChannels = [u16; NUM_CHANNELS];

/// Returns true for a byte that may terminate a frame.
///
/// Either the exact footer value, or any byte whose low nibble is the SBUS2
/// footer variant.
#[inline]
pub fn is_footer(byte: u8) -> bool {
    byte == SBUS_FOOTER || (byte & 0x0F) == SBUS_FOOTER2
}

/// Status bits carried in byte 23.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SbusFlags {
    pub ch17: bool,
    pub ch18: bool,
    pub lost_frame: bool,
    pub failsafe: bool,
}

impl SbusFlags {
    /// Decodes the flag byte.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            ch17: byte & FLAG_CH17 != 0,
            ch18: byte & FLAG_CH18 != 0,
            lost_frame: byte & FLAG_LOST_FRAME != 0,
            failsafe: byte & FLAG_FAILSAFE != 0,
        }
    }

    /// Encodes the flag byte.
    pub fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.ch17 {
            byte |= FLAG_CH17;
        }
        if self.ch18 {
            byte |= FLAG_CH18;
        }
        if self.lost_frame {
            byte |= FLAG_LOST_FRAME;
        }
        if self.failsafe {
            byte |= FLAG_FAILSAFE;
        }
        byte
    }
}

/// A complete, terminator-validated 25-byte SBUS frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSbusFrame(pub(super) [u8; SBUS_FRAME_LEN]);

impl RawSbusFrame {
    /// Wraps 25 bytes, checking the header and footer.
    ///
    /// Returns `None` if the first byte is not the header or the last byte
    /// is not a legal footer.
    pub fn new(bytes: [u8; SBUS_FRAME_LEN]) -> Option<Self> {
        if bytes[0] != SBUS_HEADER || !is_footer(bytes[SBUS_FRAME_LEN - 1]) {
            return None;
        }
        Some(Self(bytes))
    }

    /// The 22 packed channel bytes (offsets 1..=22).
    pub fn packed(&self) -> [u8; SBUS_PACKED_LEN] {
        let mut packed = [0u8; SBUS_PACKED_LEN];
        packed.copy_from_slice(&self.0[1..1 + SBUS_PACKED_LEN]);
        packed
    }

    /// Status flags from byte 23.
    pub fn flags(&self) -> SbusFlags {
        SbusFlags::from_byte(self.0[SBUS_FLAGS_OFFSET])
    }

    /// Wire bytes.
    pub fn as_bytes(&self) -> &[u8; SBUS_FRAME_LEN] {
        &self.0
    }
}
