//! # SBUS Channel Packing
//!
//! Packs 16 channels (11 bits each) into 22 bytes and back.
//! Channels form a continuous bitstream, LSB first:
//!
//! ```text
//! Byte 0: Ch1[0:7]
//! Byte 1: Ch1[8:10] | Ch2[0:4]
//! Byte 2: Ch2[5:10] | Ch3[0:1]
//! Byte 3: Ch3[2:9]
//! Byte 4: Ch3[10]   | Ch4[0:6]
//! ...
//! ```
//!
//! The shift table is written out per byte. It is the SBUS wire format and
//! must not drift by a single bit.

use super::protocol::{SbusChannels, SBUS_PACKED_LEN, SBUS_VALUE_MAX};

/// Packs 16 raw channel values into the 22 SBUS data bytes.
///
/// Values wider than 11 bits are masked.
pub fn pack_channels(channels: &SbusChannels) -> [u8; SBUS_PACKED_LEN] {
    let ch: [u16; 16] = core::array::from_fn(|i| channels[i] & SBUS_VALUE_MAX);
    let mut data = [0u8; SBUS_PACKED_LEN];

    data[0] = ch[0] as u8;
    data[1] = (ch[0] >> 8 | ch[1] << 3) as u8;
    data[2] = (ch[1] >> 5 | ch[2] << 6) as u8;
    data[3] = (ch[2] >> 2) as u8;
    data[4] = (ch[2] >> 10 | ch[3] << 1) as u8;
    data[5] = (ch[3] >> 7 | ch[4] << 4) as u8;
    data[6] = (ch[4] >> 4 | ch[5] << 7) as u8;
    data[7] = (ch[5] >> 1) as u8;
    data[8] = (ch[5] >> 9 | ch[6] << 2) as u8;
    data[9] = (ch[6] >> 6 | ch[7] << 5) as u8;
    data[10] = (ch[7] >> 3) as u8;
    data[11] = ch[8] as u8;
    data[12] = (ch[8] >> 8 | ch[9] << 3) as u8;
    data[13] = (ch[9] >> 5 | ch[10] << 6) as u8;
    data[14] = (ch[10] >> 2) as u8;
    data[15] = (ch[10] >> 10 | ch[11] << 1) as u8;
    data[16] = (ch[11] >> 7 | ch[12] << 4) as u8;
    data[17] = (ch[12] >> 4 | ch[13] << 7) as u8;
    data[18] = (ch[13] >> 1) as u8;
    data[19] = (ch[13] >> 9 | ch[14] << 2) as u8;
    data[20] = (ch[14] >> 6 | ch[15] << 5) as u8;
    data[21] = (ch[15] >> 3) as u8;

    data
}

/// Unpacks the 22 SBUS data bytes into 16 raw 11-bit channel values.
pub fn unpack_channels(data: &[u8; SBUS_PACKED_LEN]) -> SbusChannels {
    let d: [u16; SBUS_PACKED_LEN] = core::array::from_fn(|i| u16::from(data[i]));
    let mut ch = [SBUS_VALUE_MAX; 16];

    ch[0] &= d[0] | d[1] << 8;
    ch[1] &= d[1] >> 3 | d[2] << 5;
    ch[2] &= d[2] >> 6 | d[3] << 2 | d[4] << 10;
    ch[3] &= d[4] >> 1 | d[5] << 7;
    ch[4] &= d[5] >> 4 | d[6] << 4;
    ch[5] &= d[6] >> 7 | d[7] << 1 | d[8] << 9;
    ch[6] &= d[8] >> 2 | d[9] << 6;
    ch[7] &= d[9] >> 5 | d[10] << 3;
    ch[8] &= d[11] | d[12] << 8;
    ch[9] &= d[12] >> 3 | d[13] << 5;
    ch[10] &= d[13] >> 6 | d[14] << 2 | d[15] << 10;
    ch[11] &= d[15] >> 1 | d[16] << 7;
    ch[12] &= d[16] >> 4 | d[17] << 4;
    ch[13] &= d[17] >> 7 | d[18] << 1 | d[19] << 9;
    ch[14] &= d[19] >> 2 | d[20] << 6;
    ch[15] &= d[20] >> 5 | d[21] << 3;

    ch
}
