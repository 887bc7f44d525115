//! # Trainer Protocol Module
//!
//! PPM-trainer framing carried over a BLE characteristic.
//!
//! This module handles:
//! - Packing 16 channels as 12-bit values, two channels per three bytes
//! - Byte-stuffing of the `0x7E` sentinel and `0x7D` escape values
//! - Running XOR checksum over the unescaped payload
//! - Bounded, checked frame buffers
//! - Decoding frames received from a remote head unit

pub mod protocol;
pub mod checksum;
pub mod encoder;
pub mod decoder;
