//! # SBUS Frame Encoder
//!
//! Encodes channel frames into 25-byte SBUS frames, and hands finished frames
//! to the transmit worker through [`SbusOutput`].

use std::sync::Mutex;

use super::packing::pack_channels;
use super::protocol::*;
use crate::channel::{ChannelFrame, ChannelScaling};

/// Encode raw 11-bit channel values and flags into a complete SBUS frame
///
/// # Arguments
///
/// * `channels` - Array of 16 raw channel values (11-bit: 0-2047, wider values are masked)
/// * `flags` - Status bits for byte 23
///
/// # Returns
///
/// * `RawSbusFrame` - header + 22 packed bytes + flags + footer `0x00`
pub fn encode_sbus_frame(channels: &SbusChannels, flags: SbusFlags) -> RawSbusFrame {
    let mut bytes = [0u8; SBUS_FRAME_LEN];
    bytes[0] = SBUS_HEADER;
    bytes[1..1 + SBUS_PACKED_LEN].copy_from_slice(&pack_channels(channels));
    bytes[SBUS_FLAGS_OFFSET] = flags.to_byte();
    bytes[SBUS_FRAME_LEN - 1] = SBUS_FOOTER;

    RawSbusFrame(bytes)
}

/// Converts PWM channel frames into SBUS wire frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct SbusEncoder {
    scaling: ChannelScaling,
}

impl SbusEncoder {
    #[must_use]
    pub fn new(scaling: ChannelScaling) -> Self {
        Self { scaling }
    }

    /// Scales every channel to SBUS raw and packs the frame.
    pub fn encode(&self, frame: &ChannelFrame) -> RawSbusFrame {
        let raw = frame.channels.map(|pwm| self.scaling.pwm_to_sbus(pwm));
        let flags = SbusFlags {
            ch17: frame.ch17,
            ch18: frame.ch18,
            lost_frame: frame.lost_frame,
            failsafe: frame.failsafe,
        };
        encode_sbus_frame(&raw, flags)
    }
}

/// Outbound frame slot shared between the encoder and the transmitter.
///
/// Frames are always built outside the lock and swapped in whole, and the
/// transmitter copies the current frame out under the same lock, so a
/// transmit can never observe a half-written frame. Until the first frame is
/// published there is nothing to send.
#[derive(Debug, Default)]
pub struct SbusOutput {
    current: Mutex<Option<RawSbusFrame>>,
}

impl SbusOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the outbound frame.
    pub fn publish(&self, frame: RawSbusFrame) {
        let mut slot = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(frame);
    }

    /// Encodes `frame` and publishes the result.
    pub fn publish_channels(&self, encoder: &SbusEncoder, frame: &ChannelFrame) {
        let raw = encoder.encode(frame);
        self.publish(raw);
    }

    /// Copy of the frame to transmit next, if any has been published.
    pub fn latest(&self) -> Option<RawSbusFrame> {
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
