//! # SBUS Frame Decoder
//!
//! Byte-stream parser turning raw serial input into validated channel frames.
//!
//! SBUS has no length prefix and no escape sequence: a header byte starts a
//! frame only when the byte before it was a legal footer. The decoder drains
//! everything available on each call and keeps only the newest complete
//! frame, trading completeness for latency on a live control link.

use tracing::{debug, trace};

use super::packing::unpack_channels;
use super::protocol::*;
use crate::channel::{ChannelFrame, ChannelScaling};

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Discarding bytes until a header follows a footer
    Seeking,
    /// Collecting the remaining bytes of a frame
    Filling,
}

/// Incremental SBUS frame parser.
///
/// # Examples
///
/// ```
/// use headtracker_link::channel::ChannelFrame;
/// use headtracker_link::sbus::decoder::SbusDecoder;
/// use headtracker_link::sbus::encoder::SbusEncoder;
///
/// let encoder = SbusEncoder::default();
/// let mut decoder = SbusDecoder::default();
///
/// let sent = ChannelFrame::centered(1500);
/// let wire = encoder.encode(&sent);
/// let received = decoder.decode(wire.as_bytes()).unwrap();
/// assert_eq!(received.channels, sent.channels);
/// ```
#[derive(Debug, Clone)]
pub struct SbusDecoder {
    scaling: ChannelScaling,
    state: DecoderState,
    buffer: [u8; SBUS_FRAME_LEN],
    filled: usize,
    prev_byte: u8,
    framing_errors: u64,
    frames_decoded: u64,
}

impl Default for SbusDecoder {
    fn default() -> Self {
        Self::new(ChannelScaling::default())
    }
}

impl SbusDecoder {
    /// Creates a decoder scaling channels into the given PWM range.
    #[must_use]
    pub fn new(scaling: ChannelScaling) -> Self {
        Self {
            scaling,
            state: DecoderState::Seeking,
            buffer: [0; SBUS_FRAME_LEN],
            filled: 0,
            // Start of stream counts as a frame boundary
            prev_byte: SBUS_FOOTER,
            framing_errors: 0,
            frames_decoded: 0,
        }
    }

    /// Current parser state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Frames discarded because of a bad terminator.
    pub fn framing_errors(&self) -> u64 {
        self.framing_errors
    }

    /// Frames that passed validation.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Feeds one byte, returning a frame when this byte completes a valid one.
    pub fn push_byte(&mut self, byte: u8) -> Option<RawSbusFrame> {
        match self.state {
            DecoderState::Seeking => {
                if byte == SBUS_HEADER && is_footer(self.prev_byte) {
                    self.buffer[0] = byte;
                    self.filled = 1;
                    self.state = DecoderState::Filling;
                }
                self.prev_byte = byte;
                None
            }
            DecoderState::Filling => {
                self.buffer[self.filled] = byte;
                self.filled += 1;

                if self.filled < SBUS_FRAME_LEN {
                    self.prev_byte = byte;
                    return None;
                }

                self.filled = 0;
                self.state = DecoderState::Seeking;

                match RawSbusFrame::new(self.buffer) {
                    Some(frame) => {
                        self.prev_byte = byte;
                        self.frames_decoded += 1;
                        Some(frame)
                    }
                    None => {
                        self.framing_errors += 1;
                        debug!(
                            "SBUS framing error: bad terminator 0x{:02X} ({} total)",
                            byte, self.framing_errors
                        );
                        // The terminator slot still marks where the next
                        // frame should begin.
                        self.prev_byte = SBUS_FOOTER;
                        None
                    }
                }
            }
        }
    }

    /// Drains `bytes` and returns the most recently completed raw frame.
    ///
    /// Older frames completed in the same batch are dropped.
    pub fn poll_raw(&mut self, bytes: &[u8]) -> Option<RawSbusFrame> {
        let mut latest = None;
        for &byte in bytes {
            if let Some(frame) = self.push_byte(byte) {
                if latest.is_some() {
                    trace!("Dropping stale SBUS frame in favour of a newer one");
                }
                latest = Some(frame);
            }
        }
        latest
    }

    /// Drains `bytes` and returns the newest frame as scaled channel values.
    pub fn decode(&mut self, bytes: &[u8]) -> Option<ChannelFrame> {
        self.poll_raw(bytes).map(|raw| self.extract(&raw))
    }

    /// Extracts, scales and clamps the channels and flags of a raw frame.
    pub fn extract(&self, raw: &RawSbusFrame) -> ChannelFrame {
        let values = unpack_channels(&raw.packed());
        let flags = raw.flags();

        ChannelFrame {
            channels: values.map(|value| self.scaling.sbus_to_pwm(value)),
            lost_frame: flags.lost_frame,
            failsafe: flags.failsafe,
            ch17: flags.ch17,
            ch18: flags.ch18,
        }
    }
}
