//! # Trainer Frame Decoder
//!
//! Receive side of the trainer protocol, used when this unit listens to a
//! remote head over BLE. Bytes arrive in arbitrary notification-sized
//! chunks; the decoder unstuffs them between `0x7E` sentinels and only
//! yields channels from frames whose type and checksum check out.

use tracing::{debug, warn};

use super::checksum::xor_checksum;
use super::protocol::*;
use crate::channel::{Channels, NUM_CHANNELS};

/// Unescaped frame size: payload plus checksum
const FRAME_BODY_LEN: usize = TRAINER_PAYLOAD_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for a start sentinel
    Idle,
    /// Inside a frame
    Receiving,
    /// Previous byte was the escape prefix
    Escaped,
}

/// Incremental trainer frame parser.
#[derive(Debug, Clone)]
pub struct TrainerDecoder {
    state: State,
    body: Vec<u8>,
    errors: u64,
}

impl Default for TrainerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainerDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            body: Vec::with_capacity(FRAME_BODY_LEN),
            errors: 0,
        }
    }

    /// Frames dropped for overflow, bad type, bad escape or checksum mismatch.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Feeds one byte, returning channels when it closes a valid frame.
    pub fn push_byte(&mut self, byte: u8) -> Option<Channels> {
        if byte == START_STOP {
            let result = match self.state {
                State::Receiving if !self.body.is_empty() => self.finish(),
                State::Escaped => {
                    self.reject("dangling escape at end of frame");
                    None
                }
                _ => None,
            };
            // A closing sentinel doubles as the opening one of the next frame
            self.body.clear();
            self.state = State::Receiving;
            return result;
        }

        let byte = match self.state {
            State::Idle => return None,
            State::Receiving if byte == BYTE_STUFF => {
                self.state = State::Escaped;
                return None;
            }
            State::Receiving => byte,
            State::Escaped => {
                self.state = State::Receiving;
                byte ^ STUFF_MASK
            }
        };

        if self.body.len() >= FRAME_BODY_LEN {
            warn!("Trainer frame longer than {} bytes, dropping", FRAME_BODY_LEN);
            self.errors += 1;
            self.body.clear();
            self.state = State::Idle;
            return None;
        }
        self.body.push(byte);
        None
    }

    /// Feeds a chunk, returning channels from the last valid frame in it.
    pub fn decode(&mut self, data: &[u8]) -> Option<Channels> {
        data.iter().fold(None, |latest, &byte| self.push_byte(byte).or(latest))
    }

    fn finish(&mut self) -> Option<Channels> {
        if self.body.len() != FRAME_BODY_LEN {
            self.reject("short frame");
            return None;
        }
        if self.body[0] != TRAINER_FRAME {
            self.reject("unknown frame type");
            return None;
        }

        let (payload, checksum) = self.body.split_at(TRAINER_PAYLOAD_LEN);
        if xor_checksum(payload) != checksum[0] {
            self.reject("checksum mismatch");
            return None;
        }

        let mut channels = [0u16; NUM_CHANNELS];
        for (pair, bytes) in payload[1..].chunks_exact(3).enumerate() {
            let (c0, c1) = unpack_pair([bytes[0], bytes[1], bytes[2]]);
            channels[pair * 2] = c0;
            channels[pair * 2 + 1] = c1;
        }
        Some(channels)
    }

    fn reject(&mut self, reason: &str) {
        self.errors += 1;
        debug!("Trainer frame dropped: {} ({} total)", reason, self.errors);
    }
}
