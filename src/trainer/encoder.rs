//! # Trainer Frame Encoder
//!
//! Encodes 16 channels into a byte-stuffed, XOR-terminated trainer frame.
//!
//! Every byte goes through a bounded writer: a frame that would grow past
//! the configured line length is rejected with
//! [`HeadLinkError::BufferOverflow`] instead of being truncated.

use bytes::{BufMut, Bytes, BytesMut};

use super::checksum::XorChecksum;
use super::protocol::*;
use crate::channel::Channels;
use crate::error::{HeadLinkError, Result};

/// Bounded output buffer with stuffing and a running checksum.
struct FrameWriter {
    buf: BytesMut,
    capacity: usize,
    checksum: XorChecksum,
}

impl FrameWriter {
    fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
            checksum: XorChecksum::new(),
        }
    }

    /// Writes a byte verbatim.
    fn put_raw(&mut self, byte: u8) -> Result<()> {
        if self.buf.len() >= self.capacity {
            return Err(HeadLinkError::BufferOverflow {
                capacity: self.capacity,
            });
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Writes a byte, escaping delimiter and escape values.
    fn put_stuffed(&mut self, byte: u8) -> Result<()> {
        if byte == START_STOP || byte == BYTE_STUFF {
            self.put_raw(BYTE_STUFF)?;
            self.put_raw(byte ^ STUFF_MASK)
        } else {
            self.put_raw(byte)
        }
    }

    /// Folds the unescaped byte into the checksum, then writes it stuffed.
    fn push(&mut self, byte: u8) -> Result<()> {
        self.checksum.update(byte);
        self.put_stuffed(byte)
    }

    fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Builds trainer frames for the BLE notification characteristic.
///
/// # Examples
///
/// ```
/// use headtracker_link::trainer::encoder::TrainerEncoder;
///
/// let frame = TrainerEncoder::new().encode(&[1500; 16]).unwrap();
/// assert_eq!(frame[0], 0x7E);
/// assert_eq!(frame[frame.len() - 1], 0x7E);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TrainerEncoder {
    capacity: usize,
}

impl Default for TrainerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainerEncoder {
    /// Encoder bounded by [`BLUETOOTH_LINE_LENGTH`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: BLUETOOTH_LINE_LENGTH,
        }
    }

    /// Encoder bounded by a smaller line length. Larger values are capped
    /// at [`BLUETOOTH_LINE_LENGTH`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.min(BLUETOOTH_LINE_LENGTH),
        }
    }

    /// Line length this encoder will not exceed.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Encode 16 channel values into a complete trainer frame
    ///
    /// # Arguments
    ///
    /// * `channels` - 16 channel values; only the low 12 bits are sent
    ///
    /// # Returns
    ///
    /// * `Result<Bytes>` - start sentinel, stuffed payload and checksum, end sentinel
    ///
    /// # Errors
    ///
    /// Returns [`HeadLinkError::BufferOverflow`] if the stuffed frame would
    /// exceed the line length. Nothing past the bound is ever written.
    pub fn encode(&self, channels: &Channels) -> Result<Bytes> {
        let mut writer = FrameWriter::new(self.capacity);

        writer.put_raw(START_STOP)?;
        writer.push(TRAINER_FRAME)?;
        for pair in channels.chunks_exact(2) {
            for byte in pack_pair(pair[0], pair[1]) {
                writer.push(byte)?;
            }
        }

        let checksum = writer.checksum.value();
        writer.put_stuffed(checksum)?;
        writer.put_raw(START_STOP)?;

        Ok(writer.finish())
    }
}
