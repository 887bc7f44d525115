//! # Command Channel
//!
//! JSON commands arrive as byte chunks with each command wrapped in STX
//! (`0x02`) and ETX (`0x03`). [`CommandReader`] reassembles them into text;
//! [`Command`] is the parsed form.

pub mod button;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::Channels;
use crate::error::Result;
use crate::link::{LinkMode, LinkModeController};

pub use button::{parse_button, ButtonEvent};

/// Start of a command
pub const STX: u8 = 0x02;

/// End of a command
pub const ETX: u8 = 0x03;

/// Bounded reassembly buffer for framed commands.
#[derive(Debug)]
pub struct CommandReader {
    buffer: Vec<u8>,
    capacity: usize,
    receiving: bool,
    overflows: u64,
}

impl CommandReader {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            receiving: false,
            overflows: 0,
        }
    }

    /// Commands dropped because they did not fit the buffer.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Feeds a chunk and returns every command completed by it.
    ///
    /// Bytes outside an STX/ETX pair are ignored. A command longer than the
    /// buffer is dropped whole.
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        let mut completed = Vec::new();

        for &byte in data {
            match byte {
                STX => {
                    self.buffer.clear();
                    self.receiving = true;
                }
                ETX if self.receiving => {
                    self.receiving = false;
                    completed.push(String::from_utf8_lossy(&self.buffer).into_owned());
                    self.buffer.clear();
                }
                _ if !self.receiving => {}
                _ if self.buffer.len() >= self.capacity => {
                    self.overflows += 1;
                    warn!("Command exceeds {} bytes, dropping", self.capacity);
                    self.buffer.clear();
                    self.receiving = false;
                }
                _ => self.buffer.push(byte),
            }
        }

        completed
    }
}

/// A parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetMode { mode: LinkMode },
    /// `value` 0 releases the channel back to center
    SetChannel { channel: usize, value: u16 },
    Status,
}

impl Command {
    /// Parses one command from JSON text.
    ///
    /// # Examples
    ///
    /// ```
    /// use headtracker_link::command::Command;
    /// use headtracker_link::link::LinkMode;
    ///
    /// let command = Command::parse(r#"{"command":"set_mode","mode":"scan_only"}"#).unwrap();
    /// assert_eq!(command, Command::SetMode { mode: LinkMode::ScanOnly });
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies the command, returning a status report for [`Command::Status`].
    ///
    /// # Errors
    ///
    /// Returns error if a mode change fails to start the new link.
    pub fn apply(self, controller: &mut LinkModeController) -> Result<Option<StatusReport>> {
        match self {
            Command::SetMode { mode } => {
                controller.set_mode(mode)?;
                Ok(None)
            }
            Command::SetChannel { channel, value } => {
                debug!("Command: channel {} = {}", channel, value);
                controller.set_channel(channel, value);
                Ok(None)
            }
            Command::Status => Ok(Some(StatusReport::from_controller(controller))),
        }
    }
}

/// Link state reported back on the command channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub mode: LinkMode,
    pub address: String,
    pub rssi: i8,
    pub connected: bool,
    pub channels: Channels,
}

impl StatusReport {
    pub fn from_controller(controller: &LinkModeController) -> Self {
        Self {
            mode: controller.mode(),
            address: controller.address(),
            rssi: controller.rssi(),
            connected: controller.is_connected(),
            channels: controller.channels(),
        }
    }
}
