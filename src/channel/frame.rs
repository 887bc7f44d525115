//! Decoded channel frame.

use super::{Channels, NUM_CHANNELS, PPM_CENTER};

/// One complete set of channel values plus the SBUS status bits.
///
/// A frame is only ever built from a fully validated wire frame, so consumers
/// never observe a partially decoded set of channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFrame {
    /// Channel values in PWM microseconds, clamped to the configured range
    pub channels: Channels,
    /// Receiver reported a lost frame (SBUS only)
    pub lost_frame: bool,
    /// Receiver is in failsafe (SBUS only)
    pub failsafe: bool,
    /// Digital channel 17 (SBUS only)
    pub ch17: bool,
    /// Digital channel 18 (SBUS only)
    pub ch18: bool,
}

impl Default for ChannelFrame {
    fn default() -> Self {
        Self::centered(PPM_CENTER)
    }
}

impl ChannelFrame {
    /// Creates a frame with every channel at `center` and all flags cleared.
    #[must_use]
    pub fn centered(center: u16) -> Self {
        Self::from_channels([center; NUM_CHANNELS])
    }

    /// Creates a frame from channel values with all flags cleared.
    #[must_use]
    pub fn from_channels(channels: Channels) -> Self {
        Self {
            channels,
            lost_frame: false,
            failsafe: false,
            ch17: false,
            ch18: false,
        }
    }

    /// Returns a channel value, or `None` for an index past the last channel.
    pub fn channel(&self, index: usize) -> Option<u16> {
        self.channels.get(index).copied()
    }
}
