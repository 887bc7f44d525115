//! Bitmap of channels currently driven by an external value.

use super::NUM_CHANNELS;

/// 16-bit set of overridden channels, bit `n` for channel `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelOverrideMask(u16);

impl Default for ChannelOverrideMask {
    /// Every channel starts out flagged as overridden until told otherwise.
    fn default() -> Self {
        Self::all()
    }
}

impl ChannelOverrideMask {
    /// Mask with every channel flagged.
    #[must_use]
    pub const fn all() -> Self {
        Self(u16::MAX)
    }

    /// Mask with no channel flagged.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bitmap as published on the override characteristic.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether channel `index` is flagged. Out-of-range indices are never flagged.
    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        index < NUM_CHANNELS && self.0 & (1 << index) != 0
    }

    /// Sets or clears the bit for `index`, returning `true` if the mask changed.
    pub fn set(&mut self, index: usize, overridden: bool) -> bool {
        if index >= NUM_CHANNELS {
            return false;
        }

        let before = self.0;
        if overridden {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
        before != self.0
    }
}
