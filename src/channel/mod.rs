//! # Channel Data Model
//!
//! Link-independent representation of the 16 proportional RC channels.
//!
//! This module handles:
//! - The decoded [`ChannelFrame`] shared by every link
//! - The [`ChannelOverrideMask`] published to BLE subscribers
//! - Affine scaling between SBUS raw values and PWM microseconds

pub mod frame;
pub mod override_mask;
pub mod scaling;

pub use frame::ChannelFrame;
pub use override_mask::ChannelOverrideMask;
pub use scaling::ChannelScaling;

/// Number of proportional channels carried by every link
pub const NUM_CHANNELS: usize = 16;

/// Default lower PWM bound in microseconds
pub const MIN_PWM: u16 = 988;

/// Default upper PWM bound in microseconds
pub const MAX_PWM: u16 = 2012;

/// Default PWM center in microseconds
pub const PPM_CENTER: u16 = 1500;

/// Channel array type (16 channels, PWM microseconds)
pub type Channels = [u16; NUM_CHANNELS];
