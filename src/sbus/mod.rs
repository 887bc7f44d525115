//! # SBUS Protocol Module
//!
//! Implementation of the Futaba SBUS serial protocol used on the wired link.
//!
//! This module handles:
//! - Frame synchronization on header/footer byte values
//! - 11-bit channel packing and unpacking (16 channels in 22 bytes)
//! - Scaling between raw SBUS values and PWM microseconds
//! - Locked hand-off of outbound frames to the transmit worker

pub mod protocol;
pub mod packing;
pub mod decoder;
pub mod encoder;
pub mod worker;
