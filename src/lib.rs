//! # Head Tracker Link Library
//!
//! Channel links for a head-tracking RC controller.
//!
//! This library provides the codecs and link plumbing that move 16 RC
//! channels over a wired SBUS bus and a Bluetooth LE trainer link, plus the
//! controller that selects which Bluetooth role is active.

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod pacer;
pub mod sbus;
pub mod serial;
pub mod trainer;
