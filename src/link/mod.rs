//! # Link Mode Module
//!
//! Selects which Bluetooth link is active and routes channel access to it.
//!
//! This module handles:
//! - The [`LinkMode`] enumeration exposed to configuration and commands
//! - The [`LinkEngine`] abstraction each link implements
//! - Building engines per mode through an [`EngineFactory`]
//! - The [`LinkModeController`] that owns the active engine

pub mod controller;
pub mod disabled;
pub mod head;
pub mod remote;
pub mod transport;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelScaling;
use crate::error::Result;

pub use controller::LinkModeController;
pub use disabled::DisabledEngine;
pub use head::HeadUnitEngine;
pub use remote::RemoteEngine;
pub use transport::{BleTransport, LogTransport};

/// Active Bluetooth role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Bluetooth off
    #[default]
    Disabled,
    /// Advertise and send trainer frames to a connected radio
    HeadUnitBle,
    /// Connect to another head unit and receive its channels
    RemoteBle,
    /// Scan for devices without consuming channel data
    ScanOnly,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkMode::Disabled => "disabled",
            LinkMode::HeadUnitBle => "head_unit_ble",
            LinkMode::RemoteBle => "remote_ble",
            LinkMode::ScanOnly => "scan_only",
        };
        f.write_str(name)
    }
}

/// One Bluetooth link implementation.
///
/// `stop` must be idempotent and safe to call when nothing is connected.
/// Operations a link does not support fall back to the defaults here:
/// reads return 0 and writes are ignored.
pub trait LinkEngine: Send {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// One periodic unit of work, called from the BLE worker.
    fn execute(&mut self);

    /// Channel value in PWM microseconds, or 0 when the link has none.
    fn channel(&self, _index: usize) -> u16 {
        0
    }

    fn set_channel(&mut self, _index: usize, _value: u16) {}

    /// Bytes received from the peer's trainer characteristic.
    fn receive(&mut self, _data: &[u8]) {}

    fn address(&self) -> String;

    fn rssi(&self) -> i8;

    fn is_connected(&self) -> bool;
}

/// Builds the engine for a mode.
pub trait EngineFactory: Send {
    fn create(&self, mode: LinkMode) -> Box<dyn LinkEngine>;
}

/// Factory producing the BLE engines over a shared transport.
pub struct BleEngineFactory {
    transport: Arc<dyn BleTransport>,
    scaling: ChannelScaling,
    stale_after_ticks: u32,
}

impl BleEngineFactory {
    /// `stale_after_ticks` is the number of worker ticks without a trainer
    /// frame after which remote channels read as absent.
    pub fn new(transport: Arc<dyn BleTransport>, scaling: ChannelScaling, stale_after_ticks: u32) -> Self {
        Self {
            transport,
            scaling,
            stale_after_ticks,
        }
    }
}

impl EngineFactory for BleEngineFactory {
    fn create(&self, mode: LinkMode) -> Box<dyn LinkEngine> {
        let transport = Arc::clone(&self.transport);
        match mode {
            LinkMode::Disabled => Box::new(DisabledEngine),
            LinkMode::HeadUnitBle => Box::new(HeadUnitEngine::new(transport, self.scaling)),
            LinkMode::RemoteBle => Box::new(RemoteEngine::new(transport, false, self.stale_after_ticks)),
            LinkMode::ScanOnly => Box::new(RemoteEngine::new(transport, true, self.stale_after_ticks)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: LinkMode,
        }

        let parsed: Wrapper = toml::from_str("mode = \"remote_ble\"").unwrap();
        assert_eq!(parsed.mode, LinkMode::RemoteBle);
        assert_eq!(serde_json::to_string(&LinkMode::HeadUnitBle).unwrap(), "\"head_unit_ble\"");
        assert!(toml::from_str::<Wrapper>("mode = \"bogus\"").is_err());
    }

    #[test]
    fn test_mode_display_matches_serde() {
        for mode in [LinkMode::Disabled, LinkMode::HeadUnitBle, LinkMode::RemoteBle, LinkMode::ScanOnly] {
            assert_eq!(serde_json::to_string(&mode).unwrap(), format!("\"{}\"", mode));
        }
    }

    #[test]
    fn test_default_mode_is_disabled() {
        assert_eq!(LinkMode::default(), LinkMode::Disabled);
    }

    #[test]
    fn test_factory_builds_engine_per_mode() {
        let factory = BleEngineFactory::new(Arc::new(LogTransport::new()), ChannelScaling::default(), 80);

        assert_eq!(factory.create(LinkMode::Disabled).address(), "BT_DISABLED");
        assert_eq!(factory.create(LinkMode::ScanOnly).channel(0), 0);
        assert!(!factory.create(LinkMode::HeadUnitBle).is_connected());
    }
}
