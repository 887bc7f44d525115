//! Engine used while Bluetooth is switched off.

use super::LinkEngine;
use crate::error::Result;

/// Address reported while no BLE link is active
pub const DISABLED_ADDRESS: &str = "BT_DISABLED";

/// Does nothing; every query returns its "no link" value.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEngine;

impl LinkEngine for DisabledEngine {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn execute(&mut self) {}

    fn address(&self) -> String {
        DISABLED_ADDRESS.to_string()
    }

    fn rssi(&self) -> i8 {
        -1
    }

    fn is_connected(&self) -> bool {
        false
    }
}
