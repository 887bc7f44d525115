//! BLE collaborator interface.
//!
//! GATT registration, advertising, scanning and connection management live
//! outside this crate. The link engines only need the handful of operations
//! below.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace};

use crate::error::Result;

/// Operations the link engines need from the BLE stack.
#[cfg_attr(test, mockall::automock)]
pub trait BleTransport: Send + Sync {
    /// Starts advertising the trainer service (head unit role).
    fn start_advertising(&self) -> Result<()>;

    fn stop_advertising(&self);

    /// Starts scanning for a head unit (remote role).
    fn start_scanning(&self, scan_only: bool) -> Result<()>;

    fn stop_scanning(&self);

    /// Drops any active connection. Must be safe with nothing connected.
    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Sends one encoded trainer frame on the data characteristic.
    fn notify_trainer(&self, frame: &[u8]) -> Result<()>;

    /// Publishes a new override bitmap.
    fn notify_override(&self, mask: u16) -> Result<()>;

    fn local_address(&self) -> Option<String>;

    /// Signal strength of the connected peer in dBm.
    fn peer_rssi(&self) -> Option<i8>;
}

/// Stand-in transport for hosts without a BLE stack.
///
/// Advertising counts as connected so the head unit path runs end to end;
/// notifications are only logged.
#[derive(Debug, Default)]
pub struct LogTransport {
    active: AtomicBool,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BleTransport for LogTransport {
    fn start_advertising(&self) -> Result<()> {
        info!("BLE: advertising started");
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_advertising(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("BLE: advertising stopped");
        }
    }

    fn start_scanning(&self, scan_only: bool) -> Result<()> {
        info!("BLE: scanning started (scan only: {})", scan_only);
        Ok(())
    }

    fn stop_scanning(&self) {
        debug!("BLE: scanning stopped");
    }

    fn disconnect(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn notify_trainer(&self, frame: &[u8]) -> Result<()> {
        trace!("BLE: trainer notify {:02X?}", frame);
        Ok(())
    }

    fn notify_override(&self, mask: u16) -> Result<()> {
        info!("BLE: override mask {:#06X}", mask);
        Ok(())
    }

    fn local_address(&self) -> Option<String> {
        None
    }

    fn peer_rssi(&self) -> Option<i8> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_transport_connected_while_advertising() {
        let transport = LogTransport::new();
        assert!(!transport.is_connected());

        transport.start_advertising().unwrap();
        assert!(transport.is_connected());

        transport.stop_advertising();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_log_transport_disconnect_is_idempotent() {
        let transport = LogTransport::new();
        transport.disconnect();
        transport.disconnect();
        assert!(!transport.is_connected());
        assert!(transport.notify_trainer(&[0x7E, 0x7E]).is_ok());
    }
}
