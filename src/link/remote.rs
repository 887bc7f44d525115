//! Remote engine: this device listens to another head unit over BLE.
//!
//! In scan-only mode the engine scans but never consumes channel data.

use std::sync::Arc;

use tracing::{info, warn};

use super::transport::BleTransport;
use super::LinkEngine;
use crate::channel::Channels;
use crate::error::Result;
use crate::trainer::decoder::TrainerDecoder;

/// Receives trainer frames from a connected head unit.
pub struct RemoteEngine {
    transport: Arc<dyn BleTransport>,
    scan_only: bool,
    decoder: TrainerDecoder,
    channels: Option<Channels>,
    ticks_since_frame: u32,
    stale_after_ticks: u32,
}

impl RemoteEngine {
    pub fn new(transport: Arc<dyn BleTransport>, scan_only: bool, stale_after_ticks: u32) -> Self {
        Self {
            transport,
            scan_only,
            decoder: TrainerDecoder::new(),
            channels: None,
            ticks_since_frame: 0,
            stale_after_ticks: stale_after_ticks.max(1),
        }
    }

    pub fn is_scan_only(&self) -> bool {
        self.scan_only
    }

    /// No valid frame within the timeout.
    pub fn is_stale(&self) -> bool {
        self.ticks_since_frame >= self.stale_after_ticks
    }

    pub fn decode_errors(&self) -> u64 {
        self.decoder.errors()
    }
}

impl LinkEngine for RemoteEngine {
    fn start(&mut self) -> Result<()> {
        self.channels = None;
        self.ticks_since_frame = 0;
        self.transport.start_scanning(self.scan_only)?;
        info!("Remote BLE started (scan only: {})", self.scan_only);
        Ok(())
    }

    fn stop(&mut self) {
        self.transport.stop_scanning();
        self.transport.disconnect();
        self.channels = None;
        info!("Remote BLE stopped");
    }

    fn execute(&mut self) {
        if self.channels.is_none() {
            return;
        }
        self.ticks_since_frame = self.ticks_since_frame.saturating_add(1);
        if self.ticks_since_frame == self.stale_after_ticks {
            warn!("Remote trainer data timed out, channels now absent");
        }
    }

    fn channel(&self, index: usize) -> u16 {
        if self.scan_only || self.is_stale() {
            return 0;
        }
        self.channels
            .and_then(|channels| channels.get(index).copied())
            .unwrap_or(0)
    }

    fn receive(&mut self, data: &[u8]) {
        if self.scan_only {
            return;
        }
        if let Some(channels) = self.decoder.decode(data) {
            self.channels = Some(channels);
            self.ticks_since_frame = 0;
        }
    }

    fn address(&self) -> String {
        self.transport.local_address().unwrap_or_default()
    }

    fn rssi(&self) -> i8 {
        self.transport.peer_rssi().unwrap_or(-1)
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::NUM_CHANNELS;
    use crate::link::transport::{LogTransport, MockBleTransport};
    use crate::trainer::encoder::TrainerEncoder;
    use mockall::predicate::eq;

    fn frame_for(channels: &Channels) -> Vec<u8> {
        TrainerEncoder::new().encode(channels).unwrap().to_vec()
    }

    fn remote(scan_only: bool) -> RemoteEngine {
        RemoteEngine::new(Arc::new(LogTransport::new()), scan_only, 3)
    }

    #[test]
    fn test_no_frame_reads_zero() {
        let engine = remote(false);
        assert_eq!(engine.channel(0), 0);
    }

    #[test]
    fn test_received_channels_exposed() {
        let mut engine = remote(false);
        let channels: Channels = core::array::from_fn(|i| 1000 + i as u16 * 50);
        engine.receive(&frame_for(&channels));

        assert_eq!(engine.channel(0), 1000);
        assert_eq!(engine.channel(15), 1750);
        assert_eq!(engine.channel(NUM_CHANNELS), 0);
    }

    #[test]
    fn test_scan_only_ignores_data() {
        let mut engine = remote(true);
        engine.receive(&frame_for(&[1500; NUM_CHANNELS]));
        assert_eq!(engine.channel(0), 0);
    }

    #[test]
    fn test_channels_go_stale_then_recover() {
        let mut engine = remote(false);
        engine.receive(&frame_for(&[1600; NUM_CHANNELS]));

        engine.execute();
        engine.execute();
        assert_eq!(engine.channel(2), 1600);

        engine.execute();
        assert!(engine.is_stale());
        assert_eq!(engine.channel(2), 0);

        engine.receive(&frame_for(&[1400; NUM_CHANNELS]));
        assert!(!engine.is_stale());
        assert_eq!(engine.channel(2), 1400);
    }

    #[test]
    fn test_corrupt_frame_keeps_last_values() {
        let mut engine = remote(false);
        engine.receive(&frame_for(&[1600; NUM_CHANNELS]));

        let mut corrupt = frame_for(&[1200; NUM_CHANNELS]);
        corrupt[4] ^= 0x01;
        engine.receive(&corrupt);

        assert_eq!(engine.channel(0), 1600);
        assert_eq!(engine.decode_errors(), 1);
    }

    #[test]
    fn test_set_channel_is_ignored() {
        let mut engine = remote(false);
        engine.set_channel(0, 1700);
        assert_eq!(engine.channel(0), 0);
    }

    #[test]
    fn test_start_scans_and_stop_disconnects() {
        let mut mock = MockBleTransport::new();
        mock.expect_start_scanning().with(eq(true)).times(1).returning(|_| Ok(()));
        mock.expect_stop_scanning().times(1).return_const(());
        mock.expect_disconnect().times(1).return_const(());

        let mut engine = RemoteEngine::new(Arc::new(mock), true, 10);
        engine.start().unwrap();
        engine.stop();
    }
}
