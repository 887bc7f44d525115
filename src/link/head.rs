//! Head unit engine: this device sends its channels to a radio over BLE.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::transport::BleTransport;
use super::LinkEngine;
use crate::channel::{ChannelOverrideMask, ChannelScaling, Channels, NUM_CHANNELS};
use crate::error::Result;
use crate::trainer::encoder::TrainerEncoder;

/// Advertises the trainer service and notifies one trainer frame per tick.
pub struct HeadUnitEngine {
    transport: Arc<dyn BleTransport>,
    scaling: ChannelScaling,
    encoder: TrainerEncoder,
    channels: Channels,
    overrides: ChannelOverrideMask,
    frames_sent: u64,
}

impl HeadUnitEngine {
    pub fn new(transport: Arc<dyn BleTransport>, scaling: ChannelScaling) -> Self {
        Self {
            transport,
            scaling,
            encoder: TrainerEncoder::new(),
            channels: [scaling.ppm_center; NUM_CHANNELS],
            overrides: ChannelOverrideMask::default(),
            frames_sent: 0,
        }
    }

    pub fn overrides(&self) -> ChannelOverrideMask {
        self.overrides
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    fn publish_overrides(&self) {
        debug!("Override mask now {:#06X}", self.overrides.bits());
        if let Err(e) = self.transport.notify_override(self.overrides.bits()) {
            warn!("Failed to publish override mask: {}", e);
        }
    }
}

impl LinkEngine for HeadUnitEngine {
    fn start(&mut self) -> Result<()> {
        self.channels = [self.scaling.ppm_center; NUM_CHANNELS];
        self.transport.start_advertising()?;
        info!("Head unit BLE started");
        Ok(())
    }

    fn stop(&mut self) {
        self.transport.stop_advertising();
        self.transport.disconnect();
        info!("Head unit BLE stopped after {} frames", self.frames_sent);
    }

    fn execute(&mut self) {
        if !self.transport.is_connected() {
            return;
        }

        let frame = match self.encoder.encode(&self.channels) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping trainer frame: {}", e);
                return;
            }
        };

        match self.transport.notify_trainer(&frame) {
            Ok(()) => self.frames_sent += 1,
            Err(e) => debug!("Trainer notify failed: {}", e),
        }
    }

    fn channel(&self, index: usize) -> u16 {
        self.channels.get(index).copied().unwrap_or(0)
    }

    /// A value of 0 releases the channel: it goes back to center and its
    /// override bit is cleared.
    fn set_channel(&mut self, index: usize, value: u16) {
        if index >= NUM_CHANNELS {
            return;
        }

        let changed = if value == 0 {
            self.channels[index] = self.scaling.ppm_center;
            self.overrides.set(index, false)
        } else {
            self.channels[index] = self.scaling.clamp(value);
            self.overrides.set(index, true)
        };

        if changed {
            self.publish_overrides();
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
    use crate::channel::{MAX_PWM, PPM_CENTER};
    use crate::error::HeadLinkError;
    use crate::link::transport::{LogTransport, MockBleTransport};
    use crate::trainer::decoder::TrainerDecoder;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::Mutex;

    fn engine_with(mock: MockBleTransport) -> HeadUnitEngine {
        HeadUnitEngine::new(Arc::new(mock), ChannelScaling::default())
    }

    #[test]
    fn test_override_mask_channel_three() {
        let mut mock = MockBleTransport::new();
        let mut seq = Sequence::new();
        mock.expect_notify_override()
            .with(eq(0xFFF7))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_notify_override()
            .with(eq(0xFFFF))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut engine = engine_with(mock);

        // Already flagged by default, so no notification
        engine.set_channel(3, 1700);
        assert_eq!(engine.channel(3), 1700);

        engine.set_channel(3, 0);
        assert!(!engine.overrides().contains(3));
        assert_eq!(engine.channel(3), PPM_CENTER);

        engine.set_channel(3, 1600);
        assert!(engine.overrides().contains(3));
        assert_eq!(engine.channel(3), 1600);
    }

    #[test]
    fn test_unchanged_mask_not_republished() {
        let mut mock = MockBleTransport::new();
        mock.expect_notify_override().times(1).returning(|_| Ok(()));

        let mut engine = engine_with(mock);
        engine.set_channel(5, 0);
        engine.set_channel(5, 0);
        assert_eq!(engine.overrides().bits(), 0xFFDF);
    }

    #[test]
    fn test_set_channel_clamps_and_ignores_out_of_range() {
        let mut engine = HeadUnitEngine::new(Arc::new(LogTransport::new()), ChannelScaling::default());

        engine.set_channel(0, 4000);
        assert_eq!(engine.channel(0), MAX_PWM);

        engine.set_channel(NUM_CHANNELS, 1200);
        assert_eq!(engine.channel(NUM_CHANNELS), 0);
    }

    #[test]
    fn test_execute_sends_decodable_frame_when_connected() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&sent);

        let mut mock = MockBleTransport::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_notify_override().returning(|_| Ok(()));
        mock.expect_notify_trainer().times(1).returning(move |frame| {
            sink.lock().unwrap().push(frame.to_vec());
            Ok(())
        });

        let mut engine = engine_with(mock);
        engine.set_channel(0, 0x57E); // packs to a stuffed 0x7E
        engine.execute();
        assert_eq!(engine.frames_sent(), 1);

        let frames = sent.lock().unwrap();
        let channels = TrainerDecoder::new().decode(&frames[0]).unwrap();
        assert_eq!(channels[0], ChannelScaling::default().clamp(0x57E));
        assert_eq!(channels[1], PPM_CENTER);
    }

    #[test]
    fn test_execute_idle_when_disconnected() {
        let mut mock = MockBleTransport::new();
        mock.expect_is_connected().return_const(false);
        mock.expect_notify_trainer().never();

        let mut engine = engine_with(mock);
        engine.execute();
        assert_eq!(engine.frames_sent(), 0);
    }

    #[test]
    fn test_notify_failure_is_not_counted() {
        let mut mock = MockBleTransport::new();
        mock.expect_is_connected().return_const(true);
        mock.expect_notify_trainer()
            .returning(|_| Err(HeadLinkError::Ble("not subscribed".to_string())));

        let mut engine = engine_with(mock);
        engine.execute();
        assert_eq!(engine.frames_sent(), 0);
    }

    #[test]
    fn test_start_and_stop_drive_advertising() {
        let mut mock = MockBleTransport::new();
        mock.expect_start_advertising().times(1).returning(|| Ok(()));
        mock.expect_stop_advertising().times(2).return_const(());
        mock.expect_disconnect().times(2).return_const(());

        let mut engine = engine_with(mock);
        engine.start().unwrap();
        engine.stop();
        engine.stop();
    }

    #[test]
    fn test_start_failure_propagates() {
        let mut mock = MockBleTransport::new();
        mock.expect_start_advertising()
            .returning(|| Err(HeadLinkError::Ble("controller busy".to_string())));

        let mut engine = engine_with(mock);
        assert!(matches!(engine.start(), Err(HeadLinkError::Ble(_))));
    }
}
