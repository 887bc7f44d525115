//! # SBUS Link Worker
//!
//! One unit of periodic SBUS work: drain the receive side into the decoder,
//! publish the newest frame, then transmit the current outbound frame.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use super::decoder::SbusDecoder;
use super::encoder::SbusOutput;
use crate::channel::ChannelFrame;
use crate::error::Result;
use crate::serial::port_trait::SerialPortIO;

/// Size of each non-blocking read
const READ_CHUNK: usize = 128;

/// Periodic SBUS receive/transmit unit.
pub struct SbusWorker<P: SerialPortIO> {
    port: P,
    decoder: SbusDecoder,
    received: watch::Sender<ChannelFrame>,
    output: Arc<SbusOutput>,
    frames_sent: u64,
}

impl<P: SerialPortIO> SbusWorker<P> {
    /// Creates a worker publishing decoded frames to `received` and
    /// transmitting whatever `output` holds.
    pub fn new(
        port: P,
        decoder: SbusDecoder,
        received: watch::Sender<ChannelFrame>,
        output: Arc<SbusOutput>,
    ) -> Self {
        Self {
            port,
            decoder,
            received,
            output,
            frames_sent: 0,
        }
    }

    /// Frames written to the port so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// The decoder, for diagnostics counters.
    pub fn decoder(&self) -> &SbusDecoder {
        &self.decoder
    }

    /// Runs one receive + transmit cycle.
    ///
    /// # Errors
    ///
    /// Returns error if the port fails to read or write. Framing errors are
    /// absorbed by the decoder and never reported here.
    pub async fn tick(&mut self) -> Result<()> {
        self.receive().await?;
        self.transmit().await
    }

    /// Drains every byte currently buffered and publishes the newest frame.
    ///
    /// Returns `true` if a new frame was published.
    pub async fn receive(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut latest = None;

        loop {
            let count = self.port.read_available(&mut chunk).await?;
            if count == 0 {
                break;
            }
            if let Some(frame) = self.decoder.decode(&chunk[..count]) {
                latest = Some(frame);
            }
            if count < chunk.len() {
                break;
            }
        }

        match latest {
            Some(frame) => {
                trace!("SBUS frame received: {:?}", frame.channels);
                self.received.send_replace(frame);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sends the current outbound frame, if one has been built.
    pub async fn transmit(&mut self) -> Result<()> {
        let Some(frame) = self.output.latest() else {
            return Ok(());
        };

        self.port.write_all(frame.as_bytes()).await?;
        self.port.flush().await?;
        self.frames_sent += 1;

        if self.frames_sent % 1000 == 0 {
            debug!(
                "SBUS: {} frames sent, {} decoded, {} framing errors",
                self.frames_sent,
                self.decoder.frames_decoded(),
                self.decoder.framing_errors()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{MAX_PWM, NUM_CHANNELS, PPM_CENTER};
    use crate::error::HeadLinkError;
    use crate::sbus::encoder::SbusEncoder;
    use crate::serial::port_trait::mocks::MockSerialPort;
    use std::io;

    fn worker(port: MockSerialPort) -> (SbusWorker<MockSerialPort>, watch::Receiver<ChannelFrame>, Arc<SbusOutput>) {
        let (tx, rx) = watch::channel(ChannelFrame::default());
        let output = Arc::new(SbusOutput::new());
        let worker = SbusWorker::new(port, SbusDecoder::default(), tx, Arc::clone(&output));
        (worker, rx, output)
    }

    #[tokio::test]
    async fn test_nothing_sent_before_first_build() {
        let port = MockSerialPort::new();
        let (mut worker, _rx, _output) = worker(port.clone());

        worker.tick().await.unwrap();
        assert!(port.get_written_data().is_empty());
        assert_eq!(worker.frames_sent(), 0);
    }

    #[tokio::test]
    async fn test_transmits_latest_frame_every_tick() {
        let port = MockSerialPort::new();
        let (mut worker, _rx, output) = worker(port.clone());
        let encoder = SbusEncoder::default();

        output.publish_channels(&encoder, &ChannelFrame::centered(PPM_CENTER));
        worker.tick().await.unwrap();
        worker.tick().await.unwrap();

        let written = port.get_written_data();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].len(), 25);
        assert_eq!(written[0], written[1]);
    }

    #[tokio::test]
    async fn test_received_frame_published() {
        let port = MockSerialPort::new();
        let (mut worker, rx, _output) = worker(port.clone());
        let encoder = SbusEncoder::default();

        let mut sent = ChannelFrame::centered(PPM_CENTER);
        sent.channels[2] = MAX_PWM;
        port.queue_incoming(encoder.encode(&sent).as_bytes());

        assert!(worker.receive().await.unwrap());
        assert_eq!(rx.borrow().channels[2], MAX_PWM);
    }

    #[tokio::test]
    async fn test_large_backlog_keeps_newest() {
        let port = MockSerialPort::new();
        let (mut worker, rx, _output) = worker(port.clone());
        let encoder = SbusEncoder::default();

        // More than one read chunk of queued frames
        for value in [1000u16, 1100, 1200, 1300, 1400, 1600, 1700, 1800] {
            port.queue_incoming(encoder.encode(&ChannelFrame::centered(value)).as_bytes());
        }

        assert!(worker.receive().await.unwrap());
        assert_eq!(rx.borrow().channels, [1800; NUM_CHANNELS]);
        assert_eq!(worker.decoder().frames_decoded(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_input_keeps_last_good_values() {
        let port = MockSerialPort::new();
        let (mut worker, rx, _output) = worker(port.clone());
        let encoder = SbusEncoder::default();

        port.queue_incoming(encoder.encode(&ChannelFrame::centered(1200)).as_bytes());
        worker.receive().await.unwrap();

        let mut corrupt = *encoder.encode(&ChannelFrame::centered(1900)).as_bytes();
        corrupt[24] = 0xFF;
        port.queue_incoming(&corrupt);

        assert!(!worker.receive().await.unwrap());
        assert_eq!(rx.borrow().channels, [1200; NUM_CHANNELS]);
        assert_eq!(worker.decoder().framing_errors(), 1);
    }

    #[test]
    fn test_idle_port_publishes_nothing() {
        let port = MockSerialPort::new();
        let (mut worker, rx, _output) = worker(port);

        let published = tokio_test::assert_ok!(tokio_test::block_on(worker.receive()));
        assert!(!published);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_write_error_propagates() {
        let port = MockSerialPort::new();
        let (mut worker, _rx, output) = worker(port.clone());
        output.publish_channels(&SbusEncoder::default(), &ChannelFrame::default());
        port.set_write_error(io::ErrorKind::BrokenPipe);

        assert!(matches!(worker.tick().await, Err(HeadLinkError::Io(_))));
    }

    #[tokio::test]
    async fn test_flush_error_propagates() {
        let port = MockSerialPort::new();
        let (mut worker, _rx, output) = worker(port.clone());
        output.publish_channels(&SbusEncoder::default(), &ChannelFrame::default());
        port.set_flush_error(io::ErrorKind::TimedOut);

        assert!(worker.transmit().await.is_err());
    }
}
