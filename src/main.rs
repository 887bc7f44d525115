//! # Head Tracker Link
//!
//! Runs the SBUS and Bluetooth trainer links for a head-tracking controller.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with a non-blocking tracing subscriber
//!    - Load configuration (first argument, or `config/default.toml`)
//!    - Start the configured Bluetooth link mode
//!    - Open the SBUS serial port
//!
//! 2. **Workers**
//!    - SBUS worker: drain input, publish the newest frame, retransmit output
//!    - BLE worker: one link engine tick per trainer period
//!    - Bridge: feed each received SBUS frame to SBUS output and the link
//!    - Commands: framed JSON commands from stdin
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C stops the workers and switches the link to disabled

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use headtracker_link::channel::ChannelFrame;
use headtracker_link::command::{Command, CommandReader};
use headtracker_link::config::Config;
use headtracker_link::link::{BleEngineFactory, BleTransport, LinkMode, LinkModeController, LogTransport};
use headtracker_link::pacer::PeriodicPacer;
use headtracker_link::sbus::decoder::SbusDecoder;
use headtracker_link::sbus::encoder::{SbusEncoder, SbusOutput};
use headtracker_link::sbus::worker::SbusWorker;
use headtracker_link::serial::port_trait::SerialPortIO;
use headtracker_link::serial::SbusSerial;

/// Configuration used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Bytes read from stdin per command channel read
const STDIN_CHUNK: usize = 256;

type SharedController = Arc<Mutex<LinkModeController>>;

#[tokio::main]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(writer)
        .init();

    info!("Head Tracker Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    info!("Configuration loaded from {}", config_path);

    let scaling = config.channels.scaling();
    let transport: Arc<dyn BleTransport> = Arc::new(LogTransport::new());
    let factory = BleEngineFactory::new(transport, scaling, config.bluetooth.stale_after_ticks());
    let controller: SharedController = Arc::new(Mutex::new(LinkModeController::new(Box::new(factory))));

    if let Err(e) = controller.lock().await.set_mode(config.bluetooth.mode) {
        warn!("Bluetooth unavailable, continuing with SBUS only: {}", e);
    }

    let (port, path) = SbusSerial::open(&config.serial.port, config.serial.invert_rx, config.serial.invert_tx)?;
    info!("SBUS serial port opened at: {}", path);

    let encoder = SbusEncoder::new(scaling);
    let output = Arc::new(SbusOutput::new());
    output.publish_channels(&encoder, &ChannelFrame::centered(scaling.ppm_center));

    let (received_tx, received_rx) = watch::channel(ChannelFrame::centered(scaling.ppm_center));
    let worker = SbusWorker::new(port, SbusDecoder::new(scaling), received_tx, Arc::clone(&output));

    let tasks = [
        tokio::spawn(run_sbus(worker, config.serial.sbus_rate_hz)),
        tokio::spawn(run_ble(Arc::clone(&controller), config.bluetooth.period())),
        tokio::spawn(bridge_channels(received_rx, Arc::clone(&controller), output, encoder)),
        tokio::spawn(run_commands(Arc::clone(&controller), config.commands.buffer_size)),
    ];

    info!(
        "Running: SBUS at {}Hz, Bluetooth {} every {}us",
        config.serial.sbus_rate_hz, config.bluetooth.mode, config.bluetooth.period_us
    );
    info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");

    for task in &tasks {
        task.abort();
    }
    controller.lock().await.set_mode(LinkMode::Disabled)?;

    Ok(())
}

/// SBUS receive/transmit loop at the configured frame rate.
async fn run_sbus<P: SerialPortIO>(mut worker: SbusWorker<P>, rate_hz: u32) {
    let mut pacer = PeriodicPacer::from_hz(rate_hz);
    loop {
        pacer.begin();
        if let Err(e) = worker.tick().await {
            warn!("SBUS cycle failed: {}", e);
        }
        pacer.wait().await;
    }
}

/// Link engine tick once per trainer period.
async fn run_ble(controller: SharedController, period: Duration) {
    let mut pacer = PeriodicPacer::new(period);
    loop {
        pacer.begin();
        controller.lock().await.execute();
        pacer.wait().await;
    }
}

/// Forwards every newly received SBUS frame to the SBUS output and the link.
async fn bridge_channels(
    mut received: watch::Receiver<ChannelFrame>,
    controller: SharedController,
    output: Arc<SbusOutput>,
    encoder: SbusEncoder,
) {
    while received.changed().await.is_ok() {
        let frame = *received.borrow_and_update();
        output.publish_channels(&encoder, &frame);
        controller.lock().await.set_channels(&frame.channels);
    }
    debug!("SBUS input closed, bridge stopped");
}

/// Reads framed JSON commands from stdin until it closes.
async fn run_commands(controller: SharedController, buffer_size: usize) {
    let mut stdin = tokio::io::stdin();
    let mut reader = CommandReader::new(buffer_size);
    let mut chunk = [0u8; STDIN_CHUNK];

    loop {
        let count = match stdin.read(&mut chunk).await {
            Ok(0) => break,
            Ok(count) => count,
            Err(e) => {
                warn!("Command input failed: {}", e);
                break;
            }
        };

        for text in reader.push(&chunk[..count]) {
            let command = match Command::parse(&text) {
                Ok(command) => command,
                Err(e) => {
                    warn!("Ignoring command {:?}: {}", text, e);
                    continue;
                }
            };

            let mut controller = controller.lock().await;
            match command.apply(&mut controller) {
                Ok(Some(report)) => match serde_json::to_string(&report) {
                    Ok(json) => info!("Status: {}", json),
                    Err(e) => warn!("Failed to serialize status: {}", e),
                },
                Ok(None) => debug!("Applied {:?}", command),
                Err(e) => warn!("Command {:?} failed: {}", command, e),
            }
        }
    }
    debug!("Command input closed");
}
