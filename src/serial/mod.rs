//! # Serial Communication Module
//!
//! Handles the wired SBUS serial link.
//!
//! This module handles:
//! - Opening the serial port at 100,000 baud, 8 data bits, even parity, 2 stop bits
//! - Non-blocking reads of whatever the UART has buffered
//! - Writing complete SBUS frames
//!
//! Signal inversion is a property of the UART hardware or adapter; the
//! configured flags are only reported here.

pub mod port_trait;

use crate::error::{HeadLinkError, Result};
use crate::sbus::protocol::SBUS_BAUD_RATE;
use port_trait::TokioSerialPort;
use tracing::{debug, info, warn};

/// Default SBUS device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyAMA0", // On-board UART
];

/// SBUS Serial Port Handler
pub struct SbusSerial;

impl SbusSerial {
    /// Open the SBUS port, trying `preferred` first and then the default paths
    ///
    /// # Arguments
    ///
    /// * `preferred` - Configured device path
    /// * `invert_rx` / `invert_tx` - Requested inversion, reported for the hardware collaborator
    ///
    /// # Errors
    ///
    /// Returns error if no candidate path can be opened
    pub fn open(preferred: &str, invert_rx: bool, invert_tx: bool) -> Result<(TokioSerialPort, String)> {
        let mut paths = vec![preferred];
        paths.extend(DEFAULT_DEVICE_PATHS.iter().filter(|&&p| p != preferred));

        let (port, path) = Self::open_with_paths(&paths)?;
        info!(
            "SBUS inversion requested: rx={} tx={} (handled by UART hardware)",
            invert_rx, invert_tx
        );
        Ok((port, path))
    }

    /// Open the SBUS port from a list of candidate paths
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    ///
    /// # Returns
    ///
    /// * `Result<(TokioSerialPort, String)>` - Opened port and the path that worked
    pub fn open_with_paths(paths: &[&str]) -> Result<(TokioSerialPort, String)> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path) {
                Ok(port) => {
                    info!("Successfully opened SBUS port at {}", path);
                    return Ok((TokioSerialPort::new(port), path.to_string()));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(HeadLinkError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with SBUS settings (100000 8E2)
    fn open_port(path: &str) -> Result<tokio_serial::SerialStream> {
        use tokio_serial::SerialPortBuilderExt;

        let port = tokio_serial::new(path, SBUS_BAUD_RATE)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::Even)
            .stop_bits(tokio_serial::StopBits::Two)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| HeadLinkError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }
}
