//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::channel::ChannelScaling;
use crate::error::{HeadLinkError, Result};
use crate::link::LinkMode;
use crate::trainer::protocol::TRAINER_VALUE_MAX;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub commands: CommandConfig,
}

/// SBUS serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_invert")]
    pub invert_rx: bool,

    #[serde(default = "default_invert")]
    pub invert_tx: bool,

    #[serde(default = "default_sbus_rate_hz")]
    pub sbus_rate_hz: u32,
}

/// Channel range configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    #[serde(default = "default_min_pwm")]
    pub min_pwm: u16,

    #[serde(default = "default_max_pwm")]
    pub max_pwm: u16,

    #[serde(default = "default_ppm_center")]
    pub ppm_center: u16,
}

/// Bluetooth link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BluetoothConfig {
    #[serde(default = "default_mode")]
    pub mode: LinkMode,

    #[serde(default = "default_period_us")]
    pub period_us: u64,

    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
}

/// JSON command channel configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            min_pwm: default_min_pwm(),
            max_pwm: default_max_pwm(),
            ppm_center: default_ppm_center(),
        }
    }
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            period_us: default_period_us(),
            remote_timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_invert() -> bool { true }
fn default_sbus_rate_hz() -> u32 { 80 }

fn default_min_pwm() -> u16 { 988 }
fn default_max_pwm() -> u16 { 2012 }
fn default_ppm_center() -> u16 { 1500 }

fn default_mode() -> LinkMode { LinkMode::HeadUnitBle }
fn default_period_us() -> u64 { 12_500 }
fn default_remote_timeout_ms() -> u64 { 1000 }

fn default_buffer_size() -> usize { 1024 }

fn invalid(message: impl std::fmt::Display) -> HeadLinkError {
    HeadLinkError::Config(toml::de::Error::custom(message))
}

impl ChannelConfig {
    pub fn scaling(&self) -> ChannelScaling {
        ChannelScaling {
            min_pwm: self.min_pwm,
            max_pwm: self.max_pwm,
            ppm_center: self.ppm_center,
        }
    }
}

impl BluetoothConfig {
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }

    /// Worker ticks without a trainer frame before remote channels go stale.
    pub fn stale_after_ticks(&self) -> u32 {
        let ticks = (self.remote_timeout_ms * 1000).div_ceil(self.period_us.max(1));
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use headtracker_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !(30..=150).contains(&self.serial.sbus_rate_hz) {
            return Err(invalid("sbus_rate_hz must be between 30 and 150"));
        }

        let channels = &self.channels;
        for (name, value) in [
            ("min_pwm", channels.min_pwm),
            ("max_pwm", channels.max_pwm),
            ("ppm_center", channels.ppm_center),
        ] {
            if value == 0 || value > TRAINER_VALUE_MAX {
                return Err(invalid(format!(
                    "{} must be between 1 and {}",
                    name, TRAINER_VALUE_MAX
                )));
            }
        }

        if channels.min_pwm >= channels.ppm_center || channels.ppm_center >= channels.max_pwm {
            return Err(invalid("channels must satisfy min_pwm < ppm_center < max_pwm"));
        }

        if !(1000..=100_000).contains(&self.bluetooth.period_us) {
            return Err(invalid("period_us must be between 1000 and 100000"));
        }

        if !(1..=60_000).contains(&self.bluetooth.remote_timeout_ms) {
            return Err(invalid("remote_timeout_ms must be between 1 and 60000"));
        }

        if !(16..=8192).contains(&self.commands.buffer_size) {
            return Err(invalid("buffer_size must be between 16 and 8192"));
        }

        Ok(())
    }
}
