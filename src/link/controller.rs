//! Link mode state machine.

use tracing::{debug, error, info};

use super::{EngineFactory, LinkEngine, LinkMode};
use crate::channel::Channels;
use crate::error::Result;

/// Owns the active link engine and routes channel access to it.
///
/// Callers share the controller behind one lock, so a mode transition is
/// exclusive with channel reads and writes and with the worker's
/// [`execute`](Self::execute).
pub struct LinkModeController {
    mode: LinkMode,
    engine: Box<dyn LinkEngine>,
    factory: Box<dyn EngineFactory>,
}

impl LinkModeController {
    /// Creates a controller in [`LinkMode::Disabled`].
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        let engine = factory.create(LinkMode::Disabled);
        Self {
            mode: LinkMode::Disabled,
            engine,
            factory,
        }
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Switches to `mode`, stopping the current engine and starting a new one.
    ///
    /// Requesting the current mode does nothing.
    ///
    /// # Errors
    ///
    /// Returns the new engine's start error. The controller is then left in
    /// [`LinkMode::Disabled`].
    pub fn set_mode(&mut self, mode: LinkMode) -> Result<()> {
        if mode == self.mode {
            debug!("Link mode already {}", mode);
            return Ok(());
        }

        info!("Link mode {} -> {}", self.mode, mode);
        self.engine.stop();

        let mut engine = self.factory.create(mode);
        match engine.start() {
            Ok(()) => {
                self.engine = engine;
                self.mode = mode;
                Ok(())
            }
            Err(e) => {
                error!("Failed to start {} link: {}", mode, e);
                self.engine = self.factory.create(LinkMode::Disabled);
                self.mode = LinkMode::Disabled;
                Err(e)
            }
        }
    }

    pub fn execute(&mut self) {
        self.engine.execute();
    }

    pub fn channel(&self, index: usize) -> u16 {
        self.engine.channel(index)
    }

    pub fn set_channel(&mut self, index: usize, value: u16) {
        self.engine.set_channel(index, value);
    }

    /// Sets every channel from a complete frame of values.
    pub fn set_channels(&mut self, channels: &Channels) {
        for (index, &value) in channels.iter().enumerate() {
            self.engine.set_channel(index, value);
        }
    }

    /// Snapshot of all channels as the active engine reports them.
    pub fn channels(&self) -> Channels {
        core::array::from_fn(|index| self.engine.channel(index))
    }

    pub fn receive(&mut self, data: &[u8]) {
        self.engine.receive(data);
    }

    pub fn address(&self) -> String {
        self.engine.address()
    }

    pub fn rssi(&self) -> i8 {
        self.engine.rssi()
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }
}

impl Drop for LinkModeController {
    fn drop(&mut self) {
        self.engine.stop();
    }
}
