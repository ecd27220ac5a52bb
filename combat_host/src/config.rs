//! Host tuning knobs
use std::time::Duration;

use combat_core::EngineConstants;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Commands that may queue before senders wait
    pub command_buffer: usize,
    /// Events a slow subscriber may fall behind before it lags
    pub event_capacity: usize,
    /// How long an open reaction window waits for declarations
    pub window_timeout: Duration,
}

impl HostConfig {
    /// Take the window timeout from the engine's rule constants
    pub fn from_constants(constants: &EngineConstants) -> Self {
        HostConfig {
            window_timeout: Duration::from_millis(constants.reactions.window_timeout_ms),
            ..Self::default()
        }
    }

    pub fn with_window_timeout(mut self, timeout: Duration) -> Self {
        self.window_timeout = timeout;
        self
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            command_buffer: 64,
            event_capacity: 256,
            window_timeout: Duration::from_millis(5000),
        }
    }
}
