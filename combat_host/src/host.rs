//! SessionHost - spawns the worker and keeps its join handle
use combat_core::CombatSession;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::handle::SessionHandle;
use crate::worker::SessionWorker;

pub struct SessionHost {
    handle: SessionHandle,
    worker: JoinHandle<()>,
}

impl SessionHost {
    /// Move `session` onto its own task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(session: CombatSession, config: HostConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        tracing::info!(
            target: "combat_host",
            revision = session.revision(),
            timeout_ms = config.window_timeout.as_millis() as u64,
            "spawning session worker"
        );

        let handle = SessionHandle::new(command_tx, event_tx.clone());
        let worker = SessionWorker::new(session, command_rx, event_tx, config.window_timeout);
        let worker = tokio::spawn(worker.run());

        SessionHost { handle, worker }
    }

    /// Spawn with the window timeout taken from the session's constants
    pub fn spawn_default(session: CombatSession) -> Self {
        let config = HostConfig::from_constants(session.constants());
        Self::spawn(session, config)
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the worker once the commands already queued are applied
    pub async fn shutdown(self) -> Result<()> {
        // a worker that already exited has nothing left to stop
        let _ = self.handle.shutdown().await;
        self.worker.await.map_err(HostError::WorkerJoin)
    }
}
