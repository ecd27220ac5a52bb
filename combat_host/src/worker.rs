//! Session worker that owns the authoritative [`CombatSession`].
//!
//! Receives commands from [`SessionHandle`](crate::SessionHandle), applies
//! them one at a time, and publishes every committed [`CombatEvent`]. When a
//! reaction window opens the worker arms a deadline; if nobody settles the
//! window in time it is closed as if every pending reactor passed.

use std::time::Duration;

use combat_core::reaction::WindowId;
use combat_core::{
    Action, ActionOutcome, CombatEvent, CombatSession, CombatStateSnapshot, CombatantId,
    ReactionKind, ReactionOutcome,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::error::Result;

/// Commands that can be sent to the session worker
pub enum Command {
    /// Roll initiative and begin the first turn.
    Start { reply: oneshot::Sender<Result<()>> },
    SubmitAction {
        actor: CombatantId,
        action: Action,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    /// Submit an action proposed against a known revision.
    SubmitProposal {
        actor: CombatantId,
        action: Action,
        revision: u64,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    DeclareReaction {
        reactor: CombatantId,
        reaction: ReactionKind,
        reply: oneshot::Sender<Result<ReactionOutcome>>,
    },
    PassReaction {
        reactor: CombatantId,
        reply: oneshot::Sender<Result<Option<ActionOutcome>>>,
    },
    /// Close the open window now instead of waiting for the deadline.
    CloseWindow {
        reply: oneshot::Sender<Result<Option<ActionOutcome>>>,
    },
    EndEncounter { reply: oneshot::Sender<Result<()>> },
    /// Query the current combat state (read-only).
    QueryState {
        reply: oneshot::Sender<CombatStateSnapshot>,
    },
    /// Stop the worker after the commands queued ahead of this one.
    Shutdown,
}

/// Deadline for the window currently awaiting declarations
struct ArmedWindow {
    window: WindowId,
    deadline: Instant,
}

/// Background task that processes session commands.
pub struct SessionWorker {
    session: CombatSession,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<CombatEvent>,
    window_timeout: Duration,
    armed: Option<ArmedWindow>,
}

impl SessionWorker {
    pub fn new(
        session: CombatSession,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<CombatEvent>,
        window_timeout: Duration,
    ) -> Self {
        Self {
            session,
            command_rx,
            event_tx,
            window_timeout,
            armed: None,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        // a window may already be open in a session handed over mid-encounter
        self.sync_deadline();

        loop {
            let deadline = self.armed.as_ref().map(|armed| armed.deadline);
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.expire_window();
                }
            }
        }

        debug!(target: "combat_host::worker", revision = self.session.revision(), "session worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                let result = self.session.start().map_err(Into::into);
                self.finish(reply, result);
            }
            Command::SubmitAction {
                actor,
                action,
                reply,
            } => {
                let result = self.session.submit_action(&actor, action).map_err(Into::into);
                self.finish(reply, result);
            }
            Command::SubmitProposal {
                actor,
                action,
                revision,
                reply,
            } => {
                let result = self
                    .session
                    .submit_proposal(&actor, action, revision)
                    .map_err(Into::into);
                self.finish(reply, result);
            }
            Command::DeclareReaction {
                reactor,
                reaction,
                reply,
            } => {
                let result = self
                    .session
                    .declare_reaction(&reactor, reaction)
                    .map_err(Into::into);
                self.finish(reply, result);
            }
            Command::PassReaction { reactor, reply } => {
                let result = self.session.pass_reaction(&reactor).map_err(Into::into);
                self.finish(reply, result);
            }
            Command::CloseWindow { reply } => {
                let result = self.session.close_reaction_window().map_err(Into::into);
                self.finish(reply, result);
            }
            Command::EndEncounter { reply } => {
                let result = self.session.end_encounter().map_err(Into::into);
                self.finish(reply, result);
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.session.get_combat_state());
            }
            Command::Shutdown => {}
        }
    }

    /// Publish what the command committed, then answer the caller
    fn finish<T>(&mut self, reply: oneshot::Sender<Result<T>>, result: Result<T>) {
        if let Err(err) = &result {
            if err.engine().is_some_and(|e| e.is_fault()) {
                error!(target: "combat_host::worker", error = %err, "session faulted");
            }
        }
        self.publish();
        self.sync_deadline();
        let _ = reply.send(result);
    }

    fn expire_window(&mut self) {
        let Some(armed) = self.armed.take() else {
            return;
        };
        info!(target: "combat_host::worker", window = armed.window, "reaction window timed out");

        if let Err(err) = self.session.close_reaction_window() {
            error!(target: "combat_host::worker", window = armed.window, error = %err, "failed to close timed out window");
        }
        self.publish();
        self.sync_deadline();
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // no subscribers is fine; the session keeps the full log
            let _ = self.event_tx.send(event);
        }
    }

    /// Arm a deadline for a newly opened window, or drop a stale one
    ///
    /// A faulted session rejects every close, so nothing is armed.
    fn sync_deadline(&mut self) {
        let open = self
            .session
            .pending_window()
            .filter(|_| !self.session.is_faulted())
            .map(|window| window.id);
        let armed = self.armed.as_ref().map(|armed| armed.window);
        match (open, armed) {
            (Some(window), Some(armed)) if armed == window => {}
            (Some(window), _) => {
                debug!(
                    target: "combat_host::worker",
                    window,
                    timeout_ms = self.window_timeout.as_millis() as u64,
                    "reaction window armed"
                );
                self.armed = Some(ArmedWindow {
                    window,
                    deadline: Instant::now() + self.window_timeout,
                });
            }
            (None, _) => self.armed = None,
        }
    }
}
