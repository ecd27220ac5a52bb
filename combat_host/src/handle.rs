//! Cloneable façade for issuing commands to a session worker.
//!
//! Every clone feeds the same queue, so concurrent callers are applied one
//! at a time in the order their commands arrive.
use combat_core::{
    Action, ActionOutcome, CombatEvent, CombatStateSnapshot, CombatantId, ReactionKind,
    ReactionOutcome,
};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::{HostError, Result};
use crate::worker::Command;

/// Client-facing handle to interact with a hosted session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<CombatEvent>,
}

impl SessionHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<CombatEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.request(|reply| Command::Start { reply }).await?
    }

    pub async fn submit_action(
        &self,
        actor: impl Into<CombatantId>,
        action: Action,
    ) -> Result<ActionOutcome> {
        let actor = actor.into();
        self.request(|reply| Command::SubmitAction {
            actor,
            action,
            reply,
        })
        .await?
    }

    /// Submit an action built from the state at `revision`
    ///
    /// Fails with `StaleProposal` if another command committed first.
    pub async fn submit_proposal(
        &self,
        actor: impl Into<CombatantId>,
        action: Action,
        revision: u64,
    ) -> Result<ActionOutcome> {
        let actor = actor.into();
        self.request(|reply| Command::SubmitProposal {
            actor,
            action,
            revision,
            reply,
        })
        .await?
    }

    pub async fn declare_reaction(
        &self,
        reactor: impl Into<CombatantId>,
        reaction: ReactionKind,
    ) -> Result<ReactionOutcome> {
        let reactor = reactor.into();
        self.request(|reply| Command::DeclareReaction {
            reactor,
            reaction,
            reply,
        })
        .await?
    }

    pub async fn pass_reaction(
        &self,
        reactor: impl Into<CombatantId>,
    ) -> Result<Option<ActionOutcome>> {
        let reactor = reactor.into();
        self.request(|reply| Command::PassReaction { reactor, reply })
            .await?
    }

    /// Close the open window without waiting for its deadline
    pub async fn close_reaction_window(&self) -> Result<Option<ActionOutcome>> {
        self.request(|reply| Command::CloseWindow { reply }).await?
    }

    pub async fn end_encounter(&self) -> Result<()> {
        self.request(|reply| Command::EndEncounter { reply }).await?
    }

    /// Query the current combat state (read-only snapshot)
    pub async fn get_combat_state(&self) -> Result<CombatStateSnapshot> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Subscribe to events committed from now on
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut events = handle.subscribe();
    /// while let Ok(event) = events.recv().await {
    ///     println!("{}", serde_json::to_string(&event)?);
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<CombatEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| HostError::CommandChannelClosed)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| HostError::CommandChannelClosed)?;

        reply_rx.await.map_err(HostError::ReplyChannelClosed)
    }
}
