//! CombatSession - the single authoritative owner of an encounter
//!
//! Every mutation runs against a clone of the encounter state. The clone is
//! swapped in, and its events appended to the log, only when the mutation
//! succeeds and the result passes the invariant checks. A rejected proposal
//! leaves the session exactly as it was.

mod action;
mod event;
mod invariants;
mod outcome;
mod snapshot;
pub(crate) mod state;
pub(crate) mod strike;
mod turn;

pub use action::{Action, SpellCondition, SpellSpec};
pub use event::{CombatEvent, InitiativeRoll};
pub use outcome::{ActionOutcome, AttackReport};
pub use snapshot::CombatStateSnapshot;
pub use state::{CombatRound, EncounterPhase};

use crate::combatant::{Combatant, CombatantSnapshot};
use crate::config::{default_miss_table, EngineConstants, MissTable};
use crate::dice::DiceRoller;
use crate::error::{EngineError, InvariantViolation, Result};
use crate::reaction::{ReactionKind, ReactionOutcome, ReactionWindow};
use crate::types::CombatantId;
use state::{EncounterState, ResolveCtx};
use std::collections::BTreeMap;

pub struct CombatSession {
    state: EncounterState,
    dice: Box<dyn DiceRoller + Send>,
    constants: EngineConstants,
    miss_table: MissTable,
    revision: u64,
    log: Vec<CombatEvent>,
    /// Log index up to which events have been handed out
    drained: usize,
    fault: Option<InvariantViolation>,
}

impl CombatSession {
    /// Create a session with the bundled rule constants and miss table
    pub fn new(
        snapshots: impl IntoIterator<Item = CombatantSnapshot>,
        dice: impl DiceRoller + Send + 'static,
    ) -> Result<Self> {
        Self::with_config(
            snapshots,
            dice,
            EngineConstants::bundled(),
            default_miss_table(),
        )
    }

    pub fn with_config(
        snapshots: impl IntoIterator<Item = CombatantSnapshot>,
        dice: impl DiceRoller + Send + 'static,
        constants: EngineConstants,
        miss_table: MissTable,
    ) -> Result<Self> {
        let combatants: Vec<Combatant> = snapshots
            .into_iter()
            .map(|s| s.into_combatant(&constants.armor))
            .collect();
        Self::from_combatants(combatants, dice, constants, miss_table)
    }

    /// Create a session from fully built combatants
    ///
    /// Fails with `InvalidTarget` if two combatants share an id.
    pub fn from_combatants(
        combatants: impl IntoIterator<Item = Combatant>,
        dice: impl DiceRoller + Send + 'static,
        constants: EngineConstants,
        miss_table: MissTable,
    ) -> Result<Self> {
        let mut roster = BTreeMap::new();
        for combatant in combatants {
            if roster.contains_key(&combatant.id) {
                return Err(EngineError::InvalidTarget {
                    target: combatant.id,
                    reason: "duplicate combatant id".to_string(),
                });
            }
            roster.insert(combatant.id.clone(), combatant);
        }
        tracing::debug!(combatants = roster.len(), "session created");

        Ok(CombatSession {
            state: EncounterState::new(roster),
            dice: Box::new(dice),
            constants,
            miss_table,
            revision: 0,
            log: Vec::new(),
            drained: 0,
            fault: None,
        })
    }

    /// Roll initiative and begin the first turn
    pub fn start(&mut self) -> Result<()> {
        self.transact("start", |state, ctx| state.start(ctx))
    }

    pub fn submit_action(&mut self, actor: &CombatantId, action: Action) -> Result<ActionOutcome> {
        self.transact("submit_action", |state, ctx| {
            state.submit_action(actor, action, ctx)
        })
    }

    /// Submit an action proposed against a specific revision
    ///
    /// Fails with `StaleProposal` if anything has committed since.
    pub fn submit_proposal(
        &mut self,
        actor: &CombatantId,
        action: Action,
        revision: u64,
    ) -> Result<ActionOutcome> {
        self.ensure_not_faulted()?;
        if revision != self.revision {
            tracing::debug!(actor = %actor, proposed = revision, current = self.revision, "stale proposal");
            return Err(EngineError::StaleProposal {
                proposed: revision,
                current: self.revision,
            });
        }
        self.submit_action(actor, action)
    }

    pub fn declare_reaction(
        &mut self,
        reactor: &CombatantId,
        reaction: ReactionKind,
    ) -> Result<ReactionOutcome> {
        self.transact("declare_reaction", |state, ctx| {
            state.declare_reaction(reactor, reaction, ctx)
        })
    }

    /// Decline to react; returns the resumed action if that settled the window
    pub fn pass_reaction(&mut self, reactor: &CombatantId) -> Result<Option<ActionOutcome>> {
        self.transact("pass_reaction", |state, ctx| state.pass_reaction(reactor, ctx))
    }

    /// Close the open window as if every pending reactor passed
    pub fn close_reaction_window(&mut self) -> Result<Option<ActionOutcome>> {
        self.transact("close_reaction_window", |state, ctx| {
            state.close_reaction_window(ctx)
        })
    }

    /// End the encounter early with no winner
    pub fn end_encounter(&mut self) -> Result<()> {
        self.transact("end_encounter", |state, ctx| {
            if state.phase == EncounterPhase::Ended {
                return Err(EngineError::EncounterNotActive);
            }
            state.finish(None, ctx);
            Ok(())
        })
    }

    pub fn get_combat_state(&self) -> CombatStateSnapshot {
        CombatStateSnapshot::capture(&self.state, self.revision, self.fault.clone())
    }

    /// Events committed since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        let events = self.log[self.drained..].to_vec();
        self.drained = self.log.len();
        events
    }

    /// The full event log
    pub fn events(&self) -> &[CombatEvent] {
        &self.log
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn phase(&self) -> EncounterPhase {
        self.state.phase
    }

    pub fn current_actor(&self) -> Option<&CombatantId> {
        self.state.ensure_active().ok()?;
        self.state.current_actor()
    }

    pub fn pending_window(&self) -> Option<&ReactionWindow> {
        self.state.window.as_ref()
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.state.combatants.get(id)
    }

    pub fn constants(&self) -> &EngineConstants {
        &self.constants
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == EncounterPhase::Ended
    }

    fn ensure_not_faulted(&self) -> Result<()> {
        match &self.fault {
            Some(violation) => Err(EngineError::Fault {
                violation: violation.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Run one mutation atomically
    fn transact<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut EncounterState, &mut ResolveCtx) -> Result<T>,
    ) -> Result<T> {
        self.ensure_not_faulted()?;

        let mut draft = self.state.clone();
        let mut ctx = ResolveCtx::new(self.dice.as_mut(), &self.constants, &self.miss_table);
        let result = f(&mut draft, &mut ctx).and_then(|value| {
            invariants::check(&draft)?;
            Ok(value)
        });
        let events = ctx.events;

        match result {
            Ok(value) => {
                if !events.is_empty() {
                    self.revision += 1;
                }
                tracing::trace!(op, revision = self.revision, events = events.len(), "committed");
                self.state = draft;
                self.log.extend(events);
                Ok(value)
            }
            Err(EngineError::Fault { violation }) => {
                tracing::error!(op, %violation, "invariant violated, session faulted");
                self.fault = Some(violation.clone());
                self.revision += 1;
                self.log.push(CombatEvent::SessionFaulted {
                    violation: violation.clone(),
                });
                Err(EngineError::Fault { violation })
            }
            Err(err) => {
                tracing::debug!(op, error = %err, "proposal rejected");
                Err(err)
            }
        }
    }
}
