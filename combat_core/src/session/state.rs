//! Encounter state and the scratch context a mutation runs in

use super::CombatEvent;
use crate::combatant::Combatant;
use crate::condition::{Condition, ConditionKind, ConditionTickResult, TickPhase};
use crate::config::{EngineConstants, MissTable};
use crate::dice::DiceRoller;
use crate::economy;
use crate::error::{EngineError, Result};
use crate::reaction::{ReactionWindow, WindowId};
use crate::types::{CombatantId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterPhase {
    Init,
    RollInitiative,
    ActorTurn,
    RoundEnd,
    Ended,
}

/// Round number and initiative order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRound {
    pub round: u32,
    pub order: Vec<CombatantId>,
    /// Index into `order` of the acting combatant
    pub current: usize,
}

impl CombatRound {
    pub fn current_actor(&self) -> Option<&CombatantId> {
        self.order.get(self.current)
    }
}

/// Dice, rules and the event buffer for one mutation
///
/// Events collect here and reach the session log only if the mutation
/// commits.
pub(crate) struct ResolveCtx<'a> {
    pub dice: &'a mut dyn DiceRoller,
    pub constants: &'a EngineConstants,
    pub miss_table: &'a MissTable,
    pub events: Vec<CombatEvent>,
}

impl<'a> ResolveCtx<'a> {
    pub fn new(
        dice: &'a mut dyn DiceRoller,
        constants: &'a EngineConstants,
        miss_table: &'a MissTable,
    ) -> Self {
        ResolveCtx {
            dice,
            constants,
            miss_table,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}

/// Everything a mutation may change, cloned before and swapped in after
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncounterState {
    pub combatants: BTreeMap<CombatantId, Combatant>,
    pub round: CombatRound,
    pub phase: EncounterPhase,
    pub window: Option<ReactionWindow>,
    pub next_window: WindowId,
}

impl EncounterState {
    pub fn new(combatants: BTreeMap<CombatantId, Combatant>) -> Self {
        EncounterState {
            combatants,
            round: CombatRound::default(),
            phase: EncounterPhase::Init,
            window: None,
            next_window: 1,
        }
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.phase == EncounterPhase::ActorTurn {
            Ok(())
        } else {
            Err(EngineError::EncounterNotActive)
        }
    }

    pub fn combatant(&self, id: &CombatantId) -> Result<&Combatant> {
        self.combatants
            .get(id)
            .ok_or_else(|| EngineError::UnknownCombatant {
                combatant: id.clone(),
            })
    }

    pub fn combatant_mut(&mut self, id: &CombatantId) -> Result<&mut Combatant> {
        self.combatants
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownCombatant {
                combatant: id.clone(),
            })
    }

    pub fn current_actor(&self) -> Option<&CombatantId> {
        self.round.current_actor()
    }

    pub fn is_current_actor(&self, id: &CombatantId) -> bool {
        self.current_actor() == Some(id)
    }

    /// Teams that still have someone standing
    pub fn living_teams(&self) -> BTreeSet<TeamId> {
        self.combatants
            .values()
            .filter(|c| !c.is_defeated())
            .map(|c| c.team)
            .collect()
    }

    /// Spend AP the caller has already checked, recording it
    pub fn spend_ap(&mut self, id: &CombatantId, amount: u32, ctx: &mut ResolveCtx) -> Result<u32> {
        let combatant = self.combatant_mut(id)?;
        let remaining = economy::spend(combatant, amount)?;
        ctx.emit(CombatEvent::ApSpent {
            combatant: id.clone(),
            amount,
            remaining,
        });
        Ok(remaining)
    }

    /// Place a condition on a combatant
    ///
    /// An end-of-turn condition landing on the acting combatant gains a
    /// round, since the current turn's end would otherwise use one up.
    pub fn apply_condition(
        &mut self,
        id: &CombatantId,
        mut condition: Condition,
        ctx: &mut ResolveCtx,
    ) -> Result<()> {
        if condition.is_active()
            && condition.phase == TickPhase::EndOfTurn
            && self.phase == EncounterPhase::ActorTurn
            && self.is_current_actor(id)
        {
            condition.remaining += 1;
        }
        let kind = condition.kind;
        let combatant = self.combatant_mut(id)?;
        let application = combatant.conditions.apply(condition);
        let remaining = combatant.conditions.remaining(kind).unwrap_or(0);
        tracing::debug!(combatant = %id, ?kind, remaining, ?application, "condition applied");
        ctx.emit(CombatEvent::ConditionApplied {
            combatant: id.clone(),
            kind,
            remaining,
            application,
        });
        Ok(())
    }

    pub fn consume_condition(
        &mut self,
        id: &CombatantId,
        kind: ConditionKind,
        ctx: &mut ResolveCtx,
    ) -> Result<bool> {
        let consumed = self.combatant_mut(id)?.conditions.consume(kind);
        if consumed {
            ctx.emit(CombatEvent::ConditionConsumed {
                combatant: id.clone(),
                kind,
            });
        }
        Ok(consumed)
    }

    /// Take HP away outside the damage pipeline; returns HP lost
    pub fn direct_damage(
        &mut self,
        id: &CombatantId,
        amount: u32,
        ctx: &mut ResolveCtx,
    ) -> Result<u32> {
        let lost = self.combatant_mut(id)?.take_damage(amount);
        if lost > 0 {
            ctx.emit(CombatEvent::DirectDamage {
                combatant: id.clone(),
                amount: lost,
            });
        }
        self.note_defeat(id, lost, ctx)?;
        Ok(lost)
    }

    /// Emit a defeat event when the last hit took the combatant to zero
    pub fn note_defeat(&self, id: &CombatantId, lost: u32, ctx: &mut ResolveCtx) -> Result<bool> {
        let defeated = lost > 0 && self.combatant(id)?.is_defeated();
        if defeated {
            tracing::info!(combatant = %id, "combatant defeated");
            ctx.emit(CombatEvent::CombatantDefeated {
                combatant: id.clone(),
            });
        }
        Ok(defeated)
    }

    pub fn heal(&mut self, id: &CombatantId, amount: u32, ctx: &mut ResolveCtx) -> Result<u32> {
        let combatant = self.combatant_mut(id)?;
        if combatant.is_defeated() || amount == 0 {
            return Ok(0);
        }
        let restored = combatant.heal(amount);
        if restored > 0 {
            ctx.emit(CombatEvent::Healed {
                combatant: id.clone(),
                amount: restored,
            });
        }
        Ok(restored)
    }

    /// Record tick damage and expiries for one combatant
    pub fn apply_tick(
        &mut self,
        id: &CombatantId,
        tick: ConditionTickResult,
        ctx: &mut ResolveCtx,
    ) -> Result<()> {
        for damage in &tick.damage {
            let lost = self.combatant_mut(id)?.take_damage(damage.amount);
            ctx.emit(CombatEvent::ConditionDamage {
                combatant: id.clone(),
                kind: damage.kind,
                amount: lost,
            });
            self.note_defeat(id, lost, ctx)?;
        }
        for kind in tick.expired {
            tracing::debug!(combatant = %id, ?kind, "condition expired");
            ctx.emit(CombatEvent::ConditionExpired {
                combatant: id.clone(),
                kind,
            });
        }
        Ok(())
    }
}
