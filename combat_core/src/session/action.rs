//! Actor actions - validation, AP and dispatch

use super::state::{EncounterState, ResolveCtx};
use super::strike::{can_react, AttackRiders};
use super::{ActionOutcome, CombatEvent};
use crate::condition::{Condition, ConditionKind};
use crate::damage::Conversion;
use crate::error::{EngineError, Result};
use crate::reaction::{SuspendedAction, TriggerKind};
use crate::types::{CombatantId, DieSpec, Position};
use serde::{Deserialize, Serialize};

fn default_spell_range() -> u32 {
    6
}

/// Condition a spell places on its target when it lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellCondition {
    pub kind: ConditionKind,
    pub duration: u32,
}

/// A castable spell as the caster's sheet describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSpec {
    pub name: String,
    pub die: DieSpec,
    /// Defaults to the configured cast cost
    #[serde(default)]
    pub ap_cost: Option<u32>,
    #[serde(default = "default_spell_range")]
    pub range: u32,
    #[serde(default)]
    pub conversion: Option<Conversion>,
    #[serde(default)]
    pub on_hit: Option<SpellCondition>,
}

impl SpellSpec {
    pub fn new(name: impl Into<String>, die: DieSpec) -> Self {
        SpellSpec {
            name: name.into(),
            die,
            ap_cost: None,
            range: default_spell_range(),
            conversion: None,
            on_hit: None,
        }
    }
}

/// Something the acting combatant does on their turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Attack { target: CombatantId },
    CastSpell { spell: SpellSpec, target: CombatantId },
    Move { to: Position },
    /// Move without provoking opportunity attacks
    Disengage { to: Position },
    EndTurn,
}

impl EncounterState {
    pub fn submit_action(
        &mut self,
        actor: &CombatantId,
        action: Action,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        self.ensure_active()?;
        if self.window.is_some() {
            return Err(EngineError::ReactionPending);
        }
        self.combatant(actor)?;
        if !self.is_current_actor(actor) {
            return Err(EngineError::NotYourTurn {
                combatant: actor.clone(),
            });
        }

        if let Action::EndTurn = action {
            self.end_turn(ctx)?;
            return Ok(ActionOutcome::TurnEnded {
                next: self.next_actor(),
            });
        }
        if let Some(condition) = self.combatant(actor)?.conditions.blocking_condition() {
            return Err(EngineError::ConditionBlocksAction {
                combatant: actor.clone(),
                condition,
            });
        }

        let outcome = match action {
            Action::Attack { target } => self.weapon_attack(actor, &target, ctx)?,
            Action::CastSpell { spell, target } => self.cast_spell(actor, spell, &target, ctx)?,
            Action::Move { to } => self.move_to(actor, to, true, ctx)?,
            Action::Disengage { to } => self.move_to(actor, to, false, ctx)?,
            Action::EndTurn => return Ok(ActionOutcome::TurnEnded { next: None }),
        };

        self.after_action(actor, ctx)?;
        Ok(outcome)
    }

    /// Close out the actor's turn if the action left nothing to do
    pub fn after_action(&mut self, actor: &CombatantId, ctx: &mut ResolveCtx) -> Result<()> {
        if self.window.is_some() || self.check_encounter_end(ctx) {
            return Ok(());
        }
        if !self.is_current_actor(actor) {
            return Ok(());
        }
        let combatant = self.combatant(actor)?;
        let exhausted = ctx.constants.turn.auto_end_turn && combatant.ap.is_exhausted();
        if exhausted || !can_react(combatant) {
            tracing::debug!(combatant = %actor, exhausted, "turn ends automatically");
            self.end_turn(ctx)?;
        }
        Ok(())
    }

    /// Acting combatant once the session settles
    pub fn next_actor(&self) -> Option<CombatantId> {
        self.ensure_active().ok()?;
        self.current_actor().cloned()
    }

    fn weapon_attack(
        &mut self,
        actor: &CombatantId,
        target: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        let attacker = self.combatant(actor)?;
        let Some(weapon) = attacker.weapon.clone() else {
            return Err(EngineError::MissingEquipment {
                combatant: actor.clone(),
                item: "weapon".to_string(),
            });
        };
        if attacker.conditions.is_disarmed() {
            return Err(EngineError::ConditionBlocksAction {
                combatant: actor.clone(),
                condition: ConditionKind::Disarmed,
            });
        }
        let conversion = attacker.conversion;
        self.validate_target(actor, target, weapon.range)?;

        let cost = ctx.constants.action_costs.attack;
        self.combatant(actor)?.ap.check(cost)?;
        self.spend_ap(actor, cost, ctx)?;

        self.launch_attack(
            actor,
            target,
            weapon.die,
            AttackRiders {
                conversion,
                ..Default::default()
            },
            ctx,
        )
    }

    fn cast_spell(
        &mut self,
        actor: &CombatantId,
        spell: SpellSpec,
        target: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        self.validate_target(actor, target, spell.range)?;

        let cost = spell.ap_cost.unwrap_or(ctx.constants.action_costs.cast);
        let caster = self.combatant(actor)?;
        caster.ap.check(cost)?;
        let conversion = spell.conversion.or(caster.conversion);
        self.spend_ap(actor, cost, ctx)?;

        tracing::debug!(caster = %actor, spell = %spell.name, target = %target, "spell cast");
        let on_hit = spell
            .on_hit
            .map(|c| Condition::new(c.kind, c.duration).from_source(actor.clone()));
        self.launch_attack(
            actor,
            target,
            spell.die,
            AttackRiders {
                conversion,
                on_hit,
                is_spell: true,
            },
            ctx,
        )
    }

    /// Reject targets that are missing, friendly, down or out of reach
    fn validate_target(&self, actor: &CombatantId, target: &CombatantId, range: u32) -> Result<()> {
        let attacker = self.combatant(actor)?;
        let defender = self.combatant(target)?;
        let invalid = |reason: &str| EngineError::InvalidTarget {
            target: target.clone(),
            reason: reason.to_string(),
        };

        if attacker.id == defender.id {
            return Err(invalid("cannot target yourself"));
        }
        if attacker.is_ally_of(defender) {
            return Err(invalid("cannot attack an ally"));
        }
        if defender.is_defeated() {
            return Err(invalid("already defeated"));
        }
        let distance = attacker.distance_to(defender);
        if distance > range {
            return Err(EngineError::OutOfRange { distance, range });
        }
        Ok(())
    }

    fn move_to(
        &mut self,
        actor: &CombatantId,
        to: Position,
        provokes: bool,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        let mover = self.combatant(actor)?;
        let from = mover.position;
        let distance = from.distance(&to);
        if distance == 0 {
            return Err(EngineError::InvalidTarget {
                target: actor.clone(),
                reason: "already in that square".to_string(),
            });
        }

        let allowance = mover
            .conditions
            .movement_allowance(ctx.constants.turn.movement_squares);
        if allowance == 0 {
            let condition = [ConditionKind::Restrained, ConditionKind::Grappled]
                .into_iter()
                .find(|k| mover.conditions.has(*k))
                .unwrap_or(ConditionKind::Restrained);
            return Err(EngineError::ConditionBlocksAction {
                combatant: actor.clone(),
                condition,
            });
        }
        if distance > allowance {
            return Err(EngineError::OutOfRange {
                distance,
                range: allowance,
            });
        }
        if let Some(occupant) = self
            .combatants
            .values()
            .find(|c| c.id != *actor && !c.is_defeated() && c.position == to)
        {
            return Err(EngineError::InvalidTarget {
                target: occupant.id.clone(),
                reason: "square is occupied".to_string(),
            });
        }

        let cost = if provokes {
            ctx.constants.action_costs.move_
        } else {
            ctx.constants.action_costs.disengage
        };
        mover.ap.check(cost)?;
        self.spend_ap(actor, cost, ctx)?;

        let reactors = if provokes {
            self.leaving_melee_reactors(actor, from, to, ctx)
        } else {
            Vec::new()
        };

        if reactors.is_empty() {
            return self.finalize_move(actor, from, to, ctx);
        }

        let ap_remaining = self.combatant(actor)?.ap.current;
        let window = self.open_window(
            SuspendedAction::Move {
                mover: actor.clone(),
                from,
                to,
            },
            reactors,
            ctx,
        );
        Ok(ActionOutcome::AwaitingReactions {
            window: window.id,
            reactors: window.open_reactors(),
            roll: None,
            ap_remaining,
        })
    }

    /// Enemies adjacent before the move and not after it
    fn leaving_melee_reactors(
        &self,
        mover: &CombatantId,
        from: Position,
        to: Position,
        ctx: &ResolveCtx,
    ) -> Vec<(CombatantId, TriggerKind)> {
        let Some(moving) = self.combatants.get(mover) else {
            return Vec::new();
        };
        let cost = ctx.constants.action_costs.opportunity_attack;
        self.combatants
            .values()
            .filter(|c| !c.is_ally_of(moving))
            .filter(|c| c.position.is_adjacent(&from) && !c.position.is_adjacent(&to))
            .filter(|c| can_react(c) && c.weapon.is_some() && !c.conditions.is_disarmed())
            .filter(|c| c.ap.current >= cost)
            .map(|c| (c.id.clone(), TriggerKind::OnEnemyLeavesMeleeRange))
            .collect()
    }

    /// Complete a move unless the mover fell along the way
    pub fn finalize_move(
        &mut self,
        actor: &CombatantId,
        from: Position,
        to: Position,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        let mover = self.combatant_mut(actor)?;
        let ap_remaining = mover.ap.current;
        if mover.is_defeated() {
            return Ok(ActionOutcome::Moved {
                from,
                to: from,
                ap_remaining,
            });
        }
        mover.position = to;
        tracing::debug!(combatant = %actor, ?from, ?to, "moved");
        ctx.emit(CombatEvent::Moved {
            combatant: actor.clone(),
            from,
            to,
        });
        Ok(ActionOutcome::Moved {
            from,
            to,
            ap_remaining,
        })
    }
}
