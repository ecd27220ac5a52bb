//! CombatEvent - the ordered outbound log

use crate::combat::{AttackRoll, MissConsequence};
use crate::condition::{Application, ConditionKind};
use crate::damage::DamageEvent;
use crate::dice::SaveResult;
use crate::error::InvariantViolation;
use crate::reaction::{ReactionDeclaration, ReactionEffect, ReactionKind, TriggerKind, WindowId};
use crate::types::{Attribute, CombatantId, Position, TeamId};
use serde::{Deserialize, Serialize};

/// One initiative roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    pub combatant: CombatantId,
    pub roll: u32,
    pub modifier: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    EncounterStarted {
        combatants: Vec<CombatantId>,
    },
    InitiativeRolled {
        rolls: Vec<InitiativeRoll>,
        order: Vec<CombatantId>,
    },
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        round: u32,
        combatant: CombatantId,
        ap: u32,
    },
    TurnSkipped {
        combatant: CombatantId,
        condition: ConditionKind,
    },
    TurnEnded {
        combatant: CombatantId,
    },
    RoundEnded {
        round: u32,
    },
    ApSpent {
        combatant: CombatantId,
        amount: u32,
        remaining: u32,
    },
    Moved {
        combatant: CombatantId,
        from: Position,
        to: Position,
    },
    AttackRolled {
        attacker: CombatantId,
        target: CombatantId,
        roll: AttackRoll,
    },
    AttackNegated {
        attacker: CombatantId,
        target: CombatantId,
        by: ReactionKind,
    },
    CriticalMissConsequence {
        combatant: CombatantId,
        table_roll: u32,
        consequence: MissConsequence,
    },
    DamageDealt {
        damage: DamageEvent,
    },
    /// Damage that bypasses the pipeline, e.g. a self-inflicted wound
    DirectDamage {
        combatant: CombatantId,
        amount: u32,
    },
    Healed {
        combatant: CombatantId,
        amount: u32,
    },
    SavingThrow {
        combatant: CombatantId,
        attribute: Attribute,
        result: SaveResult,
    },
    ConditionApplied {
        combatant: CombatantId,
        kind: ConditionKind,
        remaining: u32,
        application: Application,
    },
    ConditionDamage {
        combatant: CombatantId,
        kind: ConditionKind,
        amount: u32,
    },
    ConditionConsumed {
        combatant: CombatantId,
        kind: ConditionKind,
    },
    ConditionExpired {
        combatant: CombatantId,
        kind: ConditionKind,
    },
    ReactionWindowOpened {
        window: WindowId,
        source: CombatantId,
        reactors: Vec<(CombatantId, TriggerKind)>,
    },
    ReactionDeclared {
        window: WindowId,
        combatant: CombatantId,
        declaration: ReactionDeclaration,
    },
    ReactionResolved {
        window: WindowId,
        combatant: CombatantId,
        reaction: ReactionKind,
        effect: ReactionEffect,
        success: bool,
    },
    ReactionPassed {
        window: WindowId,
        combatant: CombatantId,
    },
    ReactionWindowClosed {
        window: WindowId,
        /// Reactors cut off by a forced close
        timed_out: Vec<CombatantId>,
    },
    CombatantDefeated {
        combatant: CombatantId,
    },
    EncounterEnded {
        winner: Option<TeamId>,
    },
    SessionFaulted {
        violation: InvariantViolation,
    },
}
