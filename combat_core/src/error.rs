//! Engine error taxonomy
//!
//! Every variant except [`EngineError::Fault`] is a recoverable rejection: the
//! proposal was refused before any state changed and the caller may retry.

use crate::condition::ConditionKind;
use crate::reaction::{ReactionKind, TriggerKind};
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineError {
    #[error("insufficient AP: need {needed}, have {available}")]
    #[serde(rename = "insufficient_ap")]
    InsufficientAP { needed: u32, available: u32 },

    #[error("invalid target {target}: {reason}")]
    InvalidTarget { target: CombatantId, reason: String },

    #[error("target out of range: {distance} squares, reach {range}")]
    OutOfRange { distance: u32, range: u32 },

    #[error("{combatant} cannot act while {condition:?}")]
    ConditionBlocksAction {
        combatant: CombatantId,
        condition: ConditionKind,
    },

    #[error("no reaction window is open for {combatant}")]
    ReactionWindowClosed { combatant: CombatantId },

    #[error("{combatant} already reacted to {trigger:?}")]
    NoReactionSlotAvailable {
        combatant: CombatantId,
        trigger: TriggerKind,
    },

    #[error("unknown combatant {combatant}")]
    UnknownCombatant { combatant: CombatantId },

    #[error("stale proposal: based on revision {proposed}, session is at {current}")]
    StaleProposal { proposed: u64, current: u64 },

    #[error("it is not {combatant}'s turn")]
    NotYourTurn { combatant: CombatantId },

    #[error("a reaction window is awaiting declarations")]
    ReactionPending,

    #[error("{reaction:?} cannot answer this trigger: {reason}")]
    InvalidReaction {
        reaction: ReactionKind,
        reason: String,
    },

    #[error("{combatant} has no {item} equipped")]
    MissingEquipment {
        combatant: CombatantId,
        item: String,
    },

    #[error("encounter is not in progress")]
    EncounterNotActive,

    #[error("engine fault: {violation}")]
    Fault { violation: InvariantViolation },
}

impl EngineError {
    /// Whether this error signals a logic bug rather than a rejected proposal
    pub fn is_fault(&self) -> bool {
        matches!(self, EngineError::Fault { .. })
    }
}

impl From<InvariantViolation> for EngineError {
    fn from(violation: InvariantViolation) -> Self {
        EngineError::Fault { violation }
    }
}

/// Internal consistency failure; the session refuses further mutation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("{combatant} has {current} AP above max {max}")]
    ApExceedsMax {
        combatant: CombatantId,
        current: u32,
        max: u32,
    },

    #[error("{combatant} has {current} HP above max {max}")]
    HpExceedsMax {
        combatant: CombatantId,
        current: u32,
        max: u32,
    },

    #[error("{combatant} retains an expired {condition:?}")]
    ExpiredConditionRetained {
        combatant: CombatantId,
        condition: ConditionKind,
    },

    #[error("initiative order references unknown combatant {combatant}")]
    UnknownInInitiative { combatant: CombatantId },
}
