//! Results returned to the proposer of an action

use crate::combat::{AttackRoll, MissConsequence};
use crate::condition::ConditionKind;
use crate::damage::DamageEvent;
use crate::reaction::{ReactionKind, WindowId};
use crate::types::{CombatantId, Position};
use serde::{Deserialize, Serialize};

/// Everything one attack did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub roll: AttackRoll,
    #[serde(default)]
    pub damage: Option<DamageEvent>,
    #[serde(default)]
    pub negated_by: Option<ReactionKind>,
    #[serde(default)]
    pub miss_consequence: Option<MissConsequence>,
    /// Conditions placed on the target by crit effects or the spell
    #[serde(default)]
    pub conditions: Vec<ConditionKind>,
    #[serde(default)]
    pub target_defeated: bool,
}

impl AttackReport {
    pub(crate) fn new(attacker: CombatantId, target: CombatantId, roll: AttackRoll) -> Self {
        AttackReport {
            attacker,
            target,
            roll,
            damage: None,
            negated_by: None,
            miss_consequence: None,
            conditions: Vec::new(),
            target_defeated: false,
        }
    }

    /// HP the target lost
    pub fn damage_dealt(&self) -> u32 {
        self.damage.as_ref().map(DamageEvent::dealt).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActionOutcome {
    Attack {
        report: AttackReport,
        ap_remaining: u32,
    },
    Moved {
        from: Position,
        to: Position,
        ap_remaining: u32,
    },
    /// The action is suspended until the window closes
    AwaitingReactions {
        window: WindowId,
        reactors: Vec<CombatantId>,
        #[serde(default)]
        roll: Option<AttackRoll>,
        ap_remaining: u32,
    },
    TurnEnded {
        next: Option<CombatantId>,
    },
}

impl ActionOutcome {
    pub fn attack_report(&self) -> Option<&AttackReport> {
        match self {
            ActionOutcome::Attack { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn window(&self) -> Option<WindowId> {
        match self {
            ActionOutcome::AwaitingReactions { window, .. } => Some(*window),
            _ => None,
        }
    }
}
