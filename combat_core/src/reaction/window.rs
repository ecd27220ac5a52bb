//! ReactionWindow - the suspension point between an action and its effect

use super::{ReactionKind, TriggerKind};
use crate::combat::AttackRoll;
use crate::condition::Condition;
use crate::damage::Conversion;
use crate::types::{CombatantId, DieSpec, Position};
use serde::{Deserialize, Serialize};

pub type WindowId = u64;

/// Where one eligible reactor stands in a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReactorState {
    Pending,
    Declared { reaction: ReactionKind },
    /// A prerequisite succeeded; the follow-up may still be declared
    ChainOpen { trigger: TriggerKind },
    Resolved,
    Passed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorEntry {
    pub combatant: CombatantId,
    pub trigger: TriggerKind,
    pub state: ReactorState,
}

impl ReactorEntry {
    /// Whether the window still waits on this reactor
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            ReactorState::Pending | ReactorState::Declared { .. } | ReactorState::ChainOpen { .. }
        )
    }
}

/// A landed attack held back until reactions resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    pub attacker: CombatantId,
    /// Current target; Interpose swaps it
    pub target: CombatantId,
    pub original_target: CombatantId,
    pub spec: DieSpec,
    pub roll: AttackRoll,
    pub conversion: Option<Conversion>,
    /// Condition a spell places on whatever it hits
    pub on_hit: Option<Condition>,
    pub is_spell: bool,
    pub shield_absorbed: u32,
    /// Reaction that turned the attack aside
    pub negated_by: Option<ReactionKind>,
}

/// Action suspended while the window is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuspendedAction {
    Attack(PendingAttack),
    Move {
        mover: CombatantId,
        from: Position,
        to: Position,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionWindow {
    pub id: WindowId,
    pub action: SuspendedAction,
    /// Eligible reactors in the order they were offered the window
    pub reactors: Vec<ReactorEntry>,
}

impl ReactionWindow {
    pub fn new(
        id: WindowId,
        action: SuspendedAction,
        reactors: impl IntoIterator<Item = (CombatantId, TriggerKind)>,
    ) -> Self {
        ReactionWindow {
            id,
            action,
            reactors: reactors
                .into_iter()
                .map(|(combatant, trigger)| ReactorEntry {
                    combatant,
                    trigger,
                    state: ReactorState::Pending,
                })
                .collect(),
        }
    }

    /// Combatant whose action opened the window
    pub fn source(&self) -> &CombatantId {
        match &self.action {
            SuspendedAction::Attack(attack) => &attack.attacker,
            SuspendedAction::Move { mover, .. } => mover,
        }
    }

    pub fn entry(&self, combatant: &CombatantId) -> Option<&ReactorEntry> {
        self.reactors.iter().find(|e| &e.combatant == combatant)
    }

    pub fn entry_mut(&mut self, combatant: &CombatantId) -> Option<&mut ReactorEntry> {
        self.reactors.iter_mut().find(|e| &e.combatant == combatant)
    }

    pub fn attack(&self) -> Option<&PendingAttack> {
        match &self.action {
            SuspendedAction::Attack(attack) => Some(attack),
            SuspendedAction::Move { .. } => None,
        }
    }

    pub fn attack_mut(&mut self) -> Option<&mut PendingAttack> {
        match &mut self.action {
            SuspendedAction::Attack(attack) => Some(attack),
            SuspendedAction::Move { .. } => None,
        }
    }

    /// Every reactor has resolved or passed
    pub fn is_settled(&self) -> bool {
        !self.reactors.iter().any(ReactorEntry::is_open)
    }

    pub fn open_reactors(&self) -> Vec<CombatantId> {
        self.reactors
            .iter()
            .filter(|e| e.is_open())
            .map(|e| e.combatant.clone())
            .collect()
    }

    /// Pass everyone still open; returns who was cut off
    pub fn force_close(&mut self) -> Vec<CombatantId> {
        let mut cut_off = Vec::new();
        for entry in self.reactors.iter_mut().filter(|e| e.is_open()) {
            entry.state = ReactorState::Passed;
            cut_off.push(entry.combatant.clone());
        }
        cut_off
    }
}
