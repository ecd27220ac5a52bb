//! Reaction system - one-shot windows, reaction slots and chains

pub(crate) mod engine;
mod outcome;
mod window;

pub use outcome::{ReactionEffect, ReactionOutcome};
pub use window::{
    PendingAttack, ReactionWindow, ReactorEntry, ReactorState, SuspendedAction, WindowId,
};

use crate::config::ActionCosts;
use serde::{Deserialize, Serialize};

/// Event a reaction answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    OnAttacked,
    OnAllyAttacked,
    OnEnemyLeavesMeleeRange,
    /// Opened by the reactor's own successful Parry
    OnSuccessfulParry,
    /// Opened by the reactor's own successful Raise Shield
    OnSuccessfulRaiseShield,
}

impl TriggerKind {
    /// Chain triggers follow a reaction instead of an opponent's action
    pub fn is_chain(&self) -> bool {
        matches!(
            self,
            TriggerKind::OnSuccessfulParry | TriggerKind::OnSuccessfulRaiseShield
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Parry,
    Riposte,
    RaiseShield,
    ShieldBash,
    Dodge,
    OpportunityAttack,
    Interpose,
}

impl ReactionKind {
    pub fn trigger(&self) -> TriggerKind {
        match self {
            ReactionKind::Parry | ReactionKind::RaiseShield | ReactionKind::Dodge => {
                TriggerKind::OnAttacked
            }
            ReactionKind::Interpose => TriggerKind::OnAllyAttacked,
            ReactionKind::OpportunityAttack => TriggerKind::OnEnemyLeavesMeleeRange,
            ReactionKind::Riposte => TriggerKind::OnSuccessfulParry,
            ReactionKind::ShieldBash => TriggerKind::OnSuccessfulRaiseShield,
        }
    }

    /// The chain this reaction opens when it succeeds
    pub fn opens_chain(&self) -> Option<TriggerKind> {
        match self {
            ReactionKind::Parry => Some(TriggerKind::OnSuccessfulParry),
            ReactionKind::RaiseShield => Some(TriggerKind::OnSuccessfulRaiseShield),
            _ => None,
        }
    }

    pub fn is_chain(&self) -> bool {
        self.trigger().is_chain()
    }

    pub fn cost(&self, costs: &ActionCosts) -> u32 {
        match self {
            ReactionKind::Parry => costs.parry,
            ReactionKind::Riposte => costs.riposte,
            ReactionKind::RaiseShield => costs.raise_shield,
            ReactionKind::ShieldBash => costs.shield_bash,
            ReactionKind::Dodge => costs.dodge,
            ReactionKind::OpportunityAttack => costs.opportunity_attack,
            ReactionKind::Interpose => costs.interpose,
        }
    }

    pub fn uses_weapon(&self) -> bool {
        matches!(
            self,
            ReactionKind::Parry | ReactionKind::Riposte | ReactionKind::OpportunityAttack
        )
    }

    pub fn uses_shield(&self) -> bool {
        matches!(self, ReactionKind::RaiseShield | ReactionKind::ShieldBash)
    }
}

/// A reaction as declared into a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionDeclaration {
    pub trigger: TriggerKind,
    pub reaction: ReactionKind,
    /// Set only when a prerequisite succeeded in the same window
    pub chain_eligible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_triggers() {
        assert!(ReactionKind::Riposte.is_chain());
        assert!(ReactionKind::ShieldBash.is_chain());
        assert!(!ReactionKind::Parry.is_chain());
        assert_eq!(
            ReactionKind::Parry.opens_chain(),
            Some(TriggerKind::OnSuccessfulParry)
        );
        assert_eq!(ReactionKind::Dodge.opens_chain(), None);
    }

    #[test]
    fn test_costs_from_config() {
        let costs = ActionCosts::default();
        assert_eq!(ReactionKind::Dodge.cost(&costs), 2);
        assert_eq!(ReactionKind::Riposte.cost(&costs), 1);
    }
}
