//! Results returned from declaring a reaction

use super::{ReactionDeclaration, ReactionKind, TriggerKind, WindowId};
use crate::defense::ShieldBlock;
use crate::dice::{OpposedResult, SaveResult};
use crate::session::{ActionOutcome, AttackReport};
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};

/// What a resolved reaction did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ReactionEffect {
    Parry {
        parry_total: u32,
        attack_total: u32,
        negated: bool,
    },
    ShieldRaised {
        block: ShieldBlock,
    },
    Dodge {
        dodged: bool,
    },
    Interposed {
        protected: CombatantId,
        save: SaveResult,
        knocked_prone: bool,
    },
    /// Riposte and opportunity attacks resolve as full attacks
    Strike {
        report: AttackReport,
    },
    ShieldBash {
        contest: OpposedResult,
        stunned: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionOutcome {
    pub window: WindowId,
    pub reactor: CombatantId,
    pub declaration: ReactionDeclaration,
    pub effect: ReactionEffect,
    pub success: bool,
    pub ap_remaining: u32,
    /// Follow-up the reactor may now declare in the same window
    pub chain_open: Option<TriggerKind>,
    /// The suspended action, if this declaration settled the window
    pub resumed: Option<ActionOutcome>,
}

impl ReactionOutcome {
    pub fn reaction(&self) -> ReactionKind {
        self.declaration.reaction
    }

    pub fn window_closed(&self) -> bool {
        self.resumed.is_some()
    }
}
