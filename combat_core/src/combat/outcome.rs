//! Attack roll results

use crate::dice::RollMode;
use crate::types::DieSize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    Hit,
    Miss,
    Crit,
    CriticalMiss,
}

impl AttackOutcome {
    /// Whether the attack deals damage if nothing intervenes
    pub fn lands(&self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::Crit)
    }
}

/// A single resolved attack or spell roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    pub die: DieSize,
    pub mode: RollMode,
    /// The kept natural roll
    pub natural: u32,
    /// Second roll made after a natural 1
    #[serde(default)]
    pub confirm: Option<u32>,
    /// Total after explosions, when the die exploded
    #[serde(default)]
    pub exploded_total: Option<u32>,
    pub modifier: i32,
    pub outcome: AttackOutcome,
    /// Damage before any defense; zero unless the attack lands
    pub damage: u32,
    /// Turned into a miss by the target's dodge
    #[serde(default)]
    pub dodged: bool,
}

impl AttackRoll {
    /// Natural roll plus explosions
    pub fn total(&self) -> u32 {
        self.exploded_total.unwrap_or(self.natural)
    }

    pub fn is_crit(&self) -> bool {
        self.outcome == AttackOutcome::Crit
    }
}
