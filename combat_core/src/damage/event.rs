//! DamageEvent - the audit trail of one damage instance

use super::DamageTier;
use crate::defense::MitigationResult;
use crate::types::{CombatantId, DamageType};
use serde::{Deserialize, Serialize};

/// Amounts at each stage of the pipeline for a single hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub source: CombatantId,
    pub target: CombatantId,
    pub damage_type: DamageType,
    /// Rolled damage before any defense
    pub raw: u32,
    /// Points soaked by a raised shield
    #[serde(default)]
    pub shield_absorbed: u32,
    pub post_armor: u32,
    pub post_modifier: u32,
    /// Damage actually dealt to the target's HP
    pub post_conversion: u32,
    /// HP restored to the source by conversion
    #[serde(default)]
    pub healing_to_source: u32,
    #[serde(default)]
    pub tier: Option<DamageTier>,
    #[serde(default)]
    pub armor: Option<MitigationResult>,
}

impl DamageEvent {
    /// Final damage to the target
    pub fn dealt(&self) -> u32 {
        self.post_conversion
    }

    /// Total reduction from raw to dealt
    pub fn mitigated(&self) -> u32 {
        self.raw.saturating_sub(self.post_conversion)
    }

    pub fn is_healing(&self) -> bool {
        self.healing_to_source > 0
    }
}
