//! Inbound combatant description supplied at encounter start

use super::{Combatant, Weapon};
use crate::condition::{Condition, ConditionTracker};
use crate::config::ArmorConstants;
use crate::damage::{Affinities, Conversion};
use crate::defense::{Armor, ArmorWeight, Shield};
use crate::economy::ActionPoints;
use crate::types::{AttributeScores, CombatantId, Position, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Armor as described by the character sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSnapshot {
    pub bonus: u32,
    pub weight: ArmorWeight,
    /// Remaining uses; a missing value means undamaged
    #[serde(default)]
    pub durability: Option<u32>,
}

fn default_ap() -> u32 {
    6
}

/// A character or monster as it enters an encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub team: TeamId,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub attributes: AttributeScores,
    #[serde(default = "default_ap")]
    pub max_ap: u32,
    pub max_hp: u32,
    /// Starting HP; defaults to max
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub armor: Option<ArmorSnapshot>,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub shield: Option<Shield>,
    #[serde(default)]
    pub affinities: Affinities,
    #[serde(default)]
    pub conversion: Option<Conversion>,
    /// Conditions carried in from before the encounter
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl CombatantSnapshot {
    /// Build the session-owned combatant; HP and durability are clamped to max
    pub fn into_combatant(self, constants: &ArmorConstants) -> Combatant {
        let armor = self.armor.map(|a| {
            let max = a.weight.max_durability(constants);
            Armor {
                bonus: a.bonus,
                weight: a.weight,
                durability: a.durability.unwrap_or(max).min(max),
            }
        });

        let mut conditions = ConditionTracker::new();
        for condition in self.conditions {
            conditions.apply(condition);
        }

        Combatant {
            id: self.id,
            team: self.team,
            position: self.position,
            attributes: self.attributes,
            ap: ActionPoints::full(self.max_ap),
            hp: self.hp.unwrap_or(self.max_hp).min(self.max_hp),
            max_hp: self.max_hp,
            armor,
            weapon: self.weapon,
            shield: self.shield,
            affinities: self.affinities,
            conversion: self.conversion,
            conditions,
            reactions_used: BTreeSet::new(),
        }
    }
}
