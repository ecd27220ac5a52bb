//! Affinity tiers and conversion
//!
//! Increases round up, decreases round down. All arithmetic stays in
//! integers so results never depend on float rounding.

use crate::types::DamageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How strongly a target reacts to a damage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageTier {
    /// x1.25
    Susceptible,
    /// x1.5
    Exposed,
    /// x2
    Vulnerable,
    /// x0.75
    Guarded,
    /// x0.5
    Resistant,
    /// x0
    Immune,
}

impl DamageTier {
    pub fn apply(&self, damage: u32) -> u32 {
        match self {
            DamageTier::Susceptible => (damage * 5).div_ceil(4),
            DamageTier::Exposed => (damage * 3).div_ceil(2),
            DamageTier::Vulnerable => damage * 2,
            DamageTier::Guarded => damage * 3 / 4,
            DamageTier::Resistant => damage / 2,
            DamageTier::Immune => 0,
        }
    }
}

/// Share of dealt damage returned to the attacker as healing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    /// 25%
    Leech,
    /// 50%
    Absorb,
    /// 100%
    Invert,
}

impl Conversion {
    /// Healing granted for `damage` dealt, rounded up
    pub fn healing(&self, damage: u32) -> u32 {
        match self {
            Conversion::Leech => damage.div_ceil(4),
            Conversion::Absorb => damage.div_ceil(2),
            Conversion::Invert => damage,
        }
    }
}

/// A target's tiers by damage type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinities {
    /// Applies to every damage type without its own entry
    #[serde(default)]
    pub all: Option<DamageTier>,
    #[serde(default)]
    pub by_type: BTreeMap<DamageType, DamageTier>,
}

impl Affinities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, damage_type: DamageType, tier: DamageTier) -> Self {
        self.by_type.insert(damage_type, tier);
        self
    }

    pub fn with_all(mut self, tier: DamageTier) -> Self {
        self.all = Some(tier);
        self
    }

    /// The single tier that applies to a damage instance
    pub fn tier_for(&self, damage_type: DamageType) -> Option<DamageTier> {
        self.by_type.get(&damage_type).copied().or(self.all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_tiers_round_up() {
        assert_eq!(DamageTier::Susceptible.apply(10), 13);
        assert_eq!(DamageTier::Susceptible.apply(8), 10);
        assert_eq!(DamageTier::Exposed.apply(5), 8);
        assert_eq!(DamageTier::Vulnerable.apply(10), 20);
    }

    #[test]
    fn test_decrease_tiers_round_down() {
        assert_eq!(DamageTier::Guarded.apply(10), 7);
        assert_eq!(DamageTier::Resistant.apply(7), 3);
        assert_eq!(DamageTier::Immune.apply(50), 0);
    }

    #[test]
    fn test_conversion_rounds_up() {
        assert_eq!(Conversion::Leech.healing(9), 3);
        assert_eq!(Conversion::Absorb.healing(5), 3);
        assert_eq!(Conversion::Invert.healing(7), 7);
        assert_eq!(Conversion::Leech.healing(0), 0);
    }

    #[test]
    fn test_type_entry_beats_blanket() {
        let affinities = Affinities::new()
            .with_all(DamageTier::Resistant)
            .with(DamageType::Fire, DamageTier::Vulnerable);
        assert_eq!(
            affinities.tier_for(DamageType::Fire),
            Some(DamageTier::Vulnerable)
        );
        assert_eq!(
            affinities.tier_for(DamageType::Slashing),
            Some(DamageTier::Resistant)
        );
        assert_eq!(Affinities::new().tier_for(DamageType::Fire), None);
    }

    #[test]
    fn test_affinities_from_toml() {
        let affinities: Affinities = toml::from_str(
            r#"
all = "guarded"

[by_type]
fire = "immune"
"#,
        )
        .unwrap();
        assert_eq!(affinities.tier_for(DamageType::Fire), Some(DamageTier::Immune));
        assert_eq!(
            affinities.tier_for(DamageType::Frost),
            Some(DamageTier::Guarded)
        );
    }
}
