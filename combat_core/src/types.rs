//! Core types shared by every engine component

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a combatant within an encounter
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        CombatantId(s.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(s: String) -> Self {
        CombatantId(s)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side a combatant fights for. Combatants sharing a team are allies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

/// Grid square occupied by a combatant (one square = 5 ft)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Chebyshev distance in squares (diagonals count as one square)
    pub fn distance(&self, other: &Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Whether `other` is within melee reach of this square
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) <= 1
    }
}

/// The six primary attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Agility,
    Constitution,
    Intelligence,
    Spirit,
    Charisma,
}

/// Raw attribute scores for a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeScores {
    #[serde(default = "default_score")]
    pub strength: i32,
    #[serde(default = "default_score")]
    pub agility: i32,
    #[serde(default = "default_score")]
    pub constitution: i32,
    #[serde(default = "default_score")]
    pub intelligence: i32,
    #[serde(default = "default_score")]
    pub spirit: i32,
    #[serde(default = "default_score")]
    pub charisma: i32,
}

fn default_score() -> i32 {
    10
}

impl Default for AttributeScores {
    fn default() -> Self {
        AttributeScores {
            strength: 10,
            agility: 10,
            constitution: 10,
            intelligence: 10,
            spirit: 10,
            charisma: 10,
        }
    }
}

impl AttributeScores {
    /// Get the raw score for an attribute
    pub fn score(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Spirit => self.spirit,
            Attribute::Charisma => self.charisma,
        }
    }

    /// Modifier derived from a score: `floor((score - 10) / 2)`
    pub fn modifier(&self, attribute: Attribute) -> i32 {
        (self.score(attribute) - 10).div_euclid(2)
    }

    /// Builder-style override of a single score
    pub fn with(mut self, attribute: Attribute, score: i32) -> Self {
        match attribute {
            Attribute::Strength => self.strength = score,
            Attribute::Agility => self.agility = score,
            Attribute::Constitution => self.constitution = score,
            Attribute::Intelligence => self.intelligence = score,
            Attribute::Spirit => self.spirit = score,
            Attribute::Charisma => self.charisma = score,
        }
        self
    }
}

/// Polyhedral die sizes used by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieSize {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieSize {
    /// Number of faces
    pub fn sides(&self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
            DieSize::D20 => 20,
        }
    }

    /// The next smaller die, or `None` below a d4
    pub fn step_down(&self) -> Option<DieSize> {
        match self {
            DieSize::D4 => None,
            DieSize::D6 => Some(DieSize::D4),
            DieSize::D8 => Some(DieSize::D6),
            DieSize::D10 => Some(DieSize::D8),
            DieSize::D12 => Some(DieSize::D10),
            DieSize::D20 => Some(DieSize::D12),
        }
    }
}

impl fmt::Display for DieSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Schools of magic a spell die can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellSchool {
    Fire,
    Frost,
    Lightning,
    Arcane,
    Nature,
    Necrotic,
    Radiant,
    Psychic,
}

/// Damage types recognised by the modifier pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Frost,
    Lightning,
    Arcane,
    Nature,
    Necrotic,
    Radiant,
    Psychic,
}

impl From<SpellSchool> for DamageType {
    fn from(school: SpellSchool) -> Self {
        match school {
            SpellSchool::Fire => DamageType::Fire,
            SpellSchool::Frost => DamageType::Frost,
            SpellSchool::Lightning => DamageType::Lightning,
            SpellSchool::Arcane => DamageType::Arcane,
            SpellSchool::Nature => DamageType::Nature,
            SpellSchool::Necrotic => DamageType::Necrotic,
            SpellSchool::Radiant => DamageType::Radiant,
            SpellSchool::Psychic => DamageType::Psychic,
        }
    }
}

/// Weapon property or spell school attached to a die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageTag {
    Slashing,
    Piercing,
    Bludgeoning,
    Ranged,
    Spell(SpellSchool),
}

impl DamageTag {
    /// Damage type dealt by a die carrying this tag
    pub fn damage_type(&self) -> DamageType {
        match self {
            DamageTag::Slashing => DamageType::Slashing,
            DamageTag::Piercing | DamageTag::Ranged => DamageType::Piercing,
            DamageTag::Bludgeoning => DamageType::Bludgeoning,
            DamageTag::Spell(school) => (*school).into(),
        }
    }

    /// Attribute whose modifier is added to rolls with this tag
    pub fn governing_attribute(&self) -> Attribute {
        match self {
            DamageTag::Slashing | DamageTag::Piercing | DamageTag::Bludgeoning => {
                Attribute::Strength
            }
            DamageTag::Ranged => Attribute::Agility,
            DamageTag::Spell(_) => Attribute::Intelligence,
        }
    }

    pub fn is_melee(&self) -> bool {
        matches!(
            self,
            DamageTag::Slashing | DamageTag::Piercing | DamageTag::Bludgeoning
        )
    }
}

/// A die plus the property tag that decides damage type and crit effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DieSpec {
    pub die: DieSize,
    pub tag: DamageTag,
}

impl DieSpec {
    pub fn new(die: DieSize, tag: DamageTag) -> Self {
        DieSpec { die, tag }
    }

    pub fn max(&self) -> u32 {
        self.die.sides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_modifier_floors() {
        let scores = AttributeScores::default()
            .with(Attribute::Strength, 14)
            .with(Attribute::Agility, 9)
            .with(Attribute::Constitution, 7);

        assert_eq!(scores.modifier(Attribute::Strength), 2);
        assert_eq!(scores.modifier(Attribute::Agility), -1);
        assert_eq!(scores.modifier(Attribute::Constitution), -2);
        assert_eq!(scores.modifier(Attribute::Spirit), 0);
    }

    #[test]
    fn test_die_step_down() {
        assert_eq!(DieSize::D12.step_down(), Some(DieSize::D10));
        assert_eq!(DieSize::D4.step_down(), None);
    }

    #[test]
    fn test_tag_mapping() {
        assert_eq!(DamageTag::Ranged.damage_type(), DamageType::Piercing);
        assert_eq!(DamageTag::Ranged.governing_attribute(), Attribute::Agility);
        assert_eq!(
            DamageTag::Spell(SpellSchool::Frost).damage_type(),
            DamageType::Frost
        );
        assert!(!DamageTag::Spell(SpellSchool::Fire).is_melee());
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.distance(&Position::new(1, 1)), 1);
        assert_eq!(a.distance(&Position::new(-3, 2)), 3);
        assert!(a.is_adjacent(&Position::new(1, -1)));
        assert!(!a.is_adjacent(&Position::new(2, 0)));
    }

    #[test]
    fn test_damage_tag_serialization() {
        let json = serde_json::to_string(&DamageTag::Spell(SpellSchool::Fire)).unwrap();
        assert_eq!(json, r#"{"spell":"fire"}"#);
        let json = serde_json::to_string(&DamageTag::Slashing).unwrap();
        assert_eq!(json, r#""slashing""#);
    }
}
