//! Combatant - the per-encounter state of one participant

mod snapshot;

pub use snapshot::{ArmorSnapshot, CombatantSnapshot};

use crate::condition::ConditionTracker;
use crate::damage::{Affinities, Conversion};
use crate::defense::{Armor, Shield};
use crate::economy::ActionPoints;
use crate::reaction::TriggerKind;
use crate::types::{Attribute, AttributeScores, CombatantId, DieSpec, Position, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An equipped weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub die: DieSpec,
    /// Reach in squares; melee weapons reach 1
    #[serde(default = "default_range")]
    pub range: u32,
}

fn default_range() -> u32 {
    1
}

impl Weapon {
    pub fn new(name: impl Into<String>, die: DieSpec) -> Self {
        Weapon {
            name: name.into(),
            die,
            range: default_range(),
        }
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }
}

/// A participant in an encounter, owned by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub team: TeamId,
    pub position: Position,
    pub attributes: AttributeScores,
    pub ap: ActionPoints,
    pub hp: u32,
    pub max_hp: u32,
    pub armor: Option<Armor>,
    pub weapon: Option<Weapon>,
    pub shield: Option<Shield>,
    pub affinities: Affinities,
    /// Innate conversion applied to every hit this combatant lands
    pub conversion: Option<Conversion>,
    pub conditions: ConditionTracker,
    /// Triggers already reacted to in the open window
    pub reactions_used: BTreeSet<TriggerKind>,
}

impl Combatant {
    /// A bare combatant: 10 in every attribute, 6 AP, 10 HP, no gear
    pub fn new(id: impl Into<CombatantId>, team: u32) -> Self {
        Combatant {
            id: id.into(),
            team: TeamId(team),
            position: Position::default(),
            attributes: AttributeScores::default(),
            ap: ActionPoints::default(),
            hp: 10,
            max_hp: 10,
            armor: None,
            weapon: None,
            shield: None,
            affinities: Affinities::default(),
            conversion: None,
            conditions: ConditionTracker::new(),
            reactions_used: BTreeSet::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeScores) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_hp(mut self, max_hp: u32) -> Self {
        self.hp = max_hp;
        self.max_hp = max_hp;
        self
    }

    pub fn with_ap(mut self, max: u32) -> Self {
        self.ap = ActionPoints::full(max);
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = Some(armor);
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    pub fn with_affinities(mut self, affinities: Affinities) -> Self {
        self.affinities = affinities;
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(conversion);
        self
    }

    pub fn modifier(&self, attribute: Attribute) -> i32 {
        self.attributes.modifier(attribute)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn is_ally_of(&self, other: &Combatant) -> bool {
        self.team == other.team
    }

    pub fn distance_to(&self, other: &Combatant) -> u32 {
        self.position.distance(&other.position)
    }

    /// Remove HP, returning the amount actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restore HP up to max, returning the amount actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp - self.hp.min(self.max_hp));
        self.hp += restored;
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut fighter = Combatant::new("fighter", 1).with_hp(20);
        assert_eq!(fighter.take_damage(8), 8);
        assert_eq!(fighter.hp, 12);
        assert_eq!(fighter.heal(50), 8);
        assert_eq!(fighter.hp, 20);
        assert_eq!(fighter.take_damage(99), 20);
        assert!(fighter.is_defeated());
    }

    #[test]
    fn test_allies_share_team() {
        let a = Combatant::new("a", 1);
        let b = Combatant::new("b", 1);
        let c = Combatant::new("c", 2).at(Position::new(3, 0));
        assert!(a.is_ally_of(&b));
        assert!(!a.is_ally_of(&c));
        assert_eq!(a.distance_to(&c), 3);
    }
}
