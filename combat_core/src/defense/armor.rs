//! Armor - converts armor bonus and durability into a reduction die

use crate::combatant::Combatant;
use crate::condition::{ConditionKind, ConditionTracker};
use crate::config::ArmorConstants;
use crate::dice::DiceRoller;
use crate::types::DieSize;
use serde::{Deserialize, Serialize};

/// Weight class, which decides how many hits a piece can absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

impl ArmorWeight {
    pub fn max_durability(&self, constants: &ArmorConstants) -> u32 {
        match self {
            ArmorWeight::Light => constants.light_durability,
            ArmorWeight::Medium => constants.medium_durability,
            ArmorWeight::Heavy => constants.heavy_durability,
        }
    }
}

/// Worn armor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub bonus: u32,
    pub weight: ArmorWeight,
    /// Hits left before the piece is broken
    pub durability: u32,
}

impl Armor {
    /// A fresh piece at full durability for its weight
    pub fn new(bonus: u32, weight: ArmorWeight, constants: &ArmorConstants) -> Self {
        Armor {
            bonus,
            weight,
            durability: weight.max_durability(constants),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    /// Reduction die after wear and the wearer's conditions
    ///
    /// ArmorPierced lowers durability by the configured penalty while it
    /// lasts; a piece at zero effective durability rolls one die smaller.
    /// Unguarded steps the die down one further tier.
    pub fn effective_die(
        &self,
        conditions: &ConditionTracker,
        constants: &ArmorConstants,
    ) -> Option<DieSize> {
        let mut die = reduction_die(self.bonus)?;

        let penalty = if conditions.has(ConditionKind::ArmorPierced) {
            constants.pierce_penalty
        } else {
            0
        };
        if self.durability.saturating_sub(penalty) == 0 {
            die = die.step_down()?;
        }
        if conditions.has(ConditionKind::Unguarded) {
            die = die.step_down()?;
        }
        Some(die)
    }
}

/// Reduction die for an armor bonus
///
/// | bonus | die  |
/// |-------|------|
/// | 0     | none |
/// | 1-2   | d4   |
/// | 3-4   | d6   |
/// | 5-6   | d8   |
/// | 7-8   | d10  |
/// | 9+    | d12  |
pub fn reduction_die(bonus: u32) -> Option<DieSize> {
    match bonus {
        0 => None,
        1..=2 => Some(DieSize::D4),
        3..=4 => Some(DieSize::D6),
        5..=6 => Some(DieSize::D8),
        7..=8 => Some(DieSize::D10),
        _ => Some(DieSize::D12),
    }
}

/// Outcome of armor absorbing one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationResult {
    pub die: Option<DieSize>,
    pub rolled: u32,
    pub before: u32,
    pub after: u32,
    /// Durability left after the hit, `None` when unarmored
    pub durability: Option<u32>,
}

impl MitigationResult {
    fn unarmored(damage: u32) -> Self {
        MitigationResult {
            die: None,
            rolled: 0,
            before: damage,
            after: damage,
            durability: None,
        }
    }
}

/// Run one hit through the combatant's armor
///
/// Rolls the reduction die, subtracts it (never below zero) and wears the
/// armor down by one use.
pub fn mitigate(
    damage: u32,
    combatant: &mut Combatant,
    dice: &mut dyn DiceRoller,
    constants: &ArmorConstants,
) -> MitigationResult {
    let Some(armor) = combatant.armor.as_mut() else {
        return MitigationResult::unarmored(damage);
    };

    let die = armor.effective_die(&combatant.conditions, constants);
    let rolled = die.map(|d| dice.roll(d)).unwrap_or(0);
    armor.durability = armor.durability.saturating_sub(1);

    tracing::trace!(
        combatant = %combatant.id,
        ?die,
        rolled,
        durability = armor.durability,
        "armor absorbed hit"
    );

    MitigationResult {
        die,
        rolled,
        before: damage,
        after: damage.saturating_sub(rolled),
        durability: Some(armor.durability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::dice::ScriptedDice;
    use crate::types::AttributeScores;

    fn armored(bonus: u32, weight: ArmorWeight) -> Combatant {
        let constants = ArmorConstants::default();
        Combatant::new("knight", 1)
            .with_attributes(AttributeScores::default())
            .with_armor(Armor::new(bonus, weight, &constants))
    }

    #[test]
    fn test_reduction_die_table() {
        assert_eq!(reduction_die(0), None);
        assert_eq!(reduction_die(2), Some(DieSize::D4));
        assert_eq!(reduction_die(3), Some(DieSize::D6));
        assert_eq!(reduction_die(6), Some(DieSize::D8));
        assert_eq!(reduction_die(8), Some(DieSize::D10));
        assert_eq!(reduction_die(14), Some(DieSize::D12));
    }

    #[test]
    fn test_plus_six_armor_reduces_by_roll() {
        let mut knight = armored(6, ArmorWeight::Medium);
        let mut dice = ScriptedDice::new([5]);
        let result = mitigate(10, &mut knight, &mut dice, &ArmorConstants::default());

        assert_eq!(result.die, Some(DieSize::D8));
        assert_eq!(result.after, 5);
        assert_eq!(result.durability, Some(27));
    }

    #[test]
    fn test_mitigation_floors_at_zero() {
        let mut knight = armored(10, ArmorWeight::Heavy);
        let mut dice = ScriptedDice::new([12]);
        let result = mitigate(3, &mut knight, &mut dice, &ArmorConstants::default());
        assert_eq!(result.after, 0);
    }

    #[test]
    fn test_broken_armor_steps_down() {
        let mut knight = armored(6, ArmorWeight::Light);
        if let Some(armor) = knight.armor.as_mut() {
            armor.durability = 1;
        }
        let constants = ArmorConstants::default();
        let mut dice = ScriptedDice::new([1, 1]);

        let first = mitigate(5, &mut knight, &mut dice, &constants);
        assert_eq!(first.die, Some(DieSize::D8));
        assert_eq!(first.durability, Some(0));

        let second = mitigate(5, &mut knight, &mut dice, &constants);
        assert_eq!(second.die, Some(DieSize::D6));
        assert_eq!(second.durability, Some(0));
    }

    #[test]
    fn test_pierced_and_unguarded_step_down() {
        let constants = ArmorConstants::default();
        let mut armor = Armor::new(5, ArmorWeight::Light, &constants);
        armor.durability = 2;
        let mut conditions = ConditionTracker::new();
        assert_eq!(armor.effective_die(&conditions, &constants), Some(DieSize::D8));

        conditions.apply(Condition::new(ConditionKind::ArmorPierced, 2));
        assert_eq!(armor.effective_die(&conditions, &constants), Some(DieSize::D6));

        conditions.apply(Condition::new(ConditionKind::Unguarded, 1));
        assert_eq!(armor.effective_die(&conditions, &constants), Some(DieSize::D4));
    }

    #[test]
    fn test_d4_armor_below_floor_gives_nothing() {
        let constants = ArmorConstants::default();
        let mut armor = Armor::new(1, ArmorWeight::Light, &constants);
        armor.durability = 0;
        assert_eq!(armor.effective_die(&ConditionTracker::new(), &constants), None);
    }

    #[test]
    fn test_unarmored_passes_damage_through() {
        let mut peasant = Combatant::new("peasant", 1);
        let mut dice = ScriptedDice::new([]);
        let result = mitigate(7, &mut peasant, &mut dice, &ArmorConstants::default());
        assert_eq!(result.after, 7);
        assert_eq!(result.durability, None);
    }
}
