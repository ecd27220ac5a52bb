//! Roll helpers: advantage, exploding dice, saves and opposed checks

use super::DiceRoller;
use crate::types::DieSize;
use serde::{Deserialize, Serialize};

/// How many dice to roll for a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    /// Roll two, keep the higher
    Advantage,
    /// Roll two, keep the lower
    Disadvantage,
}

impl RollMode {
    /// Resolve advantage and disadvantage sources; having both cancels out
    pub fn combine(advantage: bool, disadvantage: bool) -> Self {
        match (advantage, disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            _ => RollMode::Normal,
        }
    }
}

/// Roll one die under the given mode
pub fn roll_with_mode(dice: &mut dyn DiceRoller, die: DieSize, mode: RollMode) -> u32 {
    let first = dice.roll(die);
    match mode {
        RollMode::Normal => first,
        RollMode::Advantage => first.max(dice.roll(die)),
        RollMode::Disadvantage => first.min(dice.roll(die)),
    }
}

/// Result of a roll that may explode on its maximum face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplodingRoll {
    /// The natural first roll
    pub first: u32,
    /// Sum of the first roll and every explosion
    pub total: u32,
    /// How many extra dice were rolled
    pub explosions: u32,
}

impl ExplodingRoll {
    pub fn exploded(&self) -> bool {
        self.explosions > 0
    }
}

/// Roll a die, rerolling and adding on each maximum face up to `max_depth` times
pub fn roll_exploding(dice: &mut dyn DiceRoller, die: DieSize, max_depth: u32) -> ExplodingRoll {
    let first = dice.roll(die);
    continue_explosion(dice, die, first, max_depth)
}

/// Continue an explosion from an already rolled first face
pub(crate) fn continue_explosion(
    dice: &mut dyn DiceRoller,
    die: DieSize,
    first: u32,
    max_depth: u32,
) -> ExplodingRoll {
    let mut total = first;
    let mut last = first;
    let mut explosions = 0;

    while last == die.sides() && explosions < max_depth {
        last = dice.roll(die);
        total += last;
        explosions += 1;
    }

    ExplodingRoll {
        first,
        total,
        explosions,
    }
}

/// Outcome of a saving throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub die: DieSize,
    pub roll: u32,
    pub modifier: i32,
    pub success: bool,
}

/// Roll a save against a difficulty die
///
/// Natural maximum always succeeds, natural 1 always fails. Otherwise the save
/// succeeds when `roll + modifier` reaches `sides / 2 + 1`.
pub fn saving_throw(
    dice: &mut dyn DiceRoller,
    die: DieSize,
    modifier: i32,
    mode: RollMode,
) -> SaveResult {
    let roll = roll_with_mode(dice, die, mode);
    let success = if roll == die.sides() {
        true
    } else if roll == 1 {
        false
    } else {
        roll as i32 + modifier >= (die.sides() / 2 + 1) as i32
    };

    SaveResult {
        die,
        roll,
        modifier,
        success,
    }
}

/// Outcome of a d20 contest between two modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposedResult {
    pub attacker_total: i32,
    pub defender_total: i32,
    /// Defender wins ties
    pub defender_wins: bool,
}

/// Attacker and defender each roll a d20 plus their modifier
pub fn opposed_check(
    dice: &mut dyn DiceRoller,
    attacker_modifier: i32,
    defender_modifier: i32,
) -> OpposedResult {
    let attacker_total = dice.roll(DieSize::D20) as i32 + attacker_modifier;
    let defender_total = dice.roll(DieSize::D20) as i32 + defender_modifier;
    OpposedResult {
        attacker_total,
        defender_total,
        defender_wins: defender_total >= attacker_total,
    }
}
