//! Condition tick processing

use super::{Condition, ConditionKind, TickPhase};
use crate::dice::DiceRoller;
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};

/// Damage dealt by one ticking condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickDamage {
    pub kind: ConditionKind,
    pub source: Option<CombatantId>,
    pub amount: u32,
}

/// Result of ticking one phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTickResult {
    pub damage: Vec<TickDamage>,
    /// Kinds removed because their duration ran out
    pub expired: Vec<ConditionKind>,
}

impl ConditionTickResult {
    pub fn total_damage(&self) -> u32 {
        self.damage.iter().map(|d| d.amount).sum()
    }
}

/// Tick every condition matching `phase`
///
/// Damage dice roll before the duration decrements, so a Bleeding with one
/// round left still bleeds once.
pub fn process_condition_tick(
    conditions: &mut Vec<Condition>,
    phase: TickPhase,
    dice: &mut dyn DiceRoller,
) -> ConditionTickResult {
    let mut result = ConditionTickResult::default();

    for condition in conditions.iter_mut().filter(|c| c.phase == phase) {
        if let Some(die) = condition.tick_damage {
            result.damage.push(TickDamage {
                kind: condition.kind,
                source: condition.source.clone(),
                amount: dice.roll(die),
            });
        }
        condition.remaining = condition.remaining.saturating_sub(1);
    }

    result.expired = conditions
        .iter()
        .filter(|c| !c.is_active())
        .map(|c| c.kind)
        .collect();

    conditions.retain(|c| c.is_active());

    result
}
