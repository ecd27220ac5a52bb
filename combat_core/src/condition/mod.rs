//! Condition system - timed status effects with stacking and refresh

pub mod tick;
mod types;

pub use tick::{process_condition_tick, ConditionTickResult, TickDamage};
pub use types::{Condition, ConditionKind, TickPhase};

use crate::dice::DiceRoller;
use serde::{Deserialize, Serialize};

/// What happened when a condition was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    Added,
    /// An existing instance had its duration extended
    Refreshed,
    /// An existing instance already outlasted the new one
    Unchanged,
    Stacked,
    /// Zero-duration conditions are never stored
    Ignored,
}

/// Active conditions on a single combatant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionTracker {
    conditions: Vec<Condition>,
}

impl ConditionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a condition, refreshing an existing instance of the same kind
    pub fn apply(&mut self, condition: Condition) -> Application {
        if !condition.is_active() {
            return Application::Ignored;
        }
        if condition.stackable {
            self.conditions.push(condition);
            return Application::Stacked;
        }
        match self
            .conditions
            .iter_mut()
            .find(|c| c.kind == condition.kind && !c.stackable)
        {
            Some(existing) => {
                let before = existing.remaining;
                existing.refresh(&condition);
                if existing.remaining > before {
                    Application::Refreshed
                } else {
                    Application::Unchanged
                }
            }
            None => {
                self.conditions.push(condition);
                Application::Added
            }
        }
    }

    /// Count down every condition on `phase`, removing expired ones
    pub fn tick(&mut self, phase: TickPhase, dice: &mut dyn DiceRoller) -> ConditionTickResult {
        process_condition_tick(&mut self.conditions, phase, dice)
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }

    pub fn get(&self, kind: ConditionKind) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    pub fn get_mut(&mut self, kind: ConditionKind) -> Option<&mut Condition> {
        self.conditions.iter_mut().find(|c| c.kind == kind)
    }

    /// Longest remaining duration among instances of `kind`
    pub fn remaining(&self, kind: ConditionKind) -> Option<u32> {
        self.conditions
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.remaining)
            .max()
    }

    /// Remove every instance of `kind`; returns whether any was present
    pub fn remove(&mut self, kind: ConditionKind) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.kind != kind);
        self.conditions.len() != before
    }

    /// Remove a one-shot condition because its effect was used
    pub fn consume(&mut self, kind: ConditionKind) -> bool {
        self.remove(kind)
    }

    /// AP penalty for the coming reset, consuming Distracted
    pub fn consume_distraction(&mut self) -> u32 {
        u32::from(self.consume(ConditionKind::Distracted))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// The condition preventing actions and reactions, if any
    pub fn blocking_condition(&self) -> Option<ConditionKind> {
        self.conditions
            .iter()
            .map(|c| c.kind)
            .find(ConditionKind::blocks_actions)
    }

    /// Squares the bearer may move out of `base`
    pub fn movement_allowance(&self, base: u32) -> u32 {
        if self.has(ConditionKind::Restrained) || self.has(ConditionKind::Grappled) {
            0
        } else if self.has(ConditionKind::Pinned) || self.has(ConditionKind::OffBalance) {
            base / 2
        } else {
            base
        }
    }

    /// Whether the bearer's own attacks roll with disadvantage
    pub fn hinders_attacks(&self) -> bool {
        self.conditions.iter().any(|c| c.kind.hinders_attacks())
    }

    /// Whether attacks against the bearer roll with advantage
    pub fn grants_advantage(&self, melee: bool) -> bool {
        self.has(ConditionKind::Stunned)
            || self.has(ConditionKind::Restrained)
            || self.has(ConditionKind::Flatfooted)
            || (melee && self.has(ConditionKind::Prone))
    }

    pub fn is_disarmed(&self) -> bool {
        self.has(ConditionKind::Disarmed)
    }

    /// How far the bearer widens an attacker's miss range
    pub fn dodge_rating(&self) -> u32 {
        self.get(ConditionKind::Dodging)
            .map(|c| c.magnitude.unwrap_or(1))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_same_kind_refreshes_to_max() {
        let mut tracker = ConditionTracker::new();
        assert_eq!(
            tracker.apply(Condition::new(ConditionKind::Pinned, 2)),
            Application::Added
        );
        assert_eq!(
            tracker.apply(Condition::new(ConditionKind::Pinned, 1)),
            Application::Unchanged
        );
        assert_eq!(tracker.remaining(ConditionKind::Pinned), Some(2));
        assert_eq!(
            tracker.apply(Condition::new(ConditionKind::Pinned, 4)),
            Application::Refreshed
        );
        assert_eq!(tracker.remaining(ConditionKind::Pinned), Some(4));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_stackable_adds_instances() {
        let mut tracker = ConditionTracker::new();
        tracker.apply(Condition::new(ConditionKind::Bleeding, 2).stackable());
        tracker.apply(Condition::new(ConditionKind::Bleeding, 3).stackable());
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.remaining(ConditionKind::Bleeding), Some(3));
    }

    #[test]
    fn test_zero_duration_ignored() {
        let mut tracker = ConditionTracker::new();
        assert_eq!(
            tracker.apply(Condition::new(ConditionKind::Stunned, 0)),
            Application::Ignored
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_tick_removes_at_zero() {
        let mut tracker = ConditionTracker::new();
        tracker.apply(Condition::new(ConditionKind::Stunned, 1));
        let mut dice = ScriptedDice::new([]);

        let start = tracker.tick(TickPhase::StartOfTurn, &mut dice);
        assert!(start.expired.is_empty());
        assert!(tracker.has(ConditionKind::Stunned));

        let end = tracker.tick(TickPhase::EndOfTurn, &mut dice);
        assert_eq!(end.expired, vec![ConditionKind::Stunned]);
        assert!(!tracker.has(ConditionKind::Stunned));
    }

    #[test]
    fn test_queries() {
        let mut tracker = ConditionTracker::new();
        assert_eq!(tracker.movement_allowance(6), 6);
        assert!(tracker.blocking_condition().is_none());

        tracker.apply(Condition::new(ConditionKind::Pinned, 2));
        assert_eq!(tracker.movement_allowance(6), 3);

        tracker.apply(Condition::new(ConditionKind::Grappled, 1));
        assert_eq!(tracker.movement_allowance(6), 0);

        tracker.apply(Condition::new(ConditionKind::Prone, 1));
        assert!(tracker.hinders_attacks());
        assert!(tracker.grants_advantage(true));
        assert!(!tracker.grants_advantage(false));

        tracker.apply(Condition::new(ConditionKind::Incapacitated, 1));
        assert_eq!(
            tracker.blocking_condition(),
            Some(ConditionKind::Incapacitated)
        );
    }

    #[test]
    fn test_distraction_consumed_once() {
        let mut tracker = ConditionTracker::new();
        tracker.apply(Condition::new(ConditionKind::Distracted, 1));
        assert_eq!(tracker.consume_distraction(), 1);
        assert_eq!(tracker.consume_distraction(), 0);
    }

    #[test]
    fn test_dodge_rating() {
        let mut tracker = ConditionTracker::new();
        assert_eq!(tracker.dodge_rating(), 0);
        tracker.apply(Condition::new(ConditionKind::Dodging, 1));
        assert_eq!(tracker.dodge_rating(), 1);
        tracker.apply(Condition::new(ConditionKind::Dodging, 1).with_magnitude(2));
        assert_eq!(tracker.dodge_rating(), 2);
    }
}
