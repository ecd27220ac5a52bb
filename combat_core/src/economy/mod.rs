//! Action economy - per-turn AP pool bookkeeping

use crate::combatant::Combatant;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// A combatant's Action Point pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPoints {
    pub current: u32,
    pub max: u32,
}

impl ActionPoints {
    /// A full pool
    pub fn full(max: u32) -> Self {
        ActionPoints { current: max, max }
    }

    /// Deduct `amount`, returning the new balance
    ///
    /// Fails with `InsufficientAP` and leaves the pool untouched when the
    /// balance does not cover the cost.
    pub fn spend(&mut self, amount: u32) -> Result<u32> {
        self.check(amount)?;
        self.current -= amount;
        Ok(self.current)
    }

    /// Verify `amount` could be spent without spending it
    pub fn check(&self, amount: u32) -> Result<()> {
        if amount > self.current {
            return Err(EngineError::InsufficientAP {
                needed: amount,
                available: self.current,
            });
        }
        Ok(())
    }

    /// Give back AP from a cancelled action, never above max
    pub fn refund(&mut self, amount: u32) -> u32 {
        self.current = (self.current + amount).min(self.max);
        self.current
    }

    /// Refill to max, less any penalty carried into this turn
    pub fn reset(&mut self, penalty: u32) -> u32 {
        self.current = self.max.saturating_sub(penalty);
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.current == 0
    }
}

impl Default for ActionPoints {
    fn default() -> Self {
        ActionPoints::full(6)
    }
}

/// Spend AP from a combatant's pool
pub fn spend(combatant: &mut Combatant, amount: u32) -> Result<u32> {
    let balance = combatant.ap.spend(amount)?;
    tracing::trace!(combatant = %combatant.id, amount, balance, "spent AP");
    Ok(balance)
}

/// Refund AP for an action cancelled before any other side effect
pub fn refund(combatant: &mut Combatant, amount: u32) -> u32 {
    combatant.ap.refund(amount)
}

/// Refill a combatant's AP at the start of their turn
///
/// A `Distracted` combatant starts the turn one AP short; the condition is
/// consumed by the reset.
pub fn reset(combatant: &mut Combatant) -> u32 {
    let penalty = combatant.conditions.consume_distraction();
    combatant.ap.reset(penalty)
}
