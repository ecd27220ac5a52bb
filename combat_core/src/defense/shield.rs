//! Shields - a reduction die raised as a reaction

use crate::dice::DiceRoller;
use crate::types::DieSize;
use serde::{Deserialize, Serialize};

/// An equipped shield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shield {
    pub die: DieSize,
    /// Blocks left before the shield is useless
    pub durability: u32,
}

/// Result of raising a shield against one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldBlock {
    pub rolled: u32,
    /// Damage actually soaked, at most the incoming damage
    pub absorbed: u32,
    pub after: u32,
}

impl ShieldBlock {
    /// A block succeeds when it soaks at least one point
    pub fn succeeded(&self) -> bool {
        self.absorbed > 0
    }
}

impl Shield {
    pub fn new(die: DieSize, durability: u32) -> Self {
        Shield { die, durability }
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    /// Roll the shield die against incoming damage, wearing the shield by one
    pub fn block(&mut self, damage: u32, dice: &mut dyn DiceRoller) -> ShieldBlock {
        let rolled = dice.roll(self.die);
        self.durability = self.durability.saturating_sub(1);
        let absorbed = rolled.min(damage);
        ShieldBlock {
            rolled,
            absorbed,
            after: damage - absorbed,
        }
    }
}
