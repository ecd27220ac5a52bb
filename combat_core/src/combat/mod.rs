//! Combat resolution - attack rolls, crit effects and miss consequences

mod attack;
mod critical;
mod outcome;

pub use attack::{retest_dodge, roll_attack, AttackContext};
pub use critical::{
    critical_effect, roll_miss_consequence, roll_save, CriticalEffect, MissConsequence, MissResult,
};
pub use outcome::{AttackOutcome, AttackRoll};
