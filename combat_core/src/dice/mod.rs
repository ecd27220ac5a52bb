//! Dice - the single source of randomness for the engine
//!
//! Every roll goes through [`DiceRoller`], so an encounter driven by a seeded
//! roller is fully reproducible and tests can script exact results.

mod check;

pub use check::{
    opposed_check, roll_exploding, roll_with_mode, saving_throw, ExplodingRoll, OpposedResult,
    RollMode, SaveResult,
};
pub(crate) use check::continue_explosion;

use crate::types::DieSize;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of die rolls
pub trait DiceRoller {
    /// Roll a single die, returning a value in `1..=die.sides()`
    fn roll(&mut self, die: DieSize) -> u32;
}

/// Dice backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        RngDice { rng }
    }
}

impl<R: Rng> DiceRoller for RngDice<R> {
    fn roll(&mut self, die: DieSize) -> u32 {
        self.rng.gen_range(1..=die.sides())
    }
}

/// Reproducible dice for encounters that must replay identically
pub type SeededDice = RngDice<ChaCha8Rng>;

impl SeededDice {
    pub fn seeded(seed: u64) -> Self {
        RngDice::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        RngDice::new(ChaCha8Rng::from_entropy())
    }
}

/// Dice that return a predetermined sequence, then fall back to a seeded roller
///
/// Scripted values are clamped into the rolled die's range.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    queue: VecDeque<u32>,
    fallback: SeededDice,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        ScriptedDice {
            queue: rolls.into_iter().collect(),
            fallback: SeededDice::seeded(0),
        }
    }

    /// Append more scripted results
    pub fn push(&mut self, roll: u32) {
        self.queue.push_back(roll);
    }

    /// Number of scripted results not yet consumed
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, die: DieSize) -> u32 {
        match self.queue.pop_front() {
            Some(value) => value.clamp(1, die.sides()),
            None => self.fallback.roll(die),
        }
    }
}
