//! combat_core - Deterministic combat resolution for a tabletop-style game
//!
//! This library provides:
//! - ActionEconomy: per-turn action points
//! - Attack resolution: one die roll decides hit, miss, crit and damage
//! - ArmorMitigation and shields: reduction dice with durability
//! - DamageModifierPipeline: tiers, immunities and conversions
//! - ConditionTracker: timed conditions and their tick damage
//! - ReactionEngine: reaction windows with Parry/Riposte and shield chains
//! - CombatSession: initiative, turns and the atomic mutation boundary

pub mod combat;
pub mod combatant;
pub mod condition;
pub mod config;
pub mod damage;
pub mod defense;
pub mod dice;
pub mod economy;
pub mod error;
pub mod prelude;
pub mod reaction;
pub mod session;
pub mod types;

// Re-export core types for convenience
pub use combatant::{Combatant, CombatantSnapshot, Weapon};
pub use config::{EngineConstants, MissTable};
pub use dice::{DiceRoller, ScriptedDice, SeededDice};
pub use error::{EngineError, InvariantViolation, Result};
pub use reaction::{ReactionKind, ReactionOutcome, TriggerKind};
pub use session::{
    Action, ActionOutcome, AttackReport, CombatEvent, CombatSession, CombatStateSnapshot,
    SpellSpec,
};
pub use types::{CombatantId, DamageTag, DamageType, DieSize, DieSpec, Position, TeamId};
