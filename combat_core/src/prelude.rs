//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{
    Attribute, AttributeScores, CombatantId, DamageTag, DamageType, DieSize, DieSpec, Position,
    SpellSchool, TeamId,
};

// Combatants and equipment
pub use crate::combatant::{Combatant, CombatantSnapshot, Weapon};
pub use crate::damage::{Affinities, Conversion, DamageTier};
pub use crate::defense::{Armor, ArmorWeight, Shield};

// Conditions
pub use crate::condition::{Condition, ConditionKind, ConditionTracker};

// Session
pub use crate::reaction::{ReactionKind, ReactionOutcome, TriggerKind};
pub use crate::session::{
    Action, ActionOutcome, CombatEvent, CombatSession, CombatStateSnapshot, SpellSpec,
};

// Dice and config
pub use crate::config::{EngineConstants, MissTable};
pub use crate::dice::{DiceRoller, ScriptedDice, SeededDice};
pub use crate::error::{EngineError, Result};
