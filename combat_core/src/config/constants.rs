//! Tunable engine constants

use super::ConfigError;
use crate::types::DieSize;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable rule constants for an encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConstants {
    #[serde(default)]
    pub dice: DiceConstants,
    #[serde(default)]
    pub action_costs: ActionCosts,
    #[serde(default)]
    pub armor: ArmorConstants,
    #[serde(default)]
    pub critical: CriticalConstants,
    #[serde(default)]
    pub reactions: ReactionConstants,
    #[serde(default)]
    pub turn: TurnConstants,
}

impl EngineConstants {
    /// Load constants from a TOML file, validating them
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let constants: EngineConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse constants from a TOML string, validating them
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let constants: EngineConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Constants bundled with the crate
    pub fn bundled() -> Self {
        let toml = include_str!("../../config/engine.toml");
        Self::parse(toml).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.armor.light_durability == 0
            || self.armor.medium_durability == 0
            || self.armor.heavy_durability == 0
        {
            return Err(ConfigError::ValidationError(
                "armor durability must be at least 1".to_string(),
            ));
        }
        if self.reactions.window_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reaction window timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceConstants {
    /// Maximum number of rerolls an exploding die may chain
    #[serde(default = "default_max_explosion_depth")]
    pub max_explosion_depth: u32,
    /// Whether critical hit damage dice explode
    #[serde(default)]
    pub explode_crit_damage: bool,
}

impl Default for DiceConstants {
    fn default() -> Self {
        DiceConstants {
            max_explosion_depth: 3,
            explode_crit_damage: false,
        }
    }
}

fn default_max_explosion_depth() -> u32 {
    3
}

/// AP price of every action and reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCosts {
    #[serde(default = "two")]
    pub attack: u32,
    /// Used when a spell does not carry its own cost
    #[serde(default = "two")]
    pub cast: u32,
    #[serde(default = "one", rename = "move")]
    pub move_: u32,
    #[serde(default = "one")]
    pub disengage: u32,
    #[serde(default = "one")]
    pub parry: u32,
    #[serde(default = "one")]
    pub riposte: u32,
    #[serde(default = "one")]
    pub raise_shield: u32,
    #[serde(default = "one")]
    pub shield_bash: u32,
    #[serde(default = "two")]
    pub dodge: u32,
    #[serde(default = "one")]
    pub opportunity_attack: u32,
    #[serde(default = "one")]
    pub interpose: u32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        ActionCosts {
            attack: 2,
            cast: 2,
            move_: 1,
            disengage: 1,
            parry: 1,
            riposte: 1,
            raise_shield: 1,
            shield_bash: 1,
            dodge: 2,
            opportunity_attack: 1,
            interpose: 1,
        }
    }
}

fn one() -> u32 {
    1
}

fn two() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorConstants {
    /// Hits a light armor piece absorbs before failing
    #[serde(default = "default_light")]
    pub light_durability: u32,
    #[serde(default = "default_medium")]
    pub medium_durability: u32,
    #[serde(default = "default_heavy")]
    pub heavy_durability: u32,
    /// Durability removed while the wearer is ArmorPierced
    #[serde(default = "two")]
    pub pierce_penalty: u32,
}

impl Default for ArmorConstants {
    fn default() -> Self {
        ArmorConstants {
            light_durability: 15,
            medium_durability: 28,
            heavy_durability: 37,
            pierce_penalty: 2,
        }
    }
}

fn default_light() -> u32 {
    15
}
fn default_medium() -> u32 {
    28
}
fn default_heavy() -> u32 {
    37
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalConstants {
    /// Damage die rolled each round by Bleeding
    #[serde(default = "d4")]
    pub bleed_damage_die: DieSize,
    /// Die rolled for how long bleed, pierce and pin last
    #[serde(default = "d4")]
    pub effect_duration_die: DieSize,
    /// Constitution save die that negates a bludgeoning stun
    #[serde(default = "d8")]
    pub stun_save_die: DieSize,
    /// Die rolled on the miss consequence table
    #[serde(default = "d10")]
    pub miss_table_die: DieSize,
}

impl Default for CriticalConstants {
    fn default() -> Self {
        CriticalConstants {
            bleed_damage_die: DieSize::D4,
            effect_duration_die: DieSize::D4,
            stun_save_die: DieSize::D8,
            miss_table_die: DieSize::D10,
        }
    }
}

fn d4() -> DieSize {
    DieSize::D4
}
fn d6() -> DieSize {
    DieSize::D6
}
fn d8() -> DieSize {
    DieSize::D8
}
fn d10() -> DieSize {
    DieSize::D10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionConstants {
    /// How long the host waits for declarations before closing a window
    #[serde(default = "default_window_timeout")]
    pub window_timeout_ms: u64,
    /// Squares within which an ally can interpose
    #[serde(default = "two")]
    pub interpose_range: u32,
    /// Strength save die the protected ally rolls to stay standing
    #[serde(default = "d6")]
    pub interpose_save_die: DieSize,
}

impl Default for ReactionConstants {
    fn default() -> Self {
        ReactionConstants {
            window_timeout_ms: 5000,
            interpose_range: 2,
            interpose_save_die: DieSize::D6,
        }
    }
}

fn default_window_timeout() -> u64 {
    5000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnConstants {
    /// End the actor's turn automatically once their AP runs out
    #[serde(default = "default_true")]
    pub auto_end_turn: bool,
    /// Squares a combatant may cover with a single move action
    #[serde(default = "default_movement")]
    pub movement_squares: u32,
}

impl Default for TurnConstants {
    fn default() -> Self {
        TurnConstants {
            auto_end_turn: true,
            movement_squares: 6,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_movement() -> u32 {
    6
}
