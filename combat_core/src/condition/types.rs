//! Condition type definitions

use crate::types::{CombatantId, DieSize};
use serde::{Deserialize, Serialize};

/// Every status effect the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Stunned,
    Incapacitated,
    Prone,
    Restrained,
    Grappled,
    Bleeding,
    Pinned,
    ArmorPierced,
    Blinded,
    Frightened,
    Poisoned,
    Dodging,
    Flatfooted,
    Disarmed,
    Distracted,
    OffBalance,
    Unguarded,
    Demoralized,
}

impl ConditionKind {
    /// Phase a freshly applied condition of this kind counts down on
    ///
    /// Stances and one-shot markers last until the start of the bearer's
    /// next turn. Everything else, including the miss penalties that bite
    /// on the bearer's next turn (OffBalance, Demoralized), runs through
    /// the end of the bearer's turn.
    pub fn default_phase(&self) -> TickPhase {
        match self {
            ConditionKind::Bleeding
            | ConditionKind::Prone
            | ConditionKind::Dodging
            | ConditionKind::Flatfooted
            | ConditionKind::Disarmed
            | ConditionKind::Distracted
            | ConditionKind::Unguarded => TickPhase::StartOfTurn,
            _ => TickPhase::EndOfTurn,
        }
    }

    /// Stops the bearer from taking actions or reactions
    pub fn blocks_actions(&self) -> bool {
        matches!(self, ConditionKind::Stunned | ConditionKind::Incapacitated)
    }

    /// Forces disadvantage on the bearer's own attack rolls
    pub fn hinders_attacks(&self) -> bool {
        matches!(
            self,
            ConditionKind::Restrained
                | ConditionKind::Prone
                | ConditionKind::Blinded
                | ConditionKind::Poisoned
                | ConditionKind::Frightened
        )
    }
}

/// When in the bearer's turn a condition counts down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickPhase {
    StartOfTurn,
    EndOfTurn,
}

/// An active condition instance on a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    /// Rounds left; a condition is removed the moment this reaches zero
    pub remaining: u32,
    pub phase: TickPhase,
    /// Combatant that inflicted it, if any
    #[serde(default)]
    pub source: Option<CombatantId>,
    /// Die rolled for damage on every tick (Bleeding)
    #[serde(default)]
    pub tick_damage: Option<DieSize>,
    /// Kind-specific strength, e.g. how far Dodging widens the miss range
    #[serde(default)]
    pub magnitude: Option<u32>,
    /// Stackable instances never refresh an existing one
    #[serde(default)]
    pub stackable: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind, remaining: u32) -> Self {
        Condition {
            kind,
            remaining,
            phase: kind.default_phase(),
            source: None,
            tick_damage: None,
            magnitude: None,
            stackable: false,
        }
    }

    pub fn from_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_phase(mut self, phase: TickPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_tick_damage(mut self, die: DieSize) -> Self {
        self.tick_damage = Some(die);
        self
    }

    pub fn with_magnitude(mut self, magnitude: u32) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Reapplication of the same kind: keep the longer duration
    ///
    /// A longer incoming instance also takes over the source, and the
    /// stronger tick die and magnitude are kept.
    pub fn refresh(&mut self, incoming: &Condition) {
        if incoming.remaining > self.remaining {
            self.remaining = incoming.remaining;
            self.source = incoming.source.clone();
        }
        self.tick_damage = self.tick_damage.max(incoming.tick_damage);
        self.magnitude = self.magnitude.max(incoming.magnitude);
    }
}
