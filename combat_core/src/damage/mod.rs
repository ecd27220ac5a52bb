//! Damage system - modifier tiers, conversion and the damage pipeline

mod event;
mod modifier;
pub mod pipeline;

pub use event::DamageEvent;
pub use modifier::{Affinities, Conversion, DamageTier};
pub use pipeline::{resolve_damage, IncomingDamage};
