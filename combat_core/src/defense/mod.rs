//! Defense system - Armor and Shields

mod armor;
mod shield;

pub use armor::{mitigate, reduction_die, Armor, ArmorWeight, MitigationResult};
pub use shield::{Shield, ShieldBlock};
