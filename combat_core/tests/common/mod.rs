#![allow(dead_code)]

use combat_core::config::default_miss_table;
use combat_core::prelude::*;

pub fn sword() -> Weapon {
    Weapon::new("sword", DieSpec::new(DieSize::D8, DamageTag::Slashing))
}

pub fn club() -> Weapon {
    Weapon::new("club", DieSpec::new(DieSize::D6, DamageTag::Bludgeoning))
}

/// Strength 14 (+2) swordsman on team 1 at the origin
pub fn fighter() -> Combatant {
    Combatant::new("fighter", 1)
        .with_attributes(AttributeScores::default().with(Attribute::Strength, 14))
        .with_weapon(sword())
        .at(Position::new(0, 0))
}

/// Unarmed 30 HP brute on team 2, adjacent to the fighter
pub fn orc() -> Combatant {
    Combatant::new("orc", 2).with_hp(30).at(Position::new(1, 0))
}

pub fn session(
    combatants: impl IntoIterator<Item = Combatant>,
    rolls: impl IntoIterator<Item = u32>,
) -> CombatSession {
    session_with(combatants, rolls, EngineConstants::default())
}

pub fn session_with(
    combatants: impl IntoIterator<Item = Combatant>,
    rolls: impl IntoIterator<Item = u32>,
    constants: EngineConstants,
) -> CombatSession {
    CombatSession::from_combatants(
        combatants,
        ScriptedDice::new(rolls),
        constants,
        default_miss_table(),
    )
    .unwrap()
}

pub fn id(name: &str) -> CombatantId {
    CombatantId::from(name)
}

pub fn attack(target: &str) -> Action {
    Action::Attack { target: id(target) }
}
