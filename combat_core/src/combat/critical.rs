//! Critical hit effects and critical miss consequences

use crate::combatant::Combatant;
use crate::condition::{Condition, ConditionKind};
use crate::config::{CriticalConstants, MissTable};
use crate::dice::{saving_throw, DiceRoller, RollMode, SaveResult};
use crate::types::{Attribute, CombatantId, DamageTag, DieSize};
use serde::{Deserialize, Serialize};

/// Secondary effect of a critical hit, decided by the die's tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CriticalEffect {
    /// Condition to place on the target
    pub condition: Option<Condition>,
    /// Save the target rolled against the effect, if one was allowed
    pub save: Option<SaveResult>,
}

/// Roll the secondary effect of a crit against `target`
///
/// Slashing bleeds, piercing pierces armor, ranged pins, and bludgeoning
/// stuns for a round unless the target makes a Constitution save. Spell
/// dice carry their own on-hit condition instead.
pub fn critical_effect(
    tag: DamageTag,
    attacker: &CombatantId,
    target: &mut Combatant,
    dice: &mut dyn DiceRoller,
    constants: &CriticalConstants,
) -> CriticalEffect {
    match tag {
        DamageTag::Slashing => CriticalEffect {
            condition: Some(
                timed(ConditionKind::Bleeding, attacker, dice, constants)
                    .with_tick_damage(constants.bleed_damage_die),
            ),
            save: None,
        },
        DamageTag::Piercing => CriticalEffect {
            condition: Some(timed(ConditionKind::ArmorPierced, attacker, dice, constants)),
            save: None,
        },
        DamageTag::Ranged => CriticalEffect {
            condition: Some(timed(ConditionKind::Pinned, attacker, dice, constants)),
            save: None,
        },
        DamageTag::Bludgeoning => {
            let save = roll_save(target, Attribute::Constitution, constants.stun_save_die, dice);
            CriticalEffect {
                condition: (!save.success).then(|| {
                    Condition::new(ConditionKind::Stunned, 1).from_source(attacker.clone())
                }),
                save: Some(save),
            }
        }
        DamageTag::Spell(_) => CriticalEffect::default(),
    }
}

fn timed(
    kind: ConditionKind,
    attacker: &CombatantId,
    dice: &mut dyn DiceRoller,
    constants: &CriticalConstants,
) -> Condition {
    Condition::new(kind, dice.roll(constants.effect_duration_die)).from_source(attacker.clone())
}

/// Saving throw for a combatant, consuming Demoralized for disadvantage
pub fn roll_save(
    combatant: &mut Combatant,
    attribute: Attribute,
    die: DieSize,
    dice: &mut dyn DiceRoller,
) -> SaveResult {
    let mode = if combatant.conditions.consume(ConditionKind::Demoralized) {
        RollMode::Disadvantage
    } else {
        RollMode::Normal
    };
    saving_throw(dice, die, combatant.modifier(attribute), mode)
}

/// Entries of the critical miss table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissConsequence {
    WeaponMalfunction,
    SelfInflictedWound,
    Overextension,
    TacticalBlunder,
    Fumble,
    Distraction,
    OffBalance,
    Exposed,
    Demoralized,
    SimpleMiss,
}

/// What a critical miss does to the attacker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissResult {
    pub table_roll: u32,
    pub consequence: MissConsequence,
    pub conditions: Vec<Condition>,
    /// Damage the attacker deals to itself
    pub self_damage: u32,
}

/// Roll on the miss table and work out the attacker's penalty
pub fn roll_miss_consequence(
    attacker: &CombatantId,
    table: &MissTable,
    dice: &mut dyn DiceRoller,
    constants: &CriticalConstants,
) -> MissResult {
    let table_roll = dice.roll(constants.miss_table_die);
    let consequence = table.lookup(table_roll);
    let mut self_damage = 0;

    let one_round = |kind| vec![Condition::new(kind, 1).from_source(attacker.clone())];

    let conditions = match consequence {
        MissConsequence::WeaponMalfunction | MissConsequence::Fumble => {
            one_round(ConditionKind::Disarmed)
        }
        MissConsequence::SelfInflictedWound => {
            self_damage = dice.roll(constants.bleed_damage_die);
            let duration = dice.roll(constants.effect_duration_die);
            vec![Condition::new(ConditionKind::Bleeding, duration)
                .with_tick_damage(constants.bleed_damage_die)
                .from_source(attacker.clone())]
        }
        MissConsequence::Overextension => one_round(ConditionKind::Prone),
        MissConsequence::TacticalBlunder => one_round(ConditionKind::Flatfooted),
        MissConsequence::Distraction => one_round(ConditionKind::Distracted),
        MissConsequence::OffBalance => one_round(ConditionKind::OffBalance),
        MissConsequence::Exposed => one_round(ConditionKind::Unguarded),
        MissConsequence::Demoralized => one_round(ConditionKind::Demoralized),
        MissConsequence::SimpleMiss => Vec::new(),
    };

    MissResult {
        table_roll,
        consequence,
        conditions,
        self_damage,
    }
}
