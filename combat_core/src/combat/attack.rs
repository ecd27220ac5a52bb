//! Attack resolution - one die decides hit, miss, crit and damage

use super::{AttackOutcome, AttackRoll};
use crate::combatant::Combatant;
use crate::config::DiceConstants;
use crate::dice::{continue_explosion, roll_with_mode, DiceRoller, RollMode};
use crate::types::DieSpec;

/// Everything besides the die that shapes an attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackContext {
    pub mode: RollMode,
    pub modifier: i32,
    /// How far the target's dodge widens the miss range
    pub dodge_rating: u32,
    /// Let a crit's damage die explode
    pub explode_crit: bool,
    pub max_explosion_depth: u32,
}

impl AttackContext {
    /// Derive the context from the two combatants' current state
    ///
    /// The attacker's hindering conditions impose disadvantage; a stunned,
    /// restrained, flatfooted or (in melee) prone target grants advantage.
    pub fn between(
        attacker: &Combatant,
        target: &Combatant,
        spec: &DieSpec,
        dice: &DiceConstants,
    ) -> Self {
        AttackContext {
            mode: RollMode::combine(
                target.conditions.grants_advantage(spec.tag.is_melee()),
                attacker.conditions.hinders_attacks(),
            ),
            modifier: attacker.modifier(spec.tag.governing_attribute()),
            dodge_rating: target.conditions.dodge_rating(),
            explode_crit: dice.explode_crit_damage,
            max_explosion_depth: dice.max_explosion_depth,
        }
    }
}

/// Roll an attack
///
/// A natural 1 calls for a single confirmation roll: a second 1 is a
/// critical miss, anything else a plain miss. The maximum face is a crit
/// dealing `max + modifier`. Other rolls hit for `roll + modifier`, unless
/// the target is dodging and the roll falls inside the widened miss range.
pub fn roll_attack(dice: &mut dyn DiceRoller, spec: DieSpec, ctx: AttackContext) -> AttackRoll {
    let natural = roll_with_mode(dice, spec.die, ctx.mode);
    let mut roll = AttackRoll {
        die: spec.die,
        mode: ctx.mode,
        natural,
        confirm: None,
        exploded_total: None,
        modifier: ctx.modifier,
        outcome: AttackOutcome::Miss,
        damage: 0,
        dodged: false,
    };

    if natural == 1 {
        let confirm = dice.roll(spec.die);
        roll.confirm = Some(confirm);
        roll.outcome = if confirm == 1 {
            AttackOutcome::CriticalMiss
        } else {
            AttackOutcome::Miss
        };
        return roll;
    }

    if natural == spec.max() {
        let total = if ctx.explode_crit {
            let explosion = continue_explosion(dice, spec.die, natural, ctx.max_explosion_depth);
            if explosion.exploded() {
                roll.exploded_total = Some(explosion.total);
            }
            explosion.total
        } else {
            natural
        };
        roll.outcome = AttackOutcome::Crit;
        roll.damage = apply_modifier(total, ctx.modifier);
        return roll;
    }

    roll.outcome = AttackOutcome::Hit;
    roll.damage = apply_modifier(natural, ctx.modifier);
    retest_dodge(&mut roll, ctx.dodge_rating);
    roll
}

/// Turn a landed hit into a miss if it falls inside the dodge range
///
/// Crits cannot be dodged. Returns whether the roll was dodged.
pub fn retest_dodge(roll: &mut AttackRoll, dodge_rating: u32) -> bool {
    if dodge_rating == 0 || roll.outcome != AttackOutcome::Hit {
        return false;
    }
    if roll.natural <= 1 + dodge_rating {
        roll.outcome = AttackOutcome::Miss;
        roll.damage = 0;
        roll.dodged = true;
    }
    roll.dodged
}

fn apply_modifier(roll: u32, modifier: i32) -> u32 {
    (roll as i64 + modifier as i64).max(0) as u32
}
