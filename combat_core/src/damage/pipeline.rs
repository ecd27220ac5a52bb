//! Fixed-order damage pipeline: armor, then tier, then conversion

use super::{Conversion, DamageEvent};
use crate::combatant::Combatant;
use crate::config::ArmorConstants;
use crate::defense::{mitigate, MitigationResult};
use crate::dice::DiceRoller;
use crate::types::{CombatantId, DamageType};

/// Damage arriving at a target, already past any raised shield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingDamage {
    pub source: CombatantId,
    pub damage_type: DamageType,
    pub raw: u32,
    pub shield_absorbed: u32,
    /// Skip the armor stage entirely (riposte)
    pub ignore_armor: bool,
    pub conversion: Option<Conversion>,
}

impl IncomingDamage {
    pub fn new(source: CombatantId, damage_type: DamageType, raw: u32) -> Self {
        IncomingDamage {
            source,
            damage_type,
            raw,
            shield_absorbed: 0,
            ignore_armor: false,
            conversion: None,
        }
    }

    pub fn ignoring_armor(mut self) -> Self {
        self.ignore_armor = true;
        self
    }

    pub fn with_conversion(mut self, conversion: Option<Conversion>) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn after_shield(mut self, absorbed: u32) -> Self {
        self.shield_absorbed = absorbed.min(self.raw);
        self
    }
}

/// Run damage through the target's defenses
///
/// Wears the target's armor but does not touch HP; the caller applies
/// [`DamageEvent::dealt`] and the source healing.
pub fn resolve_damage(
    incoming: IncomingDamage,
    target: &mut Combatant,
    dice: &mut dyn DiceRoller,
    constants: &ArmorConstants,
) -> DamageEvent {
    let after_shield = incoming.raw.saturating_sub(incoming.shield_absorbed);

    let armor: Option<MitigationResult> = if incoming.ignore_armor {
        None
    } else {
        Some(mitigate(after_shield, target, dice, constants))
    };
    let post_armor = armor.map(|m| m.after).unwrap_or(after_shield);

    let tier = target.affinities.tier_for(incoming.damage_type);
    let post_modifier = tier.map(|t| t.apply(post_armor)).unwrap_or(post_armor);

    let healing_to_source = incoming
        .conversion
        .map(|c| c.healing(post_modifier))
        .unwrap_or(0);

    DamageEvent {
        source: incoming.source,
        target: target.id.clone(),
        damage_type: incoming.damage_type,
        raw: incoming.raw,
        shield_absorbed: incoming.shield_absorbed,
        post_armor,
        post_modifier,
        post_conversion: post_modifier,
        healing_to_source,
        tier,
        armor: armor.filter(|m| m.durability.is_some()),
    }
}
