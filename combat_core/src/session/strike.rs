//! Shared attack resolution for actions and reaction strikes

use super::state::{EncounterState, ResolveCtx};
use super::{ActionOutcome, AttackReport, CombatEvent};
use crate::combatant::Combatant;
use crate::combat::{
    critical_effect, roll_attack, roll_miss_consequence, AttackContext, AttackOutcome, AttackRoll,
};
use crate::condition::{Condition, ConditionKind};
use crate::damage::{resolve_damage, Conversion, IncomingDamage};
use crate::error::Result;
use crate::reaction::{PendingAttack, ReactionWindow, SuspendedAction, TriggerKind};
use crate::types::{Attribute, CombatantId, DieSpec};

/// Spell-specific riders on an attack
#[derive(Debug, Clone, Default)]
pub(crate) struct AttackRiders {
    pub conversion: Option<Conversion>,
    pub on_hit: Option<Condition>,
    pub is_spell: bool,
}

impl EncounterState {
    /// Roll an attack whose AP is already paid
    ///
    /// A landed attack against someone who can answer it suspends in a
    /// reaction window; everything else resolves on the spot.
    pub fn launch_attack(
        &mut self,
        attacker: &CombatantId,
        target: &CombatantId,
        spec: DieSpec,
        riders: AttackRiders,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        let roll = self.roll_against(attacker, target, spec, ctx)?;
        let ap_remaining = self.combatant(attacker)?.ap.current;

        if !roll.outcome.lands() {
            let report = self.resolve_miss(attacker, target, roll, ctx)?;
            return Ok(ActionOutcome::Attack {
                report,
                ap_remaining,
            });
        }

        let pending = PendingAttack {
            attacker: attacker.clone(),
            target: target.clone(),
            original_target: target.clone(),
            spec,
            roll,
            conversion: riders.conversion,
            on_hit: riders.on_hit,
            is_spell: riders.is_spell,
            shield_absorbed: 0,
            negated_by: None,
        };

        let reactors = self.attack_reactors(&pending, ctx);
        if reactors.is_empty() {
            let report = self.finalize_attack(pending, false, ctx)?;
            return Ok(ActionOutcome::Attack {
                report,
                ap_remaining,
            });
        }

        let window = self.open_window(SuspendedAction::Attack(pending), reactors, ctx);
        Ok(ActionOutcome::AwaitingReactions {
            window: window.id,
            reactors: window.open_reactors(),
            roll: Some(roll),
            ap_remaining,
        })
    }

    /// A reaction strike: rolls and resolves at once, never opening a window
    pub fn strike(
        &mut self,
        attacker: &CombatantId,
        target: &CombatantId,
        spec: DieSpec,
        ignore_armor: bool,
        ctx: &mut ResolveCtx,
    ) -> Result<AttackReport> {
        let roll = self.roll_against(attacker, target, spec, ctx)?;
        if !roll.outcome.lands() {
            return self.resolve_miss(attacker, target, roll, ctx);
        }
        let pending = PendingAttack {
            attacker: attacker.clone(),
            target: target.clone(),
            original_target: target.clone(),
            spec,
            roll,
            conversion: self.combatant(attacker)?.conversion,
            on_hit: None,
            is_spell: false,
            shield_absorbed: 0,
            negated_by: None,
        };
        self.finalize_attack(pending, ignore_armor, ctx)
    }

    fn roll_against(
        &mut self,
        attacker: &CombatantId,
        target: &CombatantId,
        spec: DieSpec,
        ctx: &mut ResolveCtx,
    ) -> Result<AttackRoll> {
        let attack_ctx = AttackContext::between(
            self.combatant(attacker)?,
            self.combatant(target)?,
            &spec,
            &ctx.constants.dice,
        );
        let roll = roll_attack(ctx.dice, spec, attack_ctx);
        tracing::debug!(
            attacker = %attacker,
            target = %target,
            natural = roll.natural,
            outcome = ?roll.outcome,
            damage = roll.damage,
            "attack rolled"
        );
        ctx.emit(CombatEvent::AttackRolled {
            attacker: attacker.clone(),
            target: target.clone(),
            roll,
        });
        self.consume_condition(target, ConditionKind::Flatfooted, ctx)?;
        Ok(roll)
    }

    fn resolve_miss(
        &mut self,
        attacker: &CombatantId,
        target: &CombatantId,
        roll: AttackRoll,
        ctx: &mut ResolveCtx,
    ) -> Result<AttackReport> {
        let mut report = AttackReport::new(attacker.clone(), target.clone(), roll);
        if roll.outcome != AttackOutcome::CriticalMiss {
            return Ok(report);
        }

        let miss = roll_miss_consequence(attacker, ctx.miss_table, ctx.dice, &ctx.constants.critical);
        tracing::debug!(attacker = %attacker, consequence = ?miss.consequence, "critical miss");
        ctx.emit(CombatEvent::CriticalMissConsequence {
            combatant: attacker.clone(),
            table_roll: miss.table_roll,
            consequence: miss.consequence,
        });
        if miss.self_damage > 0 {
            self.direct_damage(attacker, miss.self_damage, ctx)?;
        }
        for condition in miss.conditions {
            self.apply_condition(attacker, condition, ctx)?;
        }
        report.miss_consequence = Some(miss.consequence);
        Ok(report)
    }

    /// Deal a suspended attack's damage and secondary effects
    pub fn finalize_attack(
        &mut self,
        attack: PendingAttack,
        ignore_armor: bool,
        ctx: &mut ResolveCtx,
    ) -> Result<AttackReport> {
        let mut report = AttackReport::new(attack.attacker.clone(), attack.target.clone(), attack.roll);

        if let Some(by) = attack.negated_by {
            tracing::debug!(attacker = %attack.attacker, ?by, "attack negated");
            ctx.emit(CombatEvent::AttackNegated {
                attacker: attack.attacker,
                target: attack.target,
                by,
            });
            report.negated_by = Some(by);
            return Ok(report);
        }
        if self.combatant(&attack.target)?.is_defeated() {
            return Ok(report);
        }

        let mut incoming = IncomingDamage::new(
            attack.attacker.clone(),
            attack.spec.tag.damage_type(),
            attack.roll.damage,
        )
        .after_shield(attack.shield_absorbed)
        .with_conversion(attack.conversion);
        if ignore_armor {
            incoming = incoming.ignoring_armor();
        }

        let target = self.combatant_mut(&attack.target)?;
        let event = resolve_damage(incoming, target, ctx.dice, &ctx.constants.armor);
        let lost = target.take_damage(event.dealt());
        let healing = event.healing_to_source;
        ctx.emit(CombatEvent::DamageDealt {
            damage: event.clone(),
        });
        report.damage = Some(event);

        self.heal(&attack.attacker, healing, ctx)?;
        report.target_defeated = self.note_defeat(&attack.target, lost, ctx)?;
        if report.target_defeated {
            return Ok(report);
        }

        if attack.roll.is_crit() {
            let target = self.combatant_mut(&attack.target)?;
            let effect = critical_effect(
                attack.spec.tag,
                &attack.attacker,
                target,
                ctx.dice,
                &ctx.constants.critical,
            );
            if let Some(save) = effect.save {
                ctx.emit(CombatEvent::SavingThrow {
                    combatant: attack.target.clone(),
                    attribute: Attribute::Constitution,
                    result: save,
                });
            }
            if let Some(condition) = effect.condition {
                report.conditions.push(condition.kind);
                self.apply_condition(&attack.target, condition, ctx)?;
            }
        }

        if let Some(condition) = attack.on_hit {
            report.conditions.push(condition.kind);
            self.apply_condition(&attack.target, condition, ctx)?;
        }

        Ok(report)
    }

    /// Who may answer a landed attack
    ///
    /// The target on `OnAttacked`, then allies of the target within
    /// interpose range on `OnAllyAttacked`.
    fn attack_reactors(
        &self,
        attack: &PendingAttack,
        ctx: &ResolveCtx,
    ) -> Vec<(CombatantId, TriggerKind)> {
        let costs = &ctx.constants.action_costs;
        let mut reactors = Vec::new();
        let Some(target) = self.combatants.get(&attack.target) else {
            return reactors;
        };

        let mut cheapest = costs.dodge;
        if !attack.is_spell && target.weapon.is_some() && !target.conditions.is_disarmed() {
            cheapest = cheapest.min(costs.parry);
        }
        if target.shield.as_ref().is_some_and(|s| !s.is_broken()) {
            cheapest = cheapest.min(costs.raise_shield);
        }
        if can_react(target) && target.ap.current >= cheapest {
            reactors.push((target.id.clone(), TriggerKind::OnAttacked));
        }

        let range = ctx.constants.reactions.interpose_range;
        for ally in self.combatants.values() {
            if ally.id == target.id
                || ally.id == attack.attacker
                || !ally.is_ally_of(target)
                || ally.distance_to(target) > range
            {
                continue;
            }
            if can_react(ally) && ally.ap.current >= costs.interpose {
                reactors.push((ally.id.clone(), TriggerKind::OnAllyAttacked));
            }
        }
        reactors
    }

    pub fn open_window(
        &mut self,
        action: SuspendedAction,
        reactors: Vec<(CombatantId, TriggerKind)>,
        ctx: &mut ResolveCtx,
    ) -> &ReactionWindow {
        let id = self.next_window;
        self.next_window += 1;
        let window = ReactionWindow::new(id, action, reactors.clone());
        tracing::debug!(window = id, source = %window.source(), reactors = reactors.len(), "reaction window opened");
        ctx.emit(CombatEvent::ReactionWindowOpened {
            window: id,
            source: window.source().clone(),
            reactors,
        });
        self.window.insert(window)
    }
}

/// Standing and not held by a blocking condition
pub(crate) fn can_react(combatant: &Combatant) -> bool {
    !combatant.is_defeated() && combatant.conditions.blocking_condition().is_none()
}
