//! Declaring, passing and closing reaction windows

use super::{
    ReactionDeclaration, ReactionEffect, ReactionKind, ReactionOutcome, ReactorState,
    SuspendedAction, WindowId,
};
use crate::combat::{retest_dodge, roll_save};
use crate::condition::{Condition, ConditionKind};
use crate::dice::{continue_explosion, opposed_check, roll_exploding};
use crate::error::{EngineError, Result};
use crate::session::state::{EncounterState, ResolveCtx};
use crate::session::{ActionOutcome, CombatEvent};
use crate::types::{Attribute, CombatantId, DieSpec};

impl EncounterState {
    /// Declare and resolve one reaction in the open window
    ///
    /// Nothing changes unless every check passes. A declaration that leaves
    /// no reactor open closes the window and resumes the suspended action.
    pub fn declare_reaction(
        &mut self,
        reactor: &CombatantId,
        reaction: ReactionKind,
        ctx: &mut ResolveCtx,
    ) -> Result<ReactionOutcome> {
        self.ensure_active()?;
        self.combatant(reactor)?;
        self.validate_declaration(reactor, reaction, ctx)?;

        let trigger = reaction.trigger();
        let declaration = ReactionDeclaration {
            trigger,
            reaction,
            chain_eligible: reaction.is_chain(),
        };
        let window_id = self.window_id(reactor)?;

        self.spend_ap(reactor, reaction.cost(&ctx.constants.action_costs), ctx)?;
        self.combatant_mut(reactor)?.reactions_used.insert(trigger);
        self.set_reactor_state(reactor, ReactorState::Declared { reaction });
        tracing::debug!(window = window_id, reactor = %reactor, ?reaction, "reaction declared");
        ctx.emit(CombatEvent::ReactionDeclared {
            window: window_id,
            combatant: reactor.clone(),
            declaration,
        });

        let (effect, success) = self.resolve_reaction(reactor, reaction, ctx)?;
        let chain_open = if success { reaction.opens_chain() } else { None };
        let next_state = match chain_open {
            Some(trigger) => ReactorState::ChainOpen { trigger },
            None => ReactorState::Resolved,
        };
        self.set_reactor_state(reactor, next_state);

        tracing::debug!(window = window_id, reactor = %reactor, ?reaction, success, "reaction resolved");
        ctx.emit(CombatEvent::ReactionResolved {
            window: window_id,
            combatant: reactor.clone(),
            reaction,
            effect: effect.clone(),
            success,
        });

        let mut resumed = None;
        if !self.check_encounter_end(ctx) && self.window.as_ref().is_some_and(|w| w.is_settled()) {
            resumed = Some(self.resume_window(Vec::new(), ctx)?);
        }

        Ok(ReactionOutcome {
            window: window_id,
            reactor: reactor.clone(),
            declaration,
            effect,
            success,
            ap_remaining: self.combatant(reactor)?.ap.current,
            chain_open,
            resumed,
        })
    }

    /// Decline to react, or decline an open follow-up
    pub fn pass_reaction(
        &mut self,
        reactor: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<Option<ActionOutcome>> {
        self.ensure_active()?;
        self.combatant(reactor)?;
        let closed = || EngineError::ReactionWindowClosed {
            combatant: reactor.clone(),
        };

        let window = self.window.as_mut().ok_or_else(closed)?;
        let window_id = window.id;
        let entry = window.entry_mut(reactor).ok_or_else(closed)?;
        entry.state = match entry.state {
            ReactorState::Pending => ReactorState::Passed,
            ReactorState::ChainOpen { .. } => ReactorState::Resolved,
            _ => return Err(closed()),
        };

        tracing::debug!(window = window_id, reactor = %reactor, "reaction passed");
        ctx.emit(CombatEvent::ReactionPassed {
            window: window_id,
            combatant: reactor.clone(),
        });

        if window.is_settled() {
            return self.resume_window(Vec::new(), ctx).map(Some);
        }
        Ok(None)
    }

    /// Force the open window shut, passing everyone still pending
    ///
    /// Returns `None` when no window is open.
    pub fn close_reaction_window(&mut self, ctx: &mut ResolveCtx) -> Result<Option<ActionOutcome>> {
        self.ensure_active()?;
        let Some(window) = self.window.as_mut() else {
            return Ok(None);
        };
        let cut_off = window.force_close();
        if !cut_off.is_empty() {
            tracing::warn!(window = window.id, ?cut_off, "reaction window timed out");
        }
        self.resume_window(cut_off, ctx).map(Some)
    }

    fn window_id(&self, reactor: &CombatantId) -> Result<WindowId> {
        self.window
            .as_ref()
            .map(|w| w.id)
            .ok_or_else(|| EngineError::ReactionWindowClosed {
                combatant: reactor.clone(),
            })
    }

    fn set_reactor_state(&mut self, reactor: &CombatantId, state: ReactorState) {
        if let Some(entry) = self.window.as_mut().and_then(|w| w.entry_mut(reactor)) {
            entry.state = state;
        }
    }

    /// Every rejection a declaration can meet, checked before any change
    fn validate_declaration(
        &self,
        reactor: &CombatantId,
        reaction: ReactionKind,
        ctx: &ResolveCtx,
    ) -> Result<()> {
        let closed = || EngineError::ReactionWindowClosed {
            combatant: reactor.clone(),
        };
        let invalid = |reason: &str| EngineError::InvalidReaction {
            reaction,
            reason: reason.to_string(),
        };

        let window = self.window.as_ref().ok_or_else(closed)?;
        let entry = window.entry(reactor).ok_or_else(closed)?;
        let combatant = self.combatant(reactor)?;
        let trigger = reaction.trigger();
        let slot_taken = || EngineError::NoReactionSlotAvailable {
            combatant: reactor.clone(),
            trigger,
        };

        if trigger.is_chain() {
            if combatant.reactions_used.contains(&trigger) {
                return Err(slot_taken());
            }
            if entry.state != (ReactorState::ChainOpen { trigger }) {
                return Err(closed());
            }
        } else {
            match entry.state {
                ReactorState::Passed => return Err(closed()),
                ReactorState::Pending if !combatant.reactions_used.contains(&trigger) => {}
                _ => return Err(slot_taken()),
            }
            if entry.trigger != trigger {
                return Err(invalid("trigger does not match the window"));
            }
        }

        if let Some(condition) = combatant.conditions.blocking_condition() {
            return Err(EngineError::ConditionBlocksAction {
                combatant: reactor.clone(),
                condition,
            });
        }

        if reaction.uses_weapon() {
            if combatant.weapon.is_none() {
                return Err(EngineError::MissingEquipment {
                    combatant: reactor.clone(),
                    item: "weapon".to_string(),
                });
            }
            if combatant.conditions.is_disarmed() {
                return Err(EngineError::ConditionBlocksAction {
                    combatant: reactor.clone(),
                    condition: ConditionKind::Disarmed,
                });
            }
        }
        if reaction.uses_shield() && !combatant.shield.as_ref().is_some_and(|s| !s.is_broken()) {
            return Err(EngineError::MissingEquipment {
                combatant: reactor.clone(),
                item: "shield".to_string(),
            });
        }

        match reaction {
            ReactionKind::Parry if window.attack().is_some_and(|a| a.is_spell) => {
                return Err(invalid("spells cannot be parried"));
            }
            ReactionKind::Interpose => {
                let attack = window
                    .attack()
                    .ok_or_else(|| invalid("nothing to interpose against"))?;
                if attack.target != attack.original_target || attack.negated_by.is_some() {
                    return Err(invalid("the attack has already been answered"));
                }
                let protected = self.combatant(&attack.target)?;
                let distance = combatant.distance_to(protected);
                let range = ctx.constants.reactions.interpose_range;
                if distance > range {
                    return Err(EngineError::OutOfRange { distance, range });
                }
            }
            ReactionKind::Riposte | ReactionKind::ShieldBash | ReactionKind::OpportunityAttack => {
                let attacker = window.source();
                if self.combatant(attacker)?.is_defeated() {
                    return Err(EngineError::InvalidTarget {
                        target: attacker.clone(),
                        reason: "already defeated".to_string(),
                    });
                }
            }
            _ => {}
        }

        combatant.ap.check(reaction.cost(&ctx.constants.action_costs))
    }

    fn resolve_reaction(
        &mut self,
        reactor: &CombatantId,
        reaction: ReactionKind,
        ctx: &mut ResolveCtx,
    ) -> Result<(ReactionEffect, bool)> {
        match reaction {
            ReactionKind::Parry => self.parry(reactor, ctx),
            ReactionKind::RaiseShield => self.raise_shield(reactor, ctx),
            ReactionKind::Dodge => self.dodge(reactor, ctx),
            ReactionKind::Interpose => self.interpose(reactor, ctx),
            ReactionKind::OpportunityAttack | ReactionKind::Riposte => {
                let target = self.reaction_source(reactor)?;
                let spec = self.reactor_weapon(reactor)?;
                let ignore_armor = reaction == ReactionKind::Riposte;
                let report = self.strike(reactor, &target, spec, ignore_armor, ctx)?;
                let success = report.roll.outcome.lands();
                Ok((ReactionEffect::Strike { report }, success))
            }
            ReactionKind::ShieldBash => self.shield_bash(reactor, ctx),
        }
    }

    fn reaction_source(&self, reactor: &CombatantId) -> Result<CombatantId> {
        self.window
            .as_ref()
            .map(|w| w.source().clone())
            .ok_or_else(|| EngineError::ReactionWindowClosed {
                combatant: reactor.clone(),
            })
    }

    fn reactor_weapon(&self, reactor: &CombatantId) -> Result<DieSpec> {
        self.combatant(reactor)?
            .weapon
            .as_ref()
            .map(|w| w.die)
            .ok_or_else(|| EngineError::MissingEquipment {
                combatant: reactor.clone(),
                item: "weapon".to_string(),
            })
    }

    /// Weapon die against the attack roll, both exploding; strictly higher wins
    fn parry(&mut self, reactor: &CombatantId, ctx: &mut ResolveCtx) -> Result<(ReactionEffect, bool)> {
        let spec = self.reactor_weapon(reactor)?;
        let depth = ctx.constants.dice.max_explosion_depth;
        let parry_total = roll_exploding(ctx.dice, spec.die, depth).total;

        let window = self.window.as_mut().ok_or_else(|| EngineError::ReactionWindowClosed {
            combatant: reactor.clone(),
        })?;
        let Some(attack) = window.attack_mut() else {
            return Err(EngineError::InvalidReaction {
                reaction: ReactionKind::Parry,
                reason: "nothing to parry".to_string(),
            });
        };
        let attack_total = match attack.roll.exploded_total {
            Some(total) => total,
            None => continue_explosion(ctx.dice, attack.roll.die, attack.roll.natural, depth).total,
        };

        let negated = parry_total > attack_total;
        if negated {
            attack.negated_by = Some(ReactionKind::Parry);
        }
        Ok((
            ReactionEffect::Parry {
                parry_total,
                attack_total,
                negated,
            },
            negated,
        ))
    }

    /// Soak damage with the shield die before armor sees it
    fn raise_shield(
        &mut self,
        reactor: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<(ReactionEffect, bool)> {
        let remaining = self
            .window
            .as_ref()
            .and_then(|w| w.attack())
            .map(|a| a.roll.damage.saturating_sub(a.shield_absorbed))
            .ok_or_else(|| EngineError::InvalidReaction {
                reaction: ReactionKind::RaiseShield,
                reason: "nothing to block".to_string(),
            })?;

        let shield = self
            .combatant_mut(reactor)?
            .shield
            .as_mut()
            .ok_or_else(|| EngineError::MissingEquipment {
                combatant: reactor.clone(),
                item: "shield".to_string(),
            })?;
        let block = shield.block(remaining, ctx.dice);

        if let Some(attack) = self.window.as_mut().and_then(|w| w.attack_mut()) {
            attack.shield_absorbed += block.absorbed;
        }
        Ok((ReactionEffect::ShieldRaised { block }, block.succeeded()))
    }

    /// Take the Dodging stance and re-test the held roll against it
    ///
    /// Each dodge adds one to whatever rating the stance already has.
    fn dodge(&mut self, reactor: &CombatantId, ctx: &mut ResolveCtx) -> Result<(ReactionEffect, bool)> {
        let rating = self.combatant(reactor)?.conditions.dodge_rating() + 1;
        let stance = Condition::new(ConditionKind::Dodging, 1).with_magnitude(rating);
        self.apply_condition(reactor, stance, ctx)?;

        let mut dodged = false;
        if let Some(attack) = self.window.as_mut().and_then(|w| w.attack_mut()) {
            dodged = retest_dodge(&mut attack.roll, rating);
            if dodged {
                attack.negated_by = Some(ReactionKind::Dodge);
            }
        }
        Ok((ReactionEffect::Dodge { dodged }, dodged))
    }

    /// Step in front of the attack; the shoved ally may fall
    fn interpose(
        &mut self,
        reactor: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<(ReactionEffect, bool)> {
        let window = self.window.as_mut().ok_or_else(|| EngineError::ReactionWindowClosed {
            combatant: reactor.clone(),
        })?;
        let Some(attack) = window.attack_mut() else {
            return Err(EngineError::InvalidReaction {
                reaction: ReactionKind::Interpose,
                reason: "nothing to interpose against".to_string(),
            });
        };
        let protected = std::mem::replace(&mut attack.target, reactor.clone());
        // any shield soak belonged to the original target
        attack.shield_absorbed = 0;
        for entry in window
            .reactors
            .iter_mut()
            .filter(|e| e.combatant != *reactor && e.state == ReactorState::Pending)
        {
            entry.state = ReactorState::Passed;
        }

        let die = ctx.constants.reactions.interpose_save_die;
        let save = roll_save(self.combatant_mut(&protected)?, Attribute::Strength, die, ctx.dice);
        ctx.emit(CombatEvent::SavingThrow {
            combatant: protected.clone(),
            attribute: Attribute::Strength,
            result: save,
        });
        let knocked_prone = !save.success;
        if knocked_prone {
            let prone = Condition::new(ConditionKind::Prone, 1).from_source(reactor.clone());
            self.apply_condition(&protected, prone, ctx)?;
        }

        Ok((
            ReactionEffect::Interposed {
                protected,
                save,
                knocked_prone,
            },
            true,
        ))
    }

    /// Opposed Strength against the attacker's Constitution
    ///
    /// A bashed attacker is stunned through the end of their next turn.
    /// Bashing the acting combatant mid-turn gets the extra round from
    /// `apply_condition`.
    fn shield_bash(
        &mut self,
        reactor: &CombatantId,
        ctx: &mut ResolveCtx,
    ) -> Result<(ReactionEffect, bool)> {
        let attacker = self.reaction_source(reactor)?;
        let contest = opposed_check(
            ctx.dice,
            self.combatant(reactor)?.modifier(Attribute::Strength),
            self.combatant(&attacker)?.modifier(Attribute::Constitution),
        );

        let stunned = !contest.defender_wins;
        if stunned {
            let stun = Condition::new(ConditionKind::Stunned, 1).from_source(reactor.clone());
            self.apply_condition(&attacker, stun, ctx)?;
        }
        Ok((ReactionEffect::ShieldBash { contest, stunned }, stunned))
    }

    /// Close the window and carry out whatever it held back
    fn resume_window(
        &mut self,
        timed_out: Vec<CombatantId>,
        ctx: &mut ResolveCtx,
    ) -> Result<ActionOutcome> {
        let Some(window) = self.window.take() else {
            return Err(EngineError::EncounterNotActive);
        };
        for combatant in self.combatants.values_mut() {
            combatant.reactions_used.clear();
        }
        tracing::debug!(window = window.id, "reaction window closed");
        ctx.emit(CombatEvent::ReactionWindowClosed {
            window: window.id,
            timed_out,
        });

        let (actor, outcome) = match window.action {
            SuspendedAction::Attack(attack) => {
                let attacker = attack.attacker.clone();
                let report = self.finalize_attack(attack, false, ctx)?;
                let ap_remaining = self.combatant(&attacker)?.ap.current;
                (
                    attacker,
                    ActionOutcome::Attack {
                        report,
                        ap_remaining,
                    },
                )
            }
            SuspendedAction::Move { mover, from, to } => {
                let outcome = self.finalize_move(&mover, from, to, ctx)?;
                (mover, outcome)
            }
        };

        self.after_action(&actor, ctx)?;
        Ok(outcome)
    }
}
