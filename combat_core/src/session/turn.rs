//! Turn controller - initiative, the turn loop and round boundaries

use super::state::{EncounterPhase, EncounterState, ResolveCtx};
use super::{CombatEvent, InitiativeRoll};
use crate::condition::{ConditionKind, TickPhase};
use crate::economy;
use crate::error::{EngineError, Result};
use crate::types::{Attribute, CombatantId, DieSize, TeamId};

impl EncounterState {
    /// Roll initiative and begin the first turn
    ///
    /// Only valid from `Init`; any later call fails with `EncounterNotActive`.
    pub fn start(&mut self, ctx: &mut ResolveCtx) -> Result<()> {
        if self.phase != EncounterPhase::Init {
            return Err(EngineError::EncounterNotActive);
        }

        ctx.emit(CombatEvent::EncounterStarted {
            combatants: self.combatants.keys().cloned().collect(),
        });

        self.phase = EncounterPhase::RollInitiative;
        let rolls = self.roll_initiative(ctx);
        let order: Vec<CombatantId> = rolls.iter().map(|r| r.combatant.clone()).collect();
        tracing::info!(?order, "initiative rolled");
        ctx.emit(CombatEvent::InitiativeRolled {
            rolls,
            order: order.clone(),
        });

        self.round.order = order;
        self.round.round = 1;
        self.round.current = 0;
        self.phase = EncounterPhase::ActorTurn;
        ctx.emit(CombatEvent::RoundStarted { round: 1 });

        if !self.check_encounter_end(ctx) {
            self.begin_turn(ctx)?;
        }
        Ok(())
    }

    /// d20 plus agility modifier, highest first
    ///
    /// Ties go to the higher raw agility score, then the lower id.
    fn roll_initiative(&mut self, ctx: &mut ResolveCtx) -> Vec<InitiativeRoll> {
        let mut rolls: Vec<(InitiativeRoll, i32)> = self
            .combatants
            .values()
            .map(|c| {
                let roll = ctx.dice.roll(DieSize::D20);
                let modifier = c.modifier(Attribute::Agility);
                (
                    InitiativeRoll {
                        combatant: c.id.clone(),
                        roll,
                        modifier,
                        total: roll as i32 + modifier,
                    },
                    c.attributes.agility,
                )
            })
            .collect();

        rolls.sort_by(|(a, a_agility), (b, b_agility)| {
            b.total
                .cmp(&a.total)
                .then(b_agility.cmp(a_agility))
                .then(a.combatant.cmp(&b.combatant))
        });

        rolls.into_iter().map(|(roll, _)| roll).collect()
    }

    /// Move to the next living actor and run their start-of-turn steps
    ///
    /// Actors who cannot act (defeated at the start of their turn, or held
    /// by a condition that blocks actions) are passed over after their
    /// conditions tick.
    pub fn begin_turn(&mut self, ctx: &mut ResolveCtx) -> Result<()> {
        while self.phase == EncounterPhase::ActorTurn {
            let Some(actor) = self.current_actor().cloned() else {
                return Err(EngineError::EncounterNotActive);
            };

            if self.combatant(&actor)?.is_defeated() {
                self.advance(ctx);
                continue;
            }

            let combatant = self.combatant_mut(&actor)?;
            let distracted = combatant.conditions.has(ConditionKind::Distracted);
            let ap = economy::reset(combatant);
            if distracted {
                ctx.emit(CombatEvent::ConditionConsumed {
                    combatant: actor.clone(),
                    kind: ConditionKind::Distracted,
                });
            }

            tracing::debug!(round = self.round.round, combatant = %actor, ap, "turn started");
            ctx.emit(CombatEvent::TurnStarted {
                round: self.round.round,
                combatant: actor.clone(),
                ap,
            });

            let tick = self
                .combatant_mut(&actor)?
                .conditions
                .tick(TickPhase::StartOfTurn, ctx.dice);
            self.apply_tick(&actor, tick, ctx)?;

            if self.check_encounter_end(ctx) {
                return Ok(());
            }
            if self.combatant(&actor)?.is_defeated() {
                ctx.emit(CombatEvent::TurnEnded { combatant: actor });
                self.advance(ctx);
                continue;
            }
            if let Some(condition) = self.combatant(&actor)?.conditions.blocking_condition() {
                tracing::debug!(combatant = %actor, ?condition, "turn skipped");
                ctx.emit(CombatEvent::TurnSkipped {
                    combatant: actor.clone(),
                    condition,
                });
                self.close_turn(&actor, ctx)?;
                if self.check_encounter_end(ctx) {
                    return Ok(());
                }
                self.advance(ctx);
                continue;
            }
            return Ok(());
        }
        Ok(())
    }

    /// End the current actor's turn and start the next one
    pub fn end_turn(&mut self, ctx: &mut ResolveCtx) -> Result<()> {
        let Some(actor) = self.current_actor().cloned() else {
            return Err(EngineError::EncounterNotActive);
        };
        self.close_turn(&actor, ctx)?;
        if self.check_encounter_end(ctx) {
            return Ok(());
        }
        self.advance(ctx);
        self.begin_turn(ctx)
    }

    fn close_turn(&mut self, actor: &CombatantId, ctx: &mut ResolveCtx) -> Result<()> {
        let tick = self
            .combatant_mut(actor)?
            .conditions
            .tick(TickPhase::EndOfTurn, ctx.dice);
        self.apply_tick(actor, tick, ctx)?;
        tracing::debug!(combatant = %actor, "turn ended");
        ctx.emit(CombatEvent::TurnEnded {
            combatant: actor.clone(),
        });
        Ok(())
    }

    fn advance(&mut self, ctx: &mut ResolveCtx) {
        self.round.current += 1;
        if self.round.current < self.round.order.len() {
            return;
        }

        self.phase = EncounterPhase::RoundEnd;
        ctx.emit(CombatEvent::RoundEnded {
            round: self.round.round,
        });
        self.round.round += 1;
        self.round.current = 0;
        self.phase = EncounterPhase::ActorTurn;
        tracing::info!(round = self.round.round, "round started");
        ctx.emit(CombatEvent::RoundStarted {
            round: self.round.round,
        });
    }

    /// End the encounter once at most one team has anyone standing
    pub fn check_encounter_end(&mut self, ctx: &mut ResolveCtx) -> bool {
        if self.phase == EncounterPhase::Ended {
            return true;
        }
        let teams = self.living_teams();
        if teams.len() > 1 {
            return false;
        }
        self.finish(teams.into_iter().next(), ctx);
        true
    }

    pub fn finish(&mut self, winner: Option<TeamId>, ctx: &mut ResolveCtx) {
        tracing::info!(?winner, round = self.round.round, "encounter ended");
        self.phase = EncounterPhase::Ended;
        self.window = None;
        for combatant in self.combatants.values_mut() {
            combatant.reactions_used.clear();
        }
        ctx.emit(CombatEvent::EncounterEnded { winner });
    }
}
