//! Demo encounter driven through the host.
//!
//! Usage: `combat_demo [seed]`. Events are printed to stdout as JSON lines,
//! logs go to stderr (`RUST_LOG` overrides the default `info` filter).
//! Team 1 answers its reaction windows; team 2 never does, so its windows
//! close on the deadline.

use std::error::Error;
use std::time::Duration;

use combat_core::reaction::{ReactionWindow, ReactorState};
use combat_core::session::EncounterPhase;
use combat_core::{
    Action, CombatSession, CombatStateSnapshot, Combatant, CombatantSnapshot, Position,
    ReactionKind, SeededDice, TeamId, TriggerKind,
};
use combat_host::{HostConfig, HostError, SessionHandle, SessionHost};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const ENCOUNTER: &str = include_str!("../data/encounter.json");
const DEFAULT_SEED: u64 = 7;
const MAX_STEPS: usize = 500;
const PLAYER_TEAM: TeamId = TeamId(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let roster: Vec<CombatantSnapshot> = serde_json::from_str(ENCOUNTER)?;
    info!(seed, combatants = roster.len(), "loading encounter");

    let session = CombatSession::new(roster, SeededDice::seeded(seed))?;
    let config = HostConfig::from_constants(session.constants())
        .with_window_timeout(Duration::from_millis(250));
    let timeout = config.window_timeout;
    let host = SessionHost::spawn(session, config);
    let handle = host.handle();

    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!(error = %err, "failed to encode event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    handle.start().await?;
    for _ in 0..MAX_STEPS {
        if !step(&handle, timeout).await? {
            break;
        }
    }

    let state = handle.get_combat_state().await?;
    info!(
        round = state.round,
        revision = state.revision,
        phase = ?state.phase,
        "demo finished"
    );
    for combatant in &state.combatants {
        info!(id = %combatant.id, hp = combatant.hp, max_hp = combatant.max_hp, "final");
    }

    drop(handle);
    host.shutdown().await?;
    printer.await?;
    Ok(())
}

/// Advance the encounter by one decision; false once it is over
async fn step(handle: &SessionHandle, timeout: Duration) -> Result<bool, HostError> {
    let state = handle.get_combat_state().await?;
    if state.phase == EncounterPhase::Ended || state.fault.is_some() {
        return Ok(false);
    }

    if let Some(window) = &state.window {
        answer_window(handle, &state, window).await?;
        if handle.get_combat_state().await?.window.is_some() {
            // left for the deadline
            tokio::time::sleep(timeout + Duration::from_millis(20)).await;
        }
        return Ok(true);
    }

    let Some(actor) = state.current_actor.as_ref().and_then(|id| state.combatant(id)) else {
        return Ok(false);
    };
    let action = choose_action(&state, actor);
    debug!(actor = %actor.id, ?action, "proposing");

    match handle
        .submit_proposal(actor.id.clone(), action, state.revision)
        .await
    {
        Ok(_) => {}
        Err(HostError::Engine(err)) if !err.is_fault() => {
            debug!(actor = %actor.id, error = %err, "action refused, ending turn");
            handle.submit_action(actor.id.clone(), Action::EndTurn).await?;
        }
        Err(err) => return Err(err),
    }
    Ok(true)
}

/// Attack the nearest enemy in reach, otherwise step toward it
fn choose_action(state: &CombatStateSnapshot, actor: &Combatant) -> Action {
    let Some(weapon) = &actor.weapon else {
        return Action::EndTurn;
    };
    let nearest = state
        .combatants
        .iter()
        .filter(|c| c.team != actor.team && !c.is_defeated())
        .min_by_key(|c| (actor.distance_to(c), c.id.clone()));
    let Some(target) = nearest else {
        return Action::EndTurn;
    };

    if actor.distance_to(target) <= weapon.range {
        return Action::Attack {
            target: target.id.clone(),
        };
    }
    let step = Position::new(
        actor.position.x + (target.position.x - actor.position.x).signum(),
        actor.position.y + (target.position.y - actor.position.y).signum(),
    );
    Action::Move { to: step }
}

async fn answer_window(
    handle: &SessionHandle,
    state: &CombatStateSnapshot,
    window: &ReactionWindow,
) -> Result<(), HostError> {
    for entry in &window.reactors {
        if entry.state != ReactorState::Pending {
            continue;
        }
        let Some(reactor) = state.combatant(&entry.combatant) else {
            continue;
        };
        if reactor.team != PLAYER_TEAM {
            continue;
        }

        let reaction = match entry.trigger {
            TriggerKind::OnAttacked if reactor.weapon.is_some() => ReactionKind::Parry,
            TriggerKind::OnAttacked if reactor.shield.is_some() => ReactionKind::RaiseShield,
            TriggerKind::OnEnemyLeavesMeleeRange => ReactionKind::OpportunityAttack,
            _ => {
                settle(handle.pass_reaction(reactor.id.clone()).await)?;
                continue;
            }
        };

        match handle.declare_reaction(reactor.id.clone(), reaction).await {
            Ok(outcome) => {
                let follow_up = match outcome.chain_open {
                    Some(TriggerKind::OnSuccessfulParry) => Some(ReactionKind::Riposte),
                    Some(TriggerKind::OnSuccessfulRaiseShield) => Some(ReactionKind::ShieldBash),
                    _ => None,
                };
                if let Some(follow_up) = follow_up {
                    if let Err(err) = handle.declare_reaction(reactor.id.clone(), follow_up).await {
                        debug!(reactor = %reactor.id, error = %err, "follow-up refused");
                        settle(handle.pass_reaction(reactor.id.clone()).await)?;
                    }
                }
            }
            Err(HostError::Engine(err)) if !err.is_fault() => {
                debug!(reactor = %reactor.id, ?reaction, error = %err, "reaction refused");
                settle(handle.pass_reaction(reactor.id.clone()).await)?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Ignore rejections; a window may close between query and answer
fn settle<T>(result: Result<T, HostError>) -> Result<(), HostError> {
    match result {
        Ok(_) => Ok(()),
        Err(HostError::Engine(err)) if !err.is_fault() => Ok(()),
        Err(err) => Err(err),
    }
}
