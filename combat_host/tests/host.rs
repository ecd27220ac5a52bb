use std::time::Duration;

use combat_core::config::default_miss_table;
use combat_core::prelude::*;
use combat_host::{HostConfig, HostError, SessionHandle, SessionHost};
use tokio::sync::broadcast;

fn fighter() -> Combatant {
    Combatant::new("fighter", 1)
        .with_attributes(AttributeScores::default().with(Attribute::Strength, 14))
        .with_weapon(Weapon::new(
            "sword",
            DieSpec::new(DieSize::D8, DamageTag::Slashing),
        ))
        .at(Position::new(0, 0))
}

fn orc() -> Combatant {
    Combatant::new("orc", 2).with_hp(30).at(Position::new(1, 0))
}

/// Fighter wins initiative 15 to 3, then rolls 5 to hit for 7
fn duel() -> CombatSession {
    CombatSession::from_combatants(
        [fighter(), orc()],
        ScriptedDice::new([15, 3, 5]),
        EngineConstants::default(),
        default_miss_table(),
    )
    .unwrap()
}

fn spawn() -> (SessionHost, SessionHandle) {
    let host = SessionHost::spawn(duel(), HostConfig::default());
    let handle = host.handle();
    (host, handle)
}

fn attack_orc() -> Action {
    Action::Attack {
        target: "orc".into(),
    }
}

fn received(events: &mut broadcast::Receiver<CombatEvent>) -> Vec<CombatEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_window_closes_on_deadline() {
    let (_host, handle) = spawn();
    let mut events = handle.subscribe();
    handle.start().await.unwrap();

    let outcome = handle.submit_action("fighter", attack_orc()).await.unwrap();
    let window = outcome.window().expect("the orc can dodge");

    tokio::time::sleep(Duration::from_millis(4999)).await;
    let state = handle.get_combat_state().await.unwrap();
    assert!(state.window.is_some());
    assert_eq!(state.combatant(&"orc".into()).unwrap().hp, 30);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let state = handle.get_combat_state().await.unwrap();
    assert!(state.window.is_none());
    assert_eq!(state.combatant(&"orc".into()).unwrap().hp, 23);

    assert!(received(&mut events).contains(&CombatEvent::ReactionWindowClosed {
        window,
        timed_out: vec!["orc".into()],
    }));
}

#[tokio::test(start_paused = true)]
async fn test_answered_window_is_not_timed_out() {
    let (_host, handle) = spawn();
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    handle.submit_action("fighter", attack_orc()).await.unwrap();

    let resumed = handle.pass_reaction("orc").await.unwrap().unwrap();
    assert_eq!(resumed.attack_report().unwrap().damage_dealt(), 7);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let closes: Vec<_> = received(&mut events)
        .into_iter()
        .filter(|e| matches!(e, CombatEvent::ReactionWindowClosed { .. }))
        .collect();
    assert_eq!(closes.len(), 1);
    assert!(matches!(
        &closes[0],
        CombatEvent::ReactionWindowClosed { timed_out, .. } if timed_out.is_empty()
    ));
}

#[tokio::test(start_paused = true)]
async fn test_manual_close_before_deadline() {
    let (_host, handle) = spawn();
    handle.start().await.unwrap();
    handle.submit_action("fighter", attack_orc()).await.unwrap();

    let resumed = handle.close_reaction_window().await.unwrap();
    assert!(resumed.is_some());
    assert_eq!(handle.close_reaction_window().await.unwrap(), None);

    tokio::time::sleep(Duration::from_secs(6)).await;
    let state = handle.get_combat_state().await.unwrap();
    assert_eq!(state.combatant(&"orc".into()).unwrap().hp, 23);
}

#[tokio::test]
async fn test_concurrent_proposals_are_serialized() {
    let (_host, first) = spawn();
    let second = first.clone();
    first.start().await.unwrap();
    let revision = first.get_combat_state().await.unwrap().revision;

    let (a, b) = tokio::join!(
        first.submit_proposal(
            "fighter",
            Action::Move {
                to: Position::new(0, 1)
            },
            revision
        ),
        second.submit_proposal(
            "fighter",
            Action::Move {
                to: Position::new(0, -1)
            },
            revision
        ),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let stale = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .and_then(HostError::engine);
    assert_eq!(
        stale,
        Some(&EngineError::StaleProposal {
            proposed: revision,
            current: revision + 1,
        })
    );
}

#[tokio::test]
async fn test_engine_rejections_pass_through() {
    let (_host, handle) = spawn();
    handle.start().await.unwrap();
    let before = handle.get_combat_state().await.unwrap();

    let err = handle.submit_action("orc", Action::EndTurn).await.unwrap_err();
    assert_eq!(
        err.engine(),
        Some(&EngineError::NotYourTurn {
            combatant: "orc".into(),
        })
    );
    assert_eq!(handle.get_combat_state().await.unwrap(), before);
}

#[tokio::test]
async fn test_events_broadcast_in_commit_order() {
    let (_host, handle) = spawn();
    let mut events = handle.subscribe();
    handle.start().await.unwrap();
    handle.submit_action("fighter", Action::EndTurn).await.unwrap();

    let events = received(&mut events);
    assert!(matches!(events[0], CombatEvent::EncounterStarted { .. }));
    assert!(matches!(events[1], CombatEvent::InitiativeRolled { .. }));
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::TurnEnded { .. })));
}

#[tokio::test]
async fn test_shutdown_stops_worker() {
    let (host, handle) = spawn();
    handle.start().await.unwrap();
    host.shutdown().await.unwrap();

    assert!(matches!(
        handle.get_combat_state().await,
        Err(HostError::CommandChannelClosed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_taken_from_constants() {
    let mut constants = EngineConstants::default();
    constants.reactions.window_timeout_ms = 50;
    let session = CombatSession::from_combatants(
        [fighter(), orc()],
        ScriptedDice::new([15, 3, 5]),
        constants,
        default_miss_table(),
    )
    .unwrap();
    let host = SessionHost::spawn_default(session);
    let handle = host.handle();
    handle.start().await.unwrap();
    handle.submit_action("fighter", attack_orc()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(handle.get_combat_state().await.unwrap().window.is_none());
    host.shutdown().await.unwrap();
}
