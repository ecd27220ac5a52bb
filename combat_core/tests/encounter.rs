mod common;

use combat_core::combat::{AttackOutcome, MissConsequence};
use combat_core::config::default_miss_table;
use combat_core::prelude::*;
use combat_core::session::EncounterPhase;
use common::*;

fn land(session: &mut CombatSession, target: &str) -> combat_core::AttackReport {
    let outcome = session.submit_action(&id("fighter"), attack(target)).unwrap();
    assert!(outcome.window().is_some(), "target should be offered a reaction");
    match session.pass_reaction(&id(target)).unwrap() {
        Some(ActionOutcome::Attack { report, .. }) => report,
        other => panic!("expected a resolved attack, got {other:?}"),
    }
}

#[test]
fn test_slashing_crit_bleeds() {
    // initiative 15 / 3, attack 8 on a d8, bleed lasts 3, first bleed tick 2
    let mut session = session([fighter(), orc()], [15, 3, 8, 3, 2]);
    session.start().unwrap();
    assert_eq!(session.current_actor(), Some(&id("fighter")));

    let report = land(&mut session, "orc");
    assert_eq!(report.roll.outcome, AttackOutcome::Crit);
    assert_eq!(report.roll.damage, 10);
    assert_eq!(report.damage_dealt(), 10);
    assert_eq!(report.conditions, vec![ConditionKind::Bleeding]);

    let orc = session.combatant(&id("orc")).unwrap();
    assert_eq!(orc.hp, 20);
    assert_eq!(orc.conditions.remaining(ConditionKind::Bleeding), Some(3));
    assert_eq!(session.combatant(&id("fighter")).unwrap().ap.current, 4);

    let outcome = session.submit_action(&id("fighter"), Action::EndTurn).unwrap();
    assert_eq!(outcome, ActionOutcome::TurnEnded { next: Some(id("orc")) });

    let orc = session.combatant(&id("orc")).unwrap();
    assert_eq!(orc.hp, 18);
    assert_eq!(orc.conditions.remaining(ConditionKind::Bleeding), Some(2));
    assert!(session.events().contains(&CombatEvent::ConditionDamage {
        combatant: id("orc"),
        kind: ConditionKind::Bleeding,
        amount: 2,
    }));
}

#[test]
fn test_armor_reduces_hit() {
    let strong = fighter().with_attributes(AttributeScores::default().with(Attribute::Strength, 16));
    let constants = EngineConstants::default();
    let armored = orc().with_armor(Armor::new(6, ArmorWeight::Heavy, &constants.armor));
    let mut session = session([strong, armored], [15, 3, 7, 5]);
    session.start().unwrap();

    let report = land(&mut session, "orc");
    let damage = report.damage.as_ref().unwrap();
    assert_eq!(damage.raw, 10);
    assert_eq!(damage.armor.map(|a| a.rolled), Some(5));
    assert_eq!(damage.post_armor, 5);

    let orc = session.combatant(&id("orc")).unwrap();
    assert_eq!(orc.hp, 25);
    assert_eq!(orc.armor.as_ref().map(|a| a.durability), Some(36));
}

#[test]
fn test_vulnerable_doubles_and_immune_ignores() {
    let strong = || fighter().with_attributes(AttributeScores::default().with(Attribute::Strength, 16));

    let vulnerable = orc().with_affinities(
        Affinities::new().with(DamageType::Slashing, DamageTier::Vulnerable),
    );
    let mut session = session([strong(), vulnerable], [15, 3, 7]);
    session.start().unwrap();
    let report = land(&mut session, "orc");
    assert_eq!(report.damage_dealt(), 20);
    assert_eq!(session.combatant(&id("orc")).unwrap().hp, 10);

    let immune = orc().with_affinities(Affinities::new().with_all(DamageTier::Immune));
    let mut session = common::session([strong(), immune], [15, 3, 7]);
    session.start().unwrap();
    let report = land(&mut session, "orc");
    assert_eq!(report.damage_dealt(), 0);
    assert_eq!(session.combatant(&id("orc")).unwrap().hp, 30);
}

#[test]
fn test_exhausted_ap_rejects_without_change() {
    let mut constants = EngineConstants::default();
    constants.turn.auto_end_turn = false;
    let mut session = session_with([fighter().with_ap(1), orc()], [15, 3], constants);
    session.start().unwrap();

    session
        .submit_action(&id("fighter"), Action::Move { to: Position::new(0, 1) })
        .unwrap();
    assert_eq!(session.combatant(&id("fighter")).unwrap().ap.current, 0);

    let before = session.get_combat_state();
    let logged = session.events().len();
    let err = session
        .submit_action(&id("fighter"), Action::Move { to: Position::new(0, 2) })
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientAP {
            needed: 1,
            available: 0,
        }
    );
    assert_eq!(session.get_combat_state(), before);
    assert_eq!(session.events().len(), logged);
}

#[test]
fn test_auto_end_turn_when_ap_runs_out() {
    let mut session = session([fighter().with_ap(1), orc()], [15, 3]);
    session.start().unwrap();
    session
        .submit_action(&id("fighter"), Action::Move { to: Position::new(0, 1) })
        .unwrap();
    assert_eq!(session.current_actor(), Some(&id("orc")));
}

#[test]
fn test_target_validation() {
    let ally = Combatant::new("squire", 1).at(Position::new(0, 1));
    let far = Combatant::new("archer", 2).at(Position::new(5, 5));
    // rolled in id order: archer, fighter, orc, squire
    let mut session = session([fighter(), orc(), ally, far], [2, 15, 3, 1]);
    session.start().unwrap();
    assert_eq!(session.current_actor(), Some(&id("fighter")));
    let fighter_id = id("fighter");

    assert!(matches!(
        session.submit_action(&fighter_id, attack("fighter")),
        Err(EngineError::InvalidTarget { .. })
    ));
    assert!(matches!(
        session.submit_action(&fighter_id, attack("squire")),
        Err(EngineError::InvalidTarget { .. })
    ));
    assert_eq!(
        session.submit_action(&fighter_id, attack("archer")),
        Err(EngineError::OutOfRange {
            distance: 5,
            range: 1,
        })
    );
    assert!(matches!(
        session.submit_action(&fighter_id, attack("nobody")),
        Err(EngineError::UnknownCombatant { .. })
    ));
    assert!(matches!(
        session.submit_action(&id("orc"), attack("fighter")),
        Err(EngineError::NotYourTurn { .. })
    ));
    assert!(matches!(
        session.submit_action(&fighter_id, Action::Move { to: Position::new(1, 0) }),
        Err(EngineError::InvalidTarget { .. })
    ));
    assert_eq!(session.combatant(&fighter_id).unwrap().ap.current, 6);
}

#[test]
fn test_unarmed_attack_needs_weapon() {
    let mut session = session([Combatant::new("fighter", 1), orc()], [15, 3]);
    session.start().unwrap();
    assert!(matches!(
        session.submit_action(&id("fighter"), attack("orc")),
        Err(EngineError::MissingEquipment { .. })
    ));
}

#[test]
fn test_critical_miss_fumbles_weapon() {
    // natural 1, confirmed by a second 1, then 5 on the miss table
    let mut session = session([fighter(), orc()], [15, 3, 1, 1, 5]);
    session.start().unwrap();

    let outcome = session.submit_action(&id("fighter"), attack("orc")).unwrap();
    let report = outcome.attack_report().unwrap();
    assert_eq!(report.roll.outcome, AttackOutcome::CriticalMiss);
    assert_eq!(report.miss_consequence, Some(MissConsequence::Fumble));

    let fighter = session.combatant(&id("fighter")).unwrap();
    assert!(fighter.conditions.has(ConditionKind::Disarmed));
    assert_eq!(fighter.ap.current, 4);

    assert_eq!(
        session.submit_action(&id("fighter"), attack("orc")),
        Err(EngineError::ConditionBlocksAction {
            combatant: id("fighter"),
            condition: ConditionKind::Disarmed,
        })
    );
}

#[test]
fn test_off_balance_halves_next_turn_movement() {
    // double 1 then table roll 7
    let mut session = session([fighter(), orc()], [15, 3, 1, 1, 7]);
    session.start().unwrap();

    let outcome = session.submit_action(&id("fighter"), attack("orc")).unwrap();
    let report = outcome.attack_report().unwrap();
    assert_eq!(report.miss_consequence, Some(MissConsequence::OffBalance));

    session.submit_action(&id("fighter"), Action::EndTurn).unwrap();
    session.submit_action(&id("orc"), Action::EndTurn).unwrap();
    assert_eq!(session.current_actor(), Some(&id("fighter")));
    assert!(session
        .combatant(&id("fighter"))
        .unwrap()
        .conditions
        .has(ConditionKind::OffBalance));

    assert_eq!(
        session.submit_action(&id("fighter"), Action::Move { to: Position::new(-4, 0) }),
        Err(EngineError::OutOfRange {
            distance: 4,
            range: 3,
        })
    );
    session
        .submit_action(&id("fighter"), Action::Move { to: Position::new(-3, 0) })
        .unwrap();

    session.submit_action(&id("fighter"), Action::EndTurn).unwrap();
    assert!(!session
        .combatant(&id("fighter"))
        .unwrap()
        .conditions
        .has(ConditionKind::OffBalance));
}

#[test]
fn test_demoralized_carries_into_next_turn() {
    // double 1 then table roll 9
    let mut session = session([fighter(), orc()], [15, 3, 1, 1, 9]);
    session.start().unwrap();

    let outcome = session.submit_action(&id("fighter"), attack("orc")).unwrap();
    assert_eq!(
        outcome.attack_report().unwrap().miss_consequence,
        Some(MissConsequence::Demoralized)
    );

    session.submit_action(&id("fighter"), Action::EndTurn).unwrap();
    session.submit_action(&id("orc"), Action::EndTurn).unwrap();
    let fighter = session.combatant(&id("fighter")).unwrap();
    assert_eq!(fighter.conditions.remaining(ConditionKind::Demoralized), Some(1));
}

#[test]
fn test_plain_miss_opens_no_window() {
    // natural 1 confirmed by a 4 is a plain miss
    let mut session = session([fighter(), orc()], [15, 3, 1, 4]);
    session.start().unwrap();
    let outcome = session.submit_action(&id("fighter"), attack("orc")).unwrap();
    let report = outcome.attack_report().unwrap();
    assert_eq!(report.roll.outcome, AttackOutcome::Miss);
    assert_eq!(report.roll.confirm, Some(4));
    assert!(session.pending_window().is_none());
    assert_eq!(session.combatant(&id("orc")).unwrap().hp, 30);
}

#[test]
fn test_defeat_ends_encounter() {
    let mut session = session([fighter(), orc().with_hp(5)], [15, 3, 8]);
    session.start().unwrap();

    let report = land(&mut session, "orc");
    assert!(report.target_defeated);
    assert!(report.conditions.is_empty());
    assert!(session.is_over());
    assert!(session.events().contains(&CombatEvent::CombatantDefeated {
        combatant: id("orc"),
    }));
    assert_eq!(
        session.events().last(),
        Some(&CombatEvent::EncounterEnded {
            winner: Some(TeamId(1)),
        })
    );
    assert_eq!(
        session.submit_action(&id("fighter"), Action::EndTurn),
        Err(EngineError::EncounterNotActive)
    );
}

#[test]
fn test_stunned_actor_loses_turn() {
    let brawler = fighter().with_weapon(club());
    // club crit on 6, orc fails the Constitution save with a 2
    let mut session = session([brawler, orc()], [15, 3, 6, 2]);
    session.start().unwrap();

    let report = land(&mut session, "orc");
    assert_eq!(report.conditions, vec![ConditionKind::Stunned]);

    let outcome = session.submit_action(&id("fighter"), Action::EndTurn).unwrap();
    assert_eq!(outcome, ActionOutcome::TurnEnded { next: Some(id("fighter")) });
    assert!(session.events().contains(&CombatEvent::TurnSkipped {
        combatant: id("orc"),
        condition: ConditionKind::Stunned,
    }));

    let state = session.get_combat_state();
    assert_eq!(state.round, 2);
    assert!(!state.combatant(&id("orc")).unwrap().conditions.has(ConditionKind::Stunned));
}

#[test]
fn test_spell_applies_condition_and_cannot_be_parried() {
    let caster = Combatant::new("fighter", 1)
        .with_attributes(AttributeScores::default().with(Attribute::Intelligence, 14))
        .at(Position::new(0, 0));
    let guard = orc().at(Position::new(4, 0)).with_weapon(club());
    let mut session = session([caster, guard], [15, 3, 5]);
    session.start().unwrap();

    let mut spell = SpellSpec::new(
        "fear bolt",
        DieSpec::new(DieSize::D10, DamageTag::Spell(SpellSchool::Psychic)),
    );
    spell.ap_cost = Some(3);
    spell.on_hit = Some(combat_core::session::SpellCondition {
        kind: ConditionKind::Frightened,
        duration: 2,
    });
    let outcome = session
        .submit_action(
            &id("fighter"),
            Action::CastSpell {
                spell,
                target: id("orc"),
            },
        )
        .unwrap();
    assert!(outcome.window().is_some());
    assert_eq!(session.combatant(&id("fighter")).unwrap().ap.current, 3);

    assert!(matches!(
        session.declare_reaction(&id("orc"), ReactionKind::Parry),
        Err(EngineError::InvalidReaction { .. })
    ));

    let resumed = session.pass_reaction(&id("orc")).unwrap().unwrap();
    let report = resumed.attack_report().unwrap();
    assert_eq!(report.damage_dealt(), 7);
    assert_eq!(report.conditions, vec![ConditionKind::Frightened]);
    let orc = session.combatant(&id("orc")).unwrap();
    assert_eq!(orc.hp, 23);
    assert_eq!(orc.conditions.remaining(ConditionKind::Frightened), Some(2));
}

#[test]
fn test_leech_heals_attacker() {
    let mut leech = fighter().with_hp(20).with_conversion(Conversion::Leech);
    leech.hp = 10;
    let mut session = session([leech, orc()], [15, 3, 5]);
    session.start().unwrap();

    let report = land(&mut session, "orc");
    let damage = report.damage.as_ref().unwrap();
    assert_eq!(damage.dealt(), 7);
    assert_eq!(damage.healing_to_source, 2);
    assert_eq!(session.combatant(&id("fighter")).unwrap().hp, 12);
    assert!(session.events().contains(&CombatEvent::Healed {
        combatant: id("fighter"),
        amount: 2,
    }));
}

#[test]
fn test_snapshot_session_roundtrips_state() {
    let json = r#"[
        { "id": "fighter", "team": 1, "max_hp": 12,
          "weapon": { "name": "sword", "die": { "die": "d8", "tag": "slashing" } } },
        { "id": "orc", "team": 2, "max_hp": 15, "position": { "x": 1, "y": 0 } }
    ]"#;
    let snapshots: Vec<CombatantSnapshot> = serde_json::from_str(json).unwrap();
    let mut session = CombatSession::new(snapshots, SeededDice::seeded(5)).unwrap();
    session.start().unwrap();

    let state = session.get_combat_state();
    assert_eq!(state.phase, EncounterPhase::ActorTurn);
    assert_eq!(state.order.len(), 2);

    let encoded = serde_json::to_string(&state).unwrap();
    assert!(encoded.contains(r#""phase":"actor_turn""#));
    let decoded: CombatStateSnapshot = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, state);
}

/// Drive an encounter with every decision fixed so only the dice vary
fn run_scripted(seed: u64) -> Vec<CombatEvent> {
    let mut session = CombatSession::from_combatants(
        [fighter(), orc().with_hp(20).with_weapon(club())],
        SeededDice::seeded(seed),
        EngineConstants::default(),
        default_miss_table(),
    )
    .unwrap();
    session.start().unwrap();

    for _ in 0..500 {
        if session.is_over() {
            break;
        }
        if session.pending_window().is_some() {
            session.close_reaction_window().unwrap();
            continue;
        }
        let Some(actor) = session.current_actor().cloned() else {
            break;
        };
        let target = if actor == id("fighter") { "orc" } else { "fighter" };
        if session.submit_action(&actor, attack(target)).is_err() {
            session.submit_action(&actor, Action::EndTurn).unwrap();
        }
    }
    session.events().to_vec()
}

#[test]
fn test_seeded_encounter_replays_identically() {
    let first = run_scripted(1234);
    let second = run_scripted(1234);
    assert_eq!(first, second);
    assert!(first
        .iter()
        .any(|e| matches!(e, CombatEvent::EncounterEnded { .. })));
}
