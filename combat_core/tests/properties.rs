use combat_core::combat::{roll_attack, AttackContext, AttackOutcome};
use combat_core::config::ArmorConstants;
use combat_core::damage::{resolve_damage, IncomingDamage};
use combat_core::defense::mitigate;
use combat_core::prelude::*;
use proptest::prelude::*;

fn tier() -> impl Strategy<Value = DamageTier> {
    prop_oneof![
        Just(DamageTier::Susceptible),
        Just(DamageTier::Exposed),
        Just(DamageTier::Vulnerable),
        Just(DamageTier::Guarded),
        Just(DamageTier::Resistant),
        Just(DamageTier::Immune),
    ]
}

fn die() -> impl Strategy<Value = DieSize> {
    prop_oneof![
        Just(DieSize::D4),
        Just(DieSize::D6),
        Just(DieSize::D8),
        Just(DieSize::D10),
        Just(DieSize::D12),
        Just(DieSize::D20),
    ]
}

proptest! {
    #[test]
    fn test_armor_never_goes_negative(damage in 0u32..200, bonus in 0u32..12, roll in 1u32..20) {
        let constants = ArmorConstants::default();
        let mut target = Combatant::new("target", 1)
            .with_armor(Armor::new(bonus, ArmorWeight::Medium, &constants));
        let result = mitigate(damage, &mut target, &mut ScriptedDice::new([roll]), &constants);
        prop_assert!(result.after <= damage);
        prop_assert_eq!(result.after, damage.saturating_sub(result.rolled));
    }

    #[test]
    fn test_immune_always_zero(raw in 0u32..500, seed in any::<u64>(), bonus in 0u32..12) {
        let constants = ArmorConstants::default();
        let mut target = Combatant::new("target", 1)
            .with_armor(Armor::new(bonus, ArmorWeight::Light, &constants))
            .with_affinities(Affinities::new().with_all(DamageTier::Immune));
        let incoming = IncomingDamage::new("source".into(), DamageType::Fire, raw)
            .with_conversion(Some(Conversion::Invert));
        let event = resolve_damage(incoming, &mut target, &mut SeededDice::seeded(seed), &constants);
        prop_assert_eq!(event.dealt(), 0);
        prop_assert_eq!(event.healing_to_source, 0);
    }

    #[test]
    fn test_pipeline_stages_are_consistent(raw in 0u32..300, tier in tier(), seed in any::<u64>()) {
        let constants = ArmorConstants::default();
        let mut target = Combatant::new("target", 1)
            .with_armor(Armor::new(4, ArmorWeight::Heavy, &constants))
            .with_affinities(Affinities::new().with(DamageType::Slashing, tier));
        let incoming = IncomingDamage::new("source".into(), DamageType::Slashing, raw);
        let event = resolve_damage(incoming, &mut target, &mut SeededDice::seeded(seed), &constants);
        prop_assert!(event.post_armor <= raw);
        prop_assert_eq!(event.post_modifier, tier.apply(event.post_armor));
        prop_assert_eq!(event.tier, Some(tier));
    }

    #[test]
    fn test_max_face_always_crits(die in die(), modifier in -3i32..6) {
        let spec = DieSpec::new(die, DamageTag::Bludgeoning);
        let ctx = AttackContext { modifier, max_explosion_depth: 3, ..Default::default() };
        let roll = roll_attack(&mut ScriptedDice::new([die.sides()]), spec, ctx);
        prop_assert_eq!(roll.outcome, AttackOutcome::Crit);
        prop_assert_eq!(roll.damage as i64, (die.sides() as i64 + modifier as i64).max(0));
    }

    #[test]
    fn test_natural_one_needs_confirmation(die in die(), confirm in 1u32..20) {
        let spec = DieSpec::new(die, DamageTag::Slashing);
        let confirm = confirm.min(die.sides());
        let roll = roll_attack(
            &mut ScriptedDice::new([1, confirm]),
            spec,
            AttackContext::default(),
        );
        let expected = if confirm == 1 { AttackOutcome::CriticalMiss } else { AttackOutcome::Miss };
        prop_assert_eq!(roll.outcome, expected);
        prop_assert_eq!(roll.damage, 0);
    }

    #[test]
    fn test_seeded_sessions_keep_hp_and_ap_in_bounds(seed in any::<u64>()) {
        let fighter = Combatant::new("fighter", 1)
            .with_weapon(Weapon::new("axe", DieSpec::new(DieSize::D10, DamageTag::Slashing)))
            .at(Position::new(0, 0));
        let orc = Combatant::new("orc", 2)
            .with_hp(16)
            .with_weapon(Weapon::new("club", DieSpec::new(DieSize::D6, DamageTag::Bludgeoning)))
            .at(Position::new(1, 0));
        let mut session = CombatSession::from_combatants(
            [fighter, orc],
            SeededDice::seeded(seed),
            EngineConstants::default(),
            combat_core::config::default_miss_table(),
        ).unwrap();
        session.start().unwrap();

        for _ in 0..200 {
            if session.is_over() {
                break;
            }
            if session.pending_window().is_some() {
                session.close_reaction_window().unwrap();
                continue;
            }
            let Some(actor) = session.current_actor().cloned() else { break };
            let target = if actor.0 == "fighter" { "orc" } else { "fighter" };
            let action = Action::Attack { target: target.into() };
            if session.submit_action(&actor, action).is_err() {
                session.submit_action(&actor, Action::EndTurn).unwrap();
            }

            for combatant in &session.get_combat_state().combatants {
                prop_assert!(combatant.hp <= combatant.max_hp);
                prop_assert!(combatant.ap.current <= combatant.ap.max);
            }
        }
        prop_assert!(!session.is_faulted());
    }
}
