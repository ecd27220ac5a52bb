//! Consistency checks run after every mutation, before it commits

use super::state::EncounterState;
use crate::error::InvariantViolation;

/// Verify the state a mutation produced
pub(crate) fn check(state: &EncounterState) -> Result<(), InvariantViolation> {
    for combatant in state.combatants.values() {
        if combatant.ap.current > combatant.ap.max {
            return Err(InvariantViolation::ApExceedsMax {
                combatant: combatant.id.clone(),
                current: combatant.ap.current,
                max: combatant.ap.max,
            });
        }
        if combatant.hp > combatant.max_hp {
            return Err(InvariantViolation::HpExceedsMax {
                combatant: combatant.id.clone(),
                current: combatant.hp,
                max: combatant.max_hp,
            });
        }
        if let Some(expired) = combatant.conditions.iter().find(|c| !c.is_active()) {
            return Err(InvariantViolation::ExpiredConditionRetained {
                combatant: combatant.id.clone(),
                condition: expired.kind,
            });
        }
    }

    if let Some(unknown) = state
        .round
        .order
        .iter()
        .find(|id| !state.combatants.contains_key(*id))
    {
        return Err(InvariantViolation::UnknownInInitiative {
            combatant: unknown.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::condition::{Condition, ConditionKind};
    use std::collections::BTreeMap;

    fn state_with(combatant: Combatant) -> EncounterState {
        let mut combatants = BTreeMap::new();
        combatants.insert(combatant.id.clone(), combatant);
        EncounterState::new(combatants)
    }

    #[test]
    fn test_fresh_state_is_consistent() {
        let state = state_with(Combatant::new("fighter", 1));
        assert!(check(&state).is_ok());
    }

    #[test]
    fn test_hp_above_max() {
        let mut fighter = Combatant::new("fighter", 1).with_hp(10);
        fighter.hp = 12;
        let err = check(&state_with(fighter)).unwrap_err();
        assert!(matches!(err, InvariantViolation::HpExceedsMax { current: 12, .. }));
    }

    #[test]
    fn test_expired_condition_retained() {
        let mut fighter = Combatant::new("fighter", 1);
        fighter.conditions.apply(Condition::new(ConditionKind::Prone, 1));
        if let Some(prone) = fighter.conditions.get_mut(ConditionKind::Prone) {
            prone.remaining = 0;
        }
        let err = check(&state_with(fighter)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::ExpiredConditionRetained {
                combatant: "fighter".into(),
                condition: ConditionKind::Prone,
            }
        );
    }

    #[test]
    fn test_unknown_in_initiative() {
        let mut state = state_with(Combatant::new("fighter", 1));
        state.round.order = vec!["fighter".into(), "ghost".into()];
        assert!(matches!(
            check(&state),
            Err(InvariantViolation::UnknownInInitiative { .. })
        ));
    }
}
