//! Read-only projection of a session

use super::state::{EncounterPhase, EncounterState};
use crate::combatant::Combatant;
use crate::error::InvariantViolation;
use crate::reaction::ReactionWindow;
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStateSnapshot {
    /// Increments with every committed mutation
    pub revision: u64,
    pub phase: EncounterPhase,
    pub round: u32,
    pub order: Vec<CombatantId>,
    pub current_actor: Option<CombatantId>,
    /// In initiative order once rolled, otherwise by id
    pub combatants: Vec<Combatant>,
    pub window: Option<ReactionWindow>,
    #[serde(default)]
    pub fault: Option<InvariantViolation>,
}

impl CombatStateSnapshot {
    pub(crate) fn capture(
        state: &EncounterState,
        revision: u64,
        fault: Option<InvariantViolation>,
    ) -> Self {
        let combatants = if state.round.order.is_empty() {
            state.combatants.values().cloned().collect()
        } else {
            state
                .round
                .order
                .iter()
                .filter_map(|id| state.combatants.get(id))
                .cloned()
                .collect()
        };

        CombatStateSnapshot {
            revision,
            phase: state.phase,
            round: state.round.round,
            order: state.round.order.clone(),
            current_actor: state.next_actor(),
            combatants,
            window: state.window.clone(),
            fault,
        }
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| &c.id == id)
    }
}
