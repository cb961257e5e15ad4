use bevy_ecs::prelude::*;

use crate::simulation::autocomplete::AnswerField;
use crate::simulation::round::RoundEngine;

/// One input field per answer slot of the current round.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnswerBoard {
    pub round_serial: u64,
    pub fields: Vec<AnswerField>,
}

impl AnswerBoard {
    pub fn is_stale(&self, engine: &RoundEngine) -> bool {
        self.round_serial != engine.serial()
    }

    /// Throw away the old fields and lay out fresh ones for the engine's round.
    pub fn rebuild(&mut self, engine: &RoundEngine) {
        self.round_serial = engine.serial();
        self.fields = engine
            .current()
            .map(|state| {
                (0..state.target_count())
                    .map(|i| AnswerField::new(state.slots.get(i).cloned()))
                    .collect()
            })
            .unwrap_or_default();
    }

    pub fn field(&self, slot: usize) -> Option<&AnswerField> {
        self.fields.get(slot)
    }

    pub fn field_mut(&mut self, slot: usize) -> Option<&mut AnswerField> {
        self.fields.get_mut(slot)
    }
}
