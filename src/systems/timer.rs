use bevy_ecs::prelude::*;
use bevy_utils::tracing::debug;

use crate::simulation::autocomplete;
use crate::simulation::board::AnswerBoard;
use crate::simulation::time::QuizClock;

/// System: fires deferred suggestion hides whose deadline has passed.
pub fn suggestion_timer_system(clock: Res<QuizClock>, mut board: ResMut<AnswerBoard>) {
    for (slot, field) in board.fields.iter_mut().enumerate() {
        if autocomplete::tick(field, clock.now_ms) {
            debug!("hid suggestions for field {} at {}ms", slot, clock.now_ms);
        }
    }
}
