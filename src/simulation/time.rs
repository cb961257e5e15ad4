use bevy_ecs::prelude::*;

/// Logical clock driving deferred UI work. Advanced by the host each tick so
/// timing stays deterministic under test.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizClock {
    pub tick: u64,
    pub now_ms: u64,
    pub pending_elapsed_ms: u64,
}

impl QuizClock {
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.tick += 1;
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
    }
}

/// System: Advances the clock by whatever the host reported for this tick.
pub fn advance_clock_system(mut clock: ResMut<QuizClock>) {
    let elapsed = std::mem::take(&mut clock.pending_elapsed_ms);
    clock.advance(elapsed);
}
