use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;
use bevy_utils::tracing::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::world::{IntentQueue, QuizEventLog, QuizRng};
use crate::data::settings::QuizSettings;
use crate::simulation::autocomplete::SuggestionIndex;
use crate::simulation::board::AnswerBoard;
use crate::simulation::catalog::CountryCatalog;
use crate::simulation::round::RoundEngine;
use crate::simulation::time::{advance_clock_system, QuizClock};
use crate::systems::timer::suggestion_timer_system;
use crate::systems::{clear_intents_system, intent_system};

/// Canonical tick ordering.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Simulation,
    Time,
    Cleanup,
}

/// Build the ECS world with the catalog and baseline resources.
pub fn create_world(settings: QuizSettings, catalog: CountryCatalog, seed: u64) -> World {
    if catalog.is_empty() {
        error!("country catalog is empty; no rounds can be played");
    } else {
        info!("loaded catalog: {}", catalog.stats());
    }

    let mut world = World::new();
    world.insert_resource(SuggestionIndex::from_catalog(&catalog));
    world.insert_resource(catalog);
    world.insert_resource(settings.normalized());
    world.insert_resource(RoundEngine::default());
    world.insert_resource(AnswerBoard::default());
    world.insert_resource(QuizRng(StdRng::seed_from_u64(seed)));
    world.insert_resource(IntentQueue::default());
    world.insert_resource(QuizClock::default());
    world.insert_resource(QuizEventLog::default());
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Simulation, TickSet::Time, TickSet::Cleanup).chain());

    schedule.add_systems((
        intent_system.in_set(TickSet::Simulation),
        (advance_clock_system, suggestion_timer_system)
            .chain()
            .in_set(TickSet::Time),
        clear_intents_system.in_set(TickSet::Cleanup),
    ));

    schedule
}
