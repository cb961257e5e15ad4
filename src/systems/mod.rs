pub mod input;
pub mod round;
pub mod timer;

use bevy_ecs::prelude::*;

use crate::core::world::{IntentQueue, QuizEventLog, QuizIntent, QuizRng};
use crate::data::settings::QuizSettings;
use crate::simulation::autocomplete::SuggestionIndex;
use crate::simulation::board::AnswerBoard;
use crate::simulation::catalog::CountryCatalog;
use crate::simulation::round::RoundEngine;
use crate::simulation::time::QuizClock;

use input::{apply_field_intent, sync_board};
use round::apply_round_intent;

/// System: applies the queued intents in submission order. The answer board
/// is re-laid after every round-level intent so later field intents in the
/// same batch land on the current round.
#[allow(clippy::too_many_arguments)]
pub fn intent_system(
    intents: Res<IntentQueue>,
    catalog: Res<CountryCatalog>,
    index: Res<SuggestionIndex>,
    settings: Res<QuizSettings>,
    clock: Res<QuizClock>,
    mut rng: ResMut<QuizRng>,
    mut engine: ResMut<RoundEngine>,
    mut board: ResMut<AnswerBoard>,
    mut log: ResMut<QuizEventLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            QuizIntent::StartRound
            | QuizIntent::AdvanceRound
            | QuizIntent::SkipRound
            | QuizIntent::RestartGame => {
                apply_round_intent(
                    intent,
                    &catalog,
                    &settings,
                    &mut rng.0,
                    &mut engine,
                    &mut log,
                );
                sync_board(&engine, &mut board);
            }
            QuizIntent::TextChanged { .. }
            | QuizIntent::Commit { .. }
            | QuizIntent::FocusLost { .. } => {
                apply_field_intent(
                    intent,
                    &index,
                    &settings,
                    clock.now_ms,
                    &mut engine,
                    &mut board,
                    &mut log,
                );
            }
        }
    }
}

/// System: drops the intents consumed this tick.
pub fn clear_intents_system(mut intents: ResMut<IntentQueue>) {
    intents.0.clear();
}

#[cfg(test)]
mod tests {
    use bevy_ecs::system::RunSystemOnce;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::simulation::catalog::{Cluster, CountryRecord};
    use crate::simulation::round::RoundPhase;

    fn world(intents: Vec<QuizIntent>) -> World {
        let catalog = CountryCatalog::new(vec![Cluster::new(
            Some("maps/baltics.png"),
            vec![
                CountryRecord::new("Estonia"),
                CountryRecord::new("Latvia"),
                CountryRecord::new("Lithuania"),
            ],
        )]);
        let mut world = World::new();
        world.insert_resource(SuggestionIndex::from_catalog(&catalog));
        world.insert_resource(catalog);
        world.insert_resource(QuizSettings {
            min_countries_per_round: 2,
            max_countries_per_round: 2,
            ..QuizSettings::default()
        });
        world.insert_resource(QuizClock::default());
        world.insert_resource(QuizRng(StdRng::seed_from_u64(9)));
        world.insert_resource(RoundEngine::default());
        world.insert_resource(AnswerBoard::default());
        world.insert_resource(QuizEventLog::default());
        world.insert_resource(IntentQueue(intents));
        world
    }

    fn targets(world: &World) -> Vec<String> {
        world
            .resource::<RoundEngine>()
            .current()
            .unwrap()
            .targets
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    #[test]
    fn a_fresh_round_gets_its_fields_before_later_intents() {
        let mut world = world(vec![
            QuizIntent::StartRound,
            QuizIntent::TextChanged {
                slot: 1,
                text: "la".to_string(),
            },
        ]);
        world.run_system_once(intent_system);

        let board = world.resource::<AnswerBoard>();
        assert_eq!(board.fields.len(), 2);
        assert_eq!(board.fields[1].suggestions, vec!["Latvia".to_string()]);
    }

    #[test]
    fn commits_then_advance_apply_in_order() {
        let mut world = world(vec![QuizIntent::StartRound]);
        world.run_system_once(intent_system);
        let names = targets(&world);

        world.resource_mut::<IntentQueue>().0 = vec![
            QuizIntent::Commit {
                slot: 0,
                selection: names[0].clone(),
            },
            QuizIntent::Commit {
                slot: 1,
                selection: names[1].clone(),
            },
            QuizIntent::AdvanceRound,
        ];
        world.run_system_once(intent_system);

        let engine = world.resource::<RoundEngine>();
        assert_eq!(engine.round_number(), 2);
        assert_eq!(engine.phase(), RoundPhase::Active);
        assert_eq!(engine.total_correct(), 2);
        assert!(world
            .resource::<AnswerBoard>()
            .fields
            .iter()
            .all(|f| f.text.is_empty()));
    }
}
