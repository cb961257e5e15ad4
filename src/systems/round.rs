use bevy_utils::tracing::{debug, error, warn};
use rand::Rng;

use crate::core::world::{QuizEventLog, QuizIntent};
use crate::data::settings::QuizSettings;
use crate::simulation::catalog::CountryCatalog;
use crate::simulation::round::{RoundEngine, RoundError, RoundPhase};

/// Applies one round-level intent (start, advance, skip, restart). Field
/// intents are ignored here.
pub fn apply_round_intent<R: Rng>(
    intent: &QuizIntent,
    catalog: &CountryCatalog,
    settings: &QuizSettings,
    rng: &mut R,
    engine: &mut RoundEngine,
    log: &mut QuizEventLog,
) {
    let result = match intent {
        QuizIntent::StartRound => {
            if engine.phase() != RoundPhase::Idle {
                debug!("start ignored: round {} already drawn", engine.round_number());
                return;
            }
            engine.start_round(catalog, settings, rng)
        }
        QuizIntent::AdvanceRound => engine.advance_round(catalog, settings, rng),
        QuizIntent::SkipRound => engine.skip_round(catalog, settings, rng),
        QuizIntent::RestartGame => {
            log.0.push("Game restarted.".to_string());
            engine.restart_game(catalog, settings, rng)
        }
        _ => return,
    };

    match result {
        Ok(phase) => log.0.push(describe_phase(engine, phase)),
        Err(err) => {
            match err {
                RoundError::EmptyCatalog | RoundError::NoPlayableCluster => {
                    error!("cannot start round: {}", err)
                }
                RoundError::NoActiveRound | RoundError::GameOver | RoundError::RoundNotComplete => {
                    warn!("round intent {:?} refused: {}", intent, err)
                }
            }
            log.0.push(format!("Cannot continue: {}.", err));
        }
    }
}

fn describe_phase(engine: &RoundEngine, phase: RoundPhase) -> String {
    match phase {
        RoundPhase::Active => {
            let targets = engine.current().map_or(0, |state| state.target_count());
            format!(
                "Round {} started: name {} countries.",
                engine.round_number(),
                targets
            )
        }
        RoundPhase::Inconsistent => format!(
            "Round {} cannot be played: the map has too few answer slots. Skip to continue.",
            engine.round_number()
        ),
        RoundPhase::GameOver(_) => engine
            .status_message()
            .unwrap_or("Game over.")
            .to_string(),
        RoundPhase::Idle | RoundPhase::Complete => format!("Round {}.", engine.round_number()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::catalog::{Cluster, CountryRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> CountryCatalog {
        CountryCatalog::new(vec![Cluster::new(
            Some("maps/benelux.png"),
            vec![
                CountryRecord::new("Belgium"),
                CountryRecord::new("Netherlands"),
                CountryRecord::new("Luxembourg"),
            ],
        )])
    }

    fn apply_all(catalog: &CountryCatalog, intents: &[QuizIntent]) -> (RoundEngine, QuizEventLog) {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut engine = RoundEngine::default();
        let mut log = QuizEventLog::default();
        for intent in intents {
            apply_round_intent(intent, catalog, &settings, &mut rng, &mut engine, &mut log);
        }
        (engine, log)
    }

    #[test]
    fn start_intent_draws_the_first_round_once() {
        let (engine, log) = apply_all(
            &catalog(),
            &[QuizIntent::StartRound, QuizIntent::StartRound],
        );

        assert_eq!(engine.phase(), RoundPhase::Active);
        assert_eq!(engine.serial(), 1);
        assert_eq!(log.0.len(), 1);
    }

    #[test]
    fn empty_catalog_reports_instead_of_starting() {
        let (engine, log) = apply_all(&CountryCatalog::default(), &[QuizIntent::StartRound]);

        assert_eq!(engine.phase(), RoundPhase::Idle);
        assert!(log.0[0].contains("no country data available"));
    }

    #[test]
    fn advance_before_completion_is_refused() {
        let (engine, log) = apply_all(
            &catalog(),
            &[QuizIntent::StartRound, QuizIntent::AdvanceRound],
        );

        assert_eq!(engine.round_number(), 1);
        assert!(log.0[1].contains("not complete"));
    }

    #[test]
    fn skip_without_a_round_is_refused() {
        let (engine, log) = apply_all(
            &CountryCatalog::default(),
            &[
                QuizIntent::StartRound,
                QuizIntent::SkipRound,
                QuizIntent::SkipRound,
            ],
        );

        assert_eq!(engine.round_number(), 1);
        assert!(log.0[2].contains("no round in progress"));
    }

    #[test]
    fn field_intents_are_left_alone() {
        let (engine, log) = apply_all(&catalog(), &[QuizIntent::FocusLost { slot: 0 }]);

        assert_eq!(engine.phase(), RoundPhase::Idle);
        assert!(log.0.is_empty());
    }
}
