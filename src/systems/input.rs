use bevy_utils::tracing::{debug, warn};

use crate::core::world::{QuizEventLog, QuizIntent};
use crate::data::settings::QuizSettings;
use crate::simulation::autocomplete::{self, CommitOutcome, SuggestionIndex};
use crate::simulation::board::AnswerBoard;
use crate::simulation::round::{GuessOutcome, RejectReason, RoundEngine};

/// Lays out fresh answer fields when the engine has moved to a new round.
pub fn sync_board(engine: &RoundEngine, board: &mut AnswerBoard) {
    if board.is_stale(engine) {
        board.rebuild(engine);
        debug!(
            "answer board rebuilt with {} fields for round {}",
            board.fields.len(),
            engine.round_number()
        );
    }
}

/// Routes one field-level intent through the autocomplete handlers.
pub fn apply_field_intent(
    intent: &QuizIntent,
    index: &SuggestionIndex,
    settings: &QuizSettings,
    now_ms: u64,
    engine: &mut RoundEngine,
    board: &mut AnswerBoard,
    log: &mut QuizEventLog,
) {
    let slot = match intent {
        QuizIntent::TextChanged { slot, .. }
        | QuizIntent::Commit { slot, .. }
        | QuizIntent::FocusLost { slot } => *slot,
        _ => return,
    };

    if engine.is_game_over() && !matches!(intent, QuizIntent::FocusLost { .. }) {
        debug!("input on field {} ignored: game is over", slot);
        return;
    }

    let Some(field) = board.field_mut(slot) else {
        warn!("no answer field at index {}", slot);
        return;
    };

    match intent {
        QuizIntent::TextChanged { text, .. } => {
            autocomplete::text_changed(field, index, text, settings.max_suggestions);
        }
        QuizIntent::Commit { selection, .. } => {
            let outcome = autocomplete::commit(field, index, engine, settings, selection);
            if let Some(line) = describe_commit(selection.trim(), outcome, engine) {
                log.0.push(line);
            }
        }
        QuizIntent::FocusLost { .. } => {
            autocomplete::focus_lost(field, now_ms, settings.hide_delay_ms);
        }
        _ => {}
    }
}

fn describe_commit(guess: &str, outcome: CommitOutcome, engine: &RoundEngine) -> Option<String> {
    let CommitOutcome::Validated(outcome) = outcome else {
        return None;
    };
    let line = match outcome {
        GuessOutcome::Correct { round_complete } => {
            if round_complete {
                format!("Correct: {}. Round {} complete!", guess, engine.round_number())
            } else {
                format!("Correct: {}.", guess)
            }
        }
        GuessOutcome::AlreadyFound => format!("{} was already found.", guess),
        GuessOutcome::Incorrect {
            attempts_remaining,
            game_over,
        } => {
            if game_over {
                engine.status_message().unwrap_or("GAME OVER!").to_string()
            } else {
                format!("Incorrect: {}. Chance Left: {}", guess, attempts_remaining)
            }
        }
        GuessOutcome::Rejected(reason) => match reason {
            RejectReason::NoActiveRound => "No round in progress.".to_string(),
            RejectReason::RoundComplete => "Round already complete.".to_string(),
            RejectReason::GameOver => "Game is over.".to_string(),
            RejectReason::SlotMismatch => "This round cannot be answered; skip it.".to_string(),
        },
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::simulation::autocomplete::FieldFeedback;
    use crate::simulation::catalog::{Cluster, CountryCatalog, CountryRecord};

    struct Desk {
        index: SuggestionIndex,
        settings: QuizSettings,
        engine: RoundEngine,
        board: AnswerBoard,
        log: QuizEventLog,
    }

    impl Desk {
        fn new() -> Self {
            let catalog = CountryCatalog::new(vec![
                Cluster::new(
                    Some("maps/iberia.png"),
                    vec![CountryRecord::new("Spain"), CountryRecord::new("Portugal")],
                ),
                Cluster::new(Some("maps/chad.png"), vec![CountryRecord::new("Chad")]),
            ]);
            let settings = QuizSettings {
                min_countries_per_round: 2,
                max_countries_per_round: 2,
                ..QuizSettings::default()
            };
            let mut engine = RoundEngine::default();
            let mut rng = StdRng::seed_from_u64(11);
            // Chad alone can never satisfy a two-country draw, so retry until Iberia comes up.
            while engine.current().map_or(true, |s| s.target_count() != 2) {
                engine = RoundEngine::default();
                engine.start_round(&catalog, &settings, &mut rng).unwrap();
            }

            let mut board = AnswerBoard::default();
            sync_board(&engine, &mut board);
            Self {
                index: SuggestionIndex::from_catalog(&catalog),
                settings,
                engine,
                board,
                log: QuizEventLog::default(),
            }
        }

        fn apply(&mut self, intents: &[QuizIntent]) {
            for intent in intents {
                apply_field_intent(
                    intent,
                    &self.index,
                    &self.settings,
                    0,
                    &mut self.engine,
                    &mut self.board,
                    &mut self.log,
                );
            }
        }
    }

    fn commit(slot: usize, name: &str) -> QuizIntent {
        QuizIntent::Commit {
            slot,
            selection: name.to_string(),
        }
    }

    #[test]
    fn sync_lays_out_one_field_per_target() {
        let desk = Desk::new();
        assert_eq!(desk.board.fields.len(), 2);
        assert!(!desk.board.is_stale(&desk.engine));
    }

    #[test]
    fn commits_update_field_colour_and_log() {
        let mut desk = Desk::new();
        desk.apply(&[
            QuizIntent::TextChanged {
                slot: 0,
                text: "Spa".to_string(),
            },
            commit(0, "Spain"),
            commit(1, "Chad"),
        ]);

        assert_eq!(desk.board.fields[0].feedback, FieldFeedback::Correct);
        assert_eq!(desk.board.fields[1].feedback, FieldFeedback::Incorrect);
        assert_eq!(desk.engine.total_correct(), 1);
        assert_eq!(desk.engine.attempts_used(), 1);
        assert_eq!(desk.log.0[0], "Correct: Spain.");
        assert_eq!(desk.log.0[1], "Incorrect: Chad. Chance Left: 2");
    }

    #[test]
    fn unknown_field_indices_are_ignored() {
        let mut desk = Desk::new();
        desk.apply(&[commit(9, "Spain")]);

        assert_eq!(desk.engine.total_correct(), 0);
        assert!(desk.log.0.is_empty());
    }

    #[test]
    fn partial_text_commits_are_silent() {
        let mut desk = Desk::new();
        desk.apply(&[commit(0, "Spa")]);

        assert_eq!(desk.engine.attempts_used(), 0);
        assert!(desk.log.0.is_empty());
    }

    #[test]
    fn round_intents_are_left_alone() {
        let mut desk = Desk::new();
        desk.apply(&[QuizIntent::SkipRound]);

        assert_eq!(desk.engine.round_number(), 1);
        assert!(desk.log.0.is_empty());
    }
}
