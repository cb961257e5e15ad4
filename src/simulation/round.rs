use bevy_ecs::prelude::*;
use bevy_utils::tracing::{debug, error, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::settings::QuizSettings;
use crate::simulation::catalog::{name_key, AssetRef, Cluster, CountryCatalog, CountryRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Completed,
    AttemptsExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Active,
    /// The cluster has fewer answer slots than drawn countries; guesses are refused.
    Inconsistent,
    Complete,
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    EmptyCatalog,
    NoPlayableCluster,
    NoActiveRound,
    GameOver,
    RoundNotComplete,
}

impl std::fmt::Display for RoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundError::EmptyCatalog => write!(f, "no country data available"),
            RoundError::NoPlayableCluster => {
                write!(f, "no cluster has both countries and a map image")
            }
            RoundError::NoActiveRound => write!(f, "no round in progress"),
            RoundError::GameOver => write!(f, "game is over"),
            RoundError::RoundNotComplete => write!(f, "current round is not complete"),
        }
    }
}

impl std::error::Error for RoundError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoActiveRound,
    RoundComplete,
    GameOver,
    SlotMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct { round_complete: bool },
    /// Names a target that an earlier guess already found.
    AlreadyFound,
    Incorrect { attempts_remaining: u32, game_over: bool },
    Rejected(RejectReason),
}

/// Everything drawn for the round currently on screen.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub cluster_index: usize,
    pub cluster: Cluster,
    pub targets: Vec<CountryRecord>,
    pub slots: Vec<AssetRef>,
    pub found: Vec<bool>,
    pub correct_this_round: usize,
}

impl RoundState {
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_target(&self, name: &str) -> bool {
        self.target_index(name).is_some()
    }

    fn target_index(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.targets.iter().position(|t| name_key(&t.name) == key)
    }
}

/// Owns the round state machine and the session counters.
#[derive(Resource, Debug, Clone)]
pub struct RoundEngine {
    phase: RoundPhase,
    round_number: u32,
    total_correct: u32,
    attempts_used: u32,
    state: Option<RoundState>,
    serial: u64,
    message: Option<String>,
}

impl Default for RoundEngine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Idle,
            round_number: 1,
            total_correct: 0,
            attempts_used: 0,
            state: None,
            serial: 0,
            message: None,
        }
    }
}

impl RoundEngine {
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn total_correct(&self) -> u32 {
        self.total_correct
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn attempts_remaining(&self, settings: &QuizSettings) -> u32 {
        settings.max_attempts.saturating_sub(self.attempts_used)
    }

    pub fn current(&self) -> Option<&RoundState> {
        self.state.as_ref()
    }

    /// Bumped whenever a new round is drawn, so views know to rebuild.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, RoundPhase::GameOver(_))
    }

    /// The proceed affordance: true from round completion until the next round starts.
    pub fn can_advance(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    pub fn status_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn revealed_answers(&self) -> Vec<&str> {
        self.state
            .as_ref()
            .map(|s| s.targets.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn round_label(&self, settings: &QuizSettings) -> String {
        match self.phase {
            RoundPhase::GameOver(GameOverReason::Completed) => "GAME COMPLETE!".to_string(),
            RoundPhase::Active | RoundPhase::Inconsistent
                if self.attempts_used > 0 && self.attempts_used < settings.max_attempts =>
            {
                format!(
                    "Round - {} (Attempt {}/{})",
                    self.round_number,
                    self.attempts_used + 1,
                    settings.max_attempts
                )
            }
            _ => format!("Round - {}", self.round_number),
        }
    }

    pub fn start_round<R: Rng>(
        &mut self,
        catalog: &CountryCatalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<RoundPhase, RoundError> {
        if self.is_game_over() {
            return Err(RoundError::GameOver);
        }
        if catalog.is_empty() {
            return Err(RoundError::EmptyCatalog);
        }
        if self.round_number > settings.max_rounds {
            info!("all {} rounds completed", settings.max_rounds);
            self.state = None;
            self.phase = RoundPhase::GameOver(GameOverReason::Completed);
            self.message = Some(format!(
                "CONGRATULATIONS!\nYou completed all {} rounds!",
                settings.max_rounds
            ));
            return Ok(self.phase);
        }

        let Some((cluster_index, cluster)) = catalog.random_playable_cluster(rng) else {
            return Err(RoundError::NoPlayableCluster);
        };

        let total = cluster.country_count();
        let low = settings.min_countries_per_round.max(1);
        let high = settings.max_countries_per_round.max(low);
        let count = rng.random_range(low..=high).max(low).min(total);

        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(rng);
        order.truncate(count);
        let targets: Vec<CountryRecord> = order
            .iter()
            .map(|&idx| cluster.countries[idx].clone())
            .collect();
        let slots: Vec<AssetRef> = cluster.answer_slots.iter().take(count).cloned().collect();

        self.phase = if slots.len() < count {
            error!(
                "cluster {} has {} answer slots for {} countries; round cannot be validated",
                cluster_index,
                slots.len(),
                count
            );
            RoundPhase::Inconsistent
        } else {
            RoundPhase::Active
        };

        info!(
            "round {}/{} started with {} countries: {}",
            self.round_number,
            settings.max_rounds,
            count,
            targets
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.state = Some(RoundState {
            cluster_index,
            cluster: cluster.clone(),
            found: vec![false; targets.len()],
            targets,
            slots,
            correct_this_round: 0,
        });
        self.serial += 1;
        self.message = None;
        Ok(self.phase)
    }

    pub fn validate_guess(&mut self, guess: &str, settings: &QuizSettings) -> GuessOutcome {
        match self.phase {
            RoundPhase::Active => {}
            RoundPhase::Idle => return GuessOutcome::Rejected(RejectReason::NoActiveRound),
            RoundPhase::Inconsistent => {
                return GuessOutcome::Rejected(RejectReason::SlotMismatch)
            }
            RoundPhase::Complete => return GuessOutcome::Rejected(RejectReason::RoundComplete),
            RoundPhase::GameOver(_) => return GuessOutcome::Rejected(RejectReason::GameOver),
        }
        let Some(state) = self.state.as_mut() else {
            return GuessOutcome::Rejected(RejectReason::NoActiveRound);
        };

        let guess = guess.trim();
        match state.target_index(guess) {
            Some(idx) if state.found[idx] => {
                debug!("'{}' was already found this round", guess);
                GuessOutcome::AlreadyFound
            }
            Some(idx) => {
                state.found[idx] = true;
                state.correct_this_round += 1;
                self.total_correct += 1;
                let round_complete = state.correct_this_round == state.targets.len();
                info!("correct: '{}' is valid for this round", guess);
                if round_complete {
                    self.phase = RoundPhase::Complete;
                    self.message = Some(format!(
                        "Round {} complete! Proceed to the next round.",
                        self.round_number
                    ));
                }
                GuessOutcome::Correct { round_complete }
            }
            None => {
                self.attempts_used += 1;
                let attempts_remaining = settings.max_attempts.saturating_sub(self.attempts_used);
                info!(
                    "incorrect: '{}' (attempt {}/{})",
                    guess, self.attempts_used, settings.max_attempts
                );
                let game_over = attempts_remaining == 0;
                if game_over {
                    let answers = state
                        .targets
                        .iter()
                        .map(|t| t.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    error!(
                        "game over: failed {} times in round {}",
                        settings.max_attempts, self.round_number
                    );
                    self.phase = RoundPhase::GameOver(GameOverReason::AttemptsExhausted);
                    self.message = Some(format!(
                        "GAME OVER!\nFailed {} times in Round {}\n\nCorrect answers were:\n{}",
                        settings.max_attempts, self.round_number, answers
                    ));
                }
                GuessOutcome::Incorrect {
                    attempts_remaining,
                    game_over,
                }
            }
        }
    }

    pub fn advance_round<R: Rng>(
        &mut self,
        catalog: &CountryCatalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<RoundPhase, RoundError> {
        match self.phase {
            RoundPhase::Complete => {}
            RoundPhase::GameOver(_) => return Err(RoundError::GameOver),
            _ => return Err(RoundError::RoundNotComplete),
        }
        self.next_round(catalog, settings, rng)
    }

    /// Move on without scoring the current round.
    pub fn skip_round<R: Rng>(
        &mut self,
        catalog: &CountryCatalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<RoundPhase, RoundError> {
        match self.phase {
            RoundPhase::Active | RoundPhase::Inconsistent | RoundPhase::Complete => {}
            RoundPhase::Idle => return Err(RoundError::NoActiveRound),
            RoundPhase::GameOver(_) => return Err(RoundError::GameOver),
        }
        self.next_round(catalog, settings, rng)
    }

    pub fn restart_game<R: Rng>(
        &mut self,
        catalog: &CountryCatalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<RoundPhase, RoundError> {
        *self = Self {
            serial: self.serial + 1,
            ..Self::default()
        };
        self.start_round(catalog, settings, rng)
    }

    fn next_round<R: Rng>(
        &mut self,
        catalog: &CountryCatalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<RoundPhase, RoundError> {
        self.round_number += 1;
        self.state = None;
        self.phase = RoundPhase::Idle;
        self.serial += 1;
        self.start_round(catalog, settings, rng)
    }
}
