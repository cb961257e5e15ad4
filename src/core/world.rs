use bevy_ecs::prelude::*;
use rand::rngs::StdRng;

use crate::core::ecs::{create_schedule, create_world};
use crate::data::settings::QuizSettings;
use crate::simulation::autocomplete::{FieldFeedback, Rgba, SuggestionIndex};
use crate::simulation::board::AnswerBoard;
use crate::simulation::catalog::{AssetRef, CountryCatalog, CountryRecord};
use crate::simulation::round::{RoundEngine, RoundPhase};
use crate::simulation::time::QuizClock;

/// Input-surface events fed into the ECS each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizIntent {
    TextChanged { slot: usize, text: String },
    Commit { slot: usize, selection: String },
    FocusLost { slot: usize },
    StartRound,
    AdvanceRound,
    SkipRound,
    RestartGame,
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct IntentQueue(pub Vec<QuizIntent>);

/// Player-facing messages produced during the last tick.
#[derive(Resource, Default, Debug)]
pub struct QuizEventLog(pub Vec<String>);

/// Seeded generator behind cluster and country draws.
#[derive(Resource, Debug)]
pub struct QuizRng(pub StdRng);

/// What the presentation layer needs to draw one answer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub slot: Option<AssetRef>,
    pub text: String,
    pub feedback: FieldFeedback,
    pub color: Rgba,
    pub suggestions: Vec<String>,
    pub flag: Option<AssetRef>,
}

/// Data snapshot returned to the UI layer after each tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub round_label: String,
    pub phase: RoundPhase,
    pub map_image: Option<AssetRef>,
    pub chances_left: String,
    pub score: u32,
    pub can_advance: bool,
    pub status: Option<String>,
    pub game_over_text: Option<String>,
    pub fields: Vec<FieldView>,
    pub events: Vec<String>,
    pub now_ms: u64,
}

/// Wrapper around the ECS world and schedule.
pub struct Game {
    world: World,
    schedule: Schedule,
    seed: u64,
}

impl Game {
    /// Build the session and start round 1.
    pub fn new(settings: QuizSettings, catalog: CountryCatalog, seed: u64) -> Self {
        let world = create_world(settings, catalog, seed);
        let schedule = create_schedule();
        let mut game = Self {
            world,
            schedule,
            seed,
        };
        game.tick(vec![QuizIntent::StartRound], 0);
        game
    }

    /// Run one tick with the provided intents and `elapsed_ms` of wall time,
    /// returning a snapshot for rendering.
    pub fn tick(&mut self, intents: Vec<QuizIntent>, elapsed_ms: u64) -> Snapshot {
        self.world.resource_mut::<IntentQueue>().0 = intents;
        self.world.resource_mut::<QuizEventLog>().0.clear();
        self.world.resource_mut::<QuizClock>().pending_elapsed_ms = elapsed_ms;

        self.schedule.run(&mut self.world);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world)
    }

    pub fn round(&self) -> &RoundEngine {
        self.world.resource::<RoundEngine>()
    }

    pub fn board(&self) -> &AnswerBoard {
        self.world.resource::<AnswerBoard>()
    }

    pub fn catalog(&self) -> &CountryCatalog {
        self.world.resource::<CountryCatalog>()
    }

    pub fn settings(&self) -> &QuizSettings {
        self.world.resource::<QuizSettings>()
    }

    /// Suggestion lookup outside the tick loop, e.g. for a preview.
    pub fn suggest(&self, prefix: &str) -> Vec<CountryRecord> {
        let max = self.settings().max_suggestions;
        self.world
            .resource::<SuggestionIndex>()
            .suggest(prefix, max)
            .cloned()
            .collect()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Snapshot {
    fn capture(world: &World) -> Self {
        let engine = world.resource::<RoundEngine>();
        let settings = world.resource::<QuizSettings>();
        let board = world.resource::<AnswerBoard>();
        let clock = world.resource::<QuizClock>();

        let map_image = engine
            .current()
            .and_then(|state| state.cluster.map_image.clone());

        let message = engine.status_message().map(str::to_string);
        let (status, game_over_text) = if engine.is_game_over() {
            (None, message)
        } else {
            (message, None)
        };

        let fields = board
            .fields
            .iter()
            .map(|field| FieldView {
                slot: field.slot.clone(),
                text: field.text.clone(),
                feedback: field.feedback,
                color: field.feedback.color(),
                suggestions: field.suggestions.clone(),
                flag: field.flag.clone(),
            })
            .collect();

        let events = world
            .get_resource::<QuizEventLog>()
            .map(|log| log.0.clone())
            .unwrap_or_default();

        Snapshot {
            round_label: engine.round_label(settings),
            phase: engine.phase(),
            map_image,
            chances_left: format!("Chance Left: {}", engine.attempts_remaining(settings)),
            score: engine.total_correct(),
            can_advance: engine.can_advance(),
            status,
            game_over_text,
            fields,
            events,
            now_ms: clock.now_ms,
        }
    }
}
