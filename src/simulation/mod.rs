pub mod autocomplete;
pub mod board;
pub mod catalog;
pub mod round;
pub mod time;

pub use autocomplete::{
    commit, focus_lost, text_changed, AnswerField, CommitOutcome, FieldFeedback, Rgba,
    SuggestionIndex, Suggestions,
};
pub use board::AnswerBoard;
pub use catalog::{AssetRef, CatalogStats, Cluster, CountryCatalog, CountryRecord};
pub use round::{
    GameOverReason, GuessOutcome, RejectReason, RoundEngine, RoundError, RoundPhase, RoundState,
};
pub use time::QuizClock;
