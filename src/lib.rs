// Re-export core modules for use by the binary or other consumers
pub mod content;
pub mod core;
pub mod data;
pub mod simulation;
pub mod systems;
pub mod ui;

// Expose the main Game wrapper and types needed for interaction
pub use crate::core::world::{FieldView, Game, QuizIntent, Snapshot};
pub use crate::data::settings::QuizSettings;
pub use crate::simulation::catalog::CountryCatalog;
