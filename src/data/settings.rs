use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::catalog::DataError;

/// Tunables for round size, game length and the suggestion panel.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    pub min_countries_per_round: usize,
    pub max_countries_per_round: usize,
    pub max_rounds: u32,
    pub max_attempts: u32,
    pub max_suggestions: usize,
    pub hide_delay_ms: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            min_countries_per_round: 2,
            max_countries_per_round: 5,
            max_rounds: 10,
            max_attempts: 3,
            max_suggestions: 5,
            hide_delay_ms: 200,
        }
    }
}

impl QuizSettings {
    /// Clamp values into a playable range: at least one country, attempt and
    /// round, and a maximum that never undercuts the minimum.
    pub fn normalized(mut self) -> Self {
        self.min_countries_per_round = self.min_countries_per_round.max(1);
        self.max_countries_per_round = self
            .max_countries_per_round
            .max(self.min_countries_per_round);
        self.max_rounds = self.max_rounds.max(1);
        self.max_attempts = self.max_attempts.max(1);
        self.max_suggestions = self.max_suggestions.max(1);
        self
    }
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<QuizSettings, DataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let settings: QuizSettings =
        serde_json::from_str(&raw).map_err(|source| DataError::Json {
            path: path.display().to_string(),
            source,
        })?;
    Ok(settings.normalized())
}
