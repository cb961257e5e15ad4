use bevy_ecs::prelude::*;
use bevy_utils::tracing::debug;

use crate::data::settings::QuizSettings;
use crate::simulation::catalog::{name_key, AssetRef, CountryCatalog, CountryRecord};
use crate::simulation::round::{GuessOutcome, RoundEngine};

/// RGBA colour handed to the presentation layer for field highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

pub const NEUTRAL_COLOR: Rgba = Rgba(255, 255, 255, 255);
pub const CORRECT_COLOR: Rgba = Rgba(179, 255, 179, 255);
pub const INCORRECT_COLOR: Rgba = Rgba(253, 104, 104, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldFeedback {
    #[default]
    Neutral,
    Correct,
    Incorrect,
}

impl FieldFeedback {
    pub fn color(self) -> Rgba {
        match self {
            FieldFeedback::Neutral => NEUTRAL_COLOR,
            FieldFeedback::Correct => CORRECT_COLOR,
            FieldFeedback::Incorrect => INCORRECT_COLOR,
        }
    }
}

/// Catalog names sorted for prefix lookup.
#[derive(Resource, Debug, Clone, Default)]
pub struct SuggestionIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    key: String,
    record: CountryRecord,
}

impl SuggestionIndex {
    pub fn from_catalog(catalog: &CountryCatalog) -> Self {
        let mut entries: Vec<IndexEntry> = catalog
            .unique_countries()
            .iter()
            .map(|record| IndexEntry {
                key: name_key(&record.name),
                record: record.clone(),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| a.record.name.cmp(&b.record.name))
        });
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive prefix matches in ascending order, at most `max` of them.
    /// A blank prefix matches nothing.
    pub fn suggest(&self, prefix: &str, max: usize) -> Suggestions<'_> {
        let needle = prefix.trim_start().to_lowercase();
        let limit = if needle.trim().is_empty() { 0 } else { max };
        Suggestions {
            entries: &self.entries,
            needle,
            pos: 0,
            remaining: limit,
        }
    }

    /// The entry whose full name equals `selection`, ignoring case and
    /// surrounding whitespace.
    pub fn resolve(&self, selection: &str) -> Option<&CountryRecord> {
        let key = name_key(selection);
        if key.is_empty() {
            return None;
        }
        self.entries
            .binary_search_by(|e| e.key.as_str().cmp(key.as_str()))
            .ok()
            .map(|idx| &self.entries[idx].record)
    }
}

/// Lazy, restartable walk over the matches for one prefix. Clone it to
/// iterate again from the start.
#[derive(Debug, Clone)]
pub struct Suggestions<'a> {
    entries: &'a [IndexEntry],
    needle: String,
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for Suggestions<'a> {
    type Item = &'a CountryRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(entry) = self.entries.get(self.pos) {
            self.pos += 1;
            if entry.key.starts_with(&self.needle) {
                self.remaining -= 1;
                return Some(&entry.record);
            }
        }
        self.remaining = 0;
        None
    }
}

/// Input state for one answer slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerField {
    pub slot: Option<AssetRef>,
    pub text: String,
    pub feedback: FieldFeedback,
    pub last_validated: Option<String>,
    last_feedback: FieldFeedback,
    pub suggestions: Vec<String>,
    pub pending_hide_at_ms: Option<u64>,
    pub flag: Option<AssetRef>,
}

impl AnswerField {
    pub fn new(slot: Option<AssetRef>) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    pub fn suggestions_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.pending_hide_at_ms = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The selection is not a full catalog name; nothing was validated.
    NotInCatalog,
    /// Same value as the previous commit on this field; no side effects.
    Duplicate,
    Validated(GuessOutcome),
}

/// Keystroke handler: feedback goes back to neutral and the suggestion list
/// is recomputed from the new text.
pub fn text_changed(
    field: &mut AnswerField,
    index: &SuggestionIndex,
    text: &str,
    max_suggestions: usize,
) {
    field.text = text.to_string();
    field.feedback = FieldFeedback::Neutral;
    field.pending_hide_at_ms = None;

    if text.trim().is_empty() {
        field.last_validated = None;
        field.last_feedback = FieldFeedback::Neutral;
        field.suggestions.clear();
        field.flag = None;
        return;
    }

    field.suggestions = index
        .suggest(text, max_suggestions)
        .map(|record| record.name.clone())
        .collect();
    field.flag = index.resolve(text).and_then(|record| record.flag.clone());
    debug!(
        "input '{}' - found {} matches",
        text,
        field.suggestions.len()
    );
}

/// Finalise a guess for this field, typically from a suggestion click.
pub fn commit(
    field: &mut AnswerField,
    index: &SuggestionIndex,
    engine: &mut RoundEngine,
    settings: &QuizSettings,
    selection: &str,
) -> CommitOutcome {
    field.text = selection.to_string();
    field.hide_suggestions();

    let Some(record) = index.resolve(selection) else {
        debug!("skipping validation: '{}' is not a complete country name", selection.trim());
        return CommitOutcome::NotInCatalog;
    };
    field.flag = record.flag.clone();

    let trimmed = selection.trim();
    if field
        .last_validated
        .as_deref()
        .is_some_and(|last| name_key(last) == name_key(trimmed))
    {
        debug!("skipping validation: '{}' already validated", trimmed);
        field.feedback = field.last_feedback;
        return CommitOutcome::Duplicate;
    }

    let outcome = engine.validate_guess(trimmed, settings);
    field.feedback = match outcome {
        GuessOutcome::Correct { .. } | GuessOutcome::AlreadyFound => FieldFeedback::Correct,
        GuessOutcome::Incorrect { .. } => FieldFeedback::Incorrect,
        GuessOutcome::Rejected(_) => FieldFeedback::Neutral,
    };
    if !matches!(outcome, GuessOutcome::Rejected(_)) {
        field.last_validated = Some(trimmed.to_string());
        field.last_feedback = field.feedback;
    }
    CommitOutcome::Validated(outcome)
}

/// Defer hiding so a pointer selection landing just after focus loss still
/// finds its suggestion.
pub fn focus_lost(field: &mut AnswerField, now_ms: u64, delay_ms: u64) {
    if field.suggestions_visible() {
        field.pending_hide_at_ms = Some(now_ms.saturating_add(delay_ms));
    }
}

/// Fire the deferred hide once its deadline has passed. Returns true when
/// the panel was hidden.
pub fn tick(field: &mut AnswerField, now_ms: u64) -> bool {
    match field.pending_hide_at_ms {
        Some(deadline) if now_ms >= deadline => {
            field.hide_suggestions();
            true
        }
        _ => false,
    }
}
