//! Declarative probability tables and the knobs that shape generated orders.

use mashimashi_rush_core::{Level, Topping};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single outcome of a topping draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Exclusive cumulative upper bound; the entry fires when the draw falls below it.
    pub upper_bound: f64,
    /// Level assigned to the topping when this entry fires.
    pub level: Level,
    /// Fragment appended to the spoken phrase, or `None` for a silent outcome.
    #[serde(default)]
    pub phrase: Option<String>,
}

impl TableEntry {
    fn spoken(upper_bound: f64, level: u8, phrase: &str) -> Self {
        Self {
            upper_bound,
            level: level_or_none(level),
            phrase: Some(phrase.to_owned()),
        }
    }

    fn silent(upper_bound: f64, level: u8) -> Self {
        Self {
            upper_bound,
            level: level_or_none(level),
            phrase: None,
        }
    }
}

fn level_or_none(value: u8) -> Level {
    Level::new(value).unwrap_or(Level::NONE)
}

/// Ordered cumulative probability table for a single topping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToppingTable {
    entries: Vec<TableEntry>,
}

impl ToppingTable {
    /// Creates a table from entries ordered by ascending upper bound.
    #[must_use]
    pub fn new(entries: Vec<TableEntry>) -> Self {
        Self { entries }
    }

    /// Default vegetable table: 20% none, 20% mashi, 10% mashi mashi, 20% named, 30% silent.
    #[must_use]
    pub fn yasai() -> Self {
        Self::new(vec![
            TableEntry::spoken(0.2, 0, "ヤサイなし"),
            TableEntry::spoken(0.4, 2, "ヤサイマシ"),
            TableEntry::spoken(0.5, 3, "ヤサイマシマシ"),
            TableEntry::spoken(0.7, 1, "ヤサイ"),
            TableEntry::silent(1.0, 1),
        ])
    }

    /// Default garlic table: 30% silent, 30% named, 20% mashi, 20% mashi mashi.
    #[must_use]
    pub fn ninniku() -> Self {
        Self::called("ニンニク")
    }

    /// Default back-fat table, shaped like the garlic table.
    #[must_use]
    pub fn abura() -> Self {
        Self::called("アブラ")
    }

    fn called(name: &str) -> Self {
        Self::new(vec![
            TableEntry::silent(0.3, 0),
            TableEntry::spoken(0.6, 1, name),
            TableEntry::spoken(0.8, 2, &format!("{name}マシ")),
            TableEntry::spoken(1.0, 3, &format!("{name}マシマシ")),
        ])
    }

    /// Entries in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Returns the first entry whose upper bound exceeds `draw`.
    ///
    /// A validated table always yields an entry for draws in `[0, 1)`.
    #[must_use]
    pub fn lookup(&self, draw: f64) -> Option<&TableEntry> {
        self.entries
            .iter()
            .find(|entry| draw < entry.upper_bound)
            .or_else(|| self.entries.last())
    }

    /// Probability mass assigned to each level, indexed by level.
    #[must_use]
    pub fn level_weights(&self) -> [f64; 4] {
        let mut weights = [0.0; 4];
        let mut previous = 0.0;
        for entry in &self.entries {
            weights[usize::from(entry.level.get())] += entry.upper_bound - previous;
            previous = entry.upper_bound;
        }
        weights
    }

    fn validate(&self, topping: Topping) -> Result<(), TuningError> {
        let last = self
            .entries
            .last()
            .ok_or(TuningError::EmptyTable { topping })?;

        let mut previous = 0.0;
        for entry in &self.entries {
            let bound = entry.upper_bound;
            if !(bound > 0.0 && bound <= 1.0) {
                return Err(TuningError::BoundOutOfRange { topping, bound });
            }
            if bound <= previous {
                return Err(TuningError::NonIncreasingBounds {
                    topping,
                    previous,
                    bound,
                });
            }
            if entry.phrase.as_deref().is_some_and(str::is_empty) {
                return Err(TuningError::EmptyFragment { topping });
            }
            previous = bound;
        }

        if last.upper_bound < 1.0 {
            return Err(TuningError::IncompleteTable {
                topping,
                last: last.upper_bound,
            });
        }
        Ok(())
    }
}

/// Aggregated knobs controlling every adjustable aspect of order generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Probability that an order skips the per-topping draws and calls out every topping at once.
    pub special_chance: f64,
    /// Share of special orders that double every topping; the rest triple them.
    pub doubled_share: f64,
    /// Phrase for the all-doubled special order.
    pub doubled_phrase: String,
    /// Phrase for the all-tripled special order.
    pub tripled_phrase: String,
    /// Phrase used when no topping fragment was spoken.
    pub as_is_phrase: String,
    /// Vegetable outcomes.
    pub yasai: ToppingTable,
    /// Garlic outcomes.
    pub ninniku: ToppingTable,
    /// Back-fat outcomes.
    pub abura: ToppingTable,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            special_chance: 0.1,
            doubled_share: 0.5,
            doubled_phrase: "全マシ".to_owned(),
            tripled_phrase: "全マシマシ".to_owned(),
            as_is_phrase: "そのまま".to_owned(),
            yasai: ToppingTable::yasai(),
            ninniku: ToppingTable::ninniku(),
            abura: ToppingTable::abura(),
        }
    }
}

impl GenerationTuning {
    /// Table governing the provided topping.
    #[must_use]
    pub fn table(&self, topping: Topping) -> &ToppingTable {
        match topping {
            Topping::Yasai => &self.yasai,
            Topping::Ninniku => &self.ninniku,
            Topping::Abura => &self.abura,
        }
    }

    /// Checks that every probability and phrase can produce a consistent order.
    pub fn validate(&self) -> Result<(), TuningError> {
        check_chance("special_chance", self.special_chance)?;
        check_chance("doubled_share", self.doubled_share)?;

        for (name, phrase) in [
            ("doubled_phrase", &self.doubled_phrase),
            ("tripled_phrase", &self.tripled_phrase),
            ("as_is_phrase", &self.as_is_phrase),
        ] {
            if phrase.is_empty() {
                return Err(TuningError::EmptyPhrase { name });
            }
        }

        if self.as_is_phrase == self.doubled_phrase || self.as_is_phrase == self.tripled_phrase {
            return Err(TuningError::AmbiguousPlaceholder {
                phrase: self.as_is_phrase.clone(),
            });
        }

        for topping in Topping::ALL {
            self.table(topping).validate(topping)?;
        }
        Ok(())
    }
}

fn check_chance(name: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::ChanceOutOfRange { name, value })
    }
}

/// Reasons a tuning surface cannot be used for generation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TuningError {
    /// A probability knob lies outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    ChanceOutOfRange {
        /// Name of the offending knob.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A fixed phrase is empty.
    #[error("{name} must not be empty")]
    EmptyPhrase {
        /// Name of the offending phrase.
        name: &'static str,
    },
    /// The as-is placeholder reuses a special-order phrase.
    #[error("as-is phrase {phrase:?} collides with a special-order phrase")]
    AmbiguousPlaceholder {
        /// Rejected placeholder.
        phrase: String,
    },
    /// A topping table has no entries.
    #[error("{topping:?} table has no entries")]
    EmptyTable {
        /// Topping owning the table.
        topping: Topping,
    },
    /// An upper bound lies outside `(0, 1]`.
    #[error("{topping:?} table bound {bound} must lie within (0, 1]")]
    BoundOutOfRange {
        /// Topping owning the table.
        topping: Topping,
        /// Rejected bound.
        bound: f64,
    },
    /// Upper bounds are not strictly increasing.
    #[error("{topping:?} table bound {bound} does not exceed the previous bound {previous}")]
    NonIncreasingBounds {
        /// Topping owning the table.
        topping: Topping,
        /// Bound of the preceding entry.
        previous: f64,
        /// Rejected bound.
        bound: f64,
    },
    /// The final upper bound does not cover the whole unit interval.
    #[error("{topping:?} table ends at {last} instead of 1.0")]
    IncompleteTable {
        /// Topping owning the table.
        topping: Topping,
        /// Final bound of the table.
        last: f64,
    },
    /// A spoken outcome carries an empty fragment.
    #[error("{topping:?} table contains an empty fragment")]
    EmptyFragment {
        /// Topping owning the table.
        topping: Topping,
    },
}
