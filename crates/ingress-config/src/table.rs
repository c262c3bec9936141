//! Ordered, first-match-wins configuration tables.

use ingress_model::{Configuration, compile_prefix_regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// One `(pattern, configuration)` row of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub pattern: String,
    pub config: Configuration,
}

/// Ordered sequence of entries, scanned linearly.
///
/// The first pattern that matches an identifier from its first character wins,
/// regardless of how specific later patterns are. Nothing stops a catch-all from
/// shadowing the rest of the table; use [`MatchTable`] for that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTable {
    #[serde(default)]
    entries: Vec<ConfigEntry>,
}

impl ConfigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry after all existing ones.
    #[must_use]
    pub fn with_entry(mut self, pattern: impl Into<String>, config: Configuration) -> Self {
        self.push(pattern, config);
        self
    }

    pub fn push(&mut self, pattern: impl Into<String>, config: Configuration) {
        self.entries.push(ConfigEntry {
            pattern: pattern.into(),
            config,
        });
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patterns in table order.
    pub fn patterns(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.pattern.clone()).collect()
    }

    /// Return the configuration of the first entry matching `identifier`.
    pub fn resolve(&self, identifier: &str) -> Result<&Configuration> {
        for (position, entry) in self.entries.iter().enumerate() {
            let regex = compile_prefix_regex(&entry.pattern)?;
            if regex.is_match(identifier) {
                debug!(identifier, pattern = %entry.pattern, position, "configuration resolved");
                return Ok(&entry.config);
            }
        }
        Err(ConfigError::NoMatchingConfiguration {
            identifier: identifier.to_string(),
            patterns: self.patterns(),
        })
    }
}

impl FromIterator<(String, Configuration)> for ConfigTable {
    fn from_iter<I: IntoIterator<Item = (String, Configuration)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(pattern, config)| ConfigEntry { pattern, config })
                .collect(),
        }
    }
}

/// Free-function form of [`ConfigTable::resolve`].
pub fn resolve<'a>(identifier: &str, table: &'a ConfigTable) -> Result<&'a Configuration> {
    table.resolve(identifier)
}

/// Identifiers a catch-all pattern must accept.
const CATCH_ALL_PROBES: &[&str] = &[
    "",
    "x",
    "cpih",
    "other-dataset",
    "Some Other_Dataset.123",
    "-",
    "0",
    "__",
    "a b/c\\d",
];

/// Returns true if `pattern` accepts every probe identifier.
pub fn is_catch_all(pattern: &str) -> Result<bool> {
    let regex = compile_prefix_regex(pattern)?;
    Ok(CATCH_ALL_PROBES.iter().all(|probe| regex.is_match(probe)))
}

/// A [`ConfigTable`] checked at construction.
///
/// The table is non-empty, its last entry is a catch-all, and no earlier entry
/// is one. Resolution therefore always succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTable {
    table: ConfigTable,
}

impl MatchTable {
    pub fn new(table: ConfigTable) -> Result<Self> {
        let Some((last, rest)) = table.entries.split_last() else {
            return Err(ConfigError::EmptyTable);
        };
        for (position, entry) in rest.iter().enumerate() {
            if is_catch_all(&entry.pattern)? {
                return Err(ConfigError::CatchAllNotLast {
                    pattern: entry.pattern.clone(),
                    position,
                    shadowed: table.len() - position - 1,
                });
            }
        }
        if !is_catch_all(&last.pattern)? {
            return Err(ConfigError::MissingCatchAll {
                pattern: last.pattern.clone(),
            });
        }
        Ok(Self { table })
    }

    /// Return the configuration of the first entry matching `identifier`.
    pub fn resolve(&self, identifier: &str) -> Result<&Configuration> {
        self.table.resolve(identifier)
    }

    /// The catch-all configuration.
    pub fn default_config(&self) -> Option<&Configuration> {
        self.table.entries.last().map(|e| &e.config)
    }

    pub fn table(&self) -> &ConfigTable {
        &self.table
    }

    pub fn into_inner(self) -> ConfigTable {
        self.table
    }
}

impl TryFrom<ConfigTable> for MatchTable {
    type Error = ConfigError;

    fn try_from(table: ConfigTable) -> Result<Self> {
        Self::new(table)
    }
}
