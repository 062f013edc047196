//! Severity levels as indices into a configurable level table

use crate::core::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A severity rank: an index into the process-wide [`Levels`] table.
///
/// Levels compare by index, never by name. The constants below match the
/// default five-level table; custom tables hand out their own indices via
/// [`Levels::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Level(pub usize);

pub const DEBUG: Level = Level(0);
pub const INFO: Level = Level(1);
pub const WARN: Level = Level(2);
pub const ERROR: Level = Level(3);
pub const FATAL: Level = Level(4);

impl Level {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered list of level names for one configuration lifetime.
///
/// Indices are stable for as long as the configuration lives; reconfiguring
/// the registry replaces the whole table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels {
    names: Vec<String>,
}

impl Levels {
    /// Build a custom level table from names in ascending severity order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty list or duplicate names.
    pub fn custom(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(LoggerError::config("levels", "level list must not be empty"));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(LoggerError::config(
                    "levels",
                    format!("duplicate level name '{name}'"),
                ));
            }
        }
        Ok(Self { names })
    }

    /// Name of a level, or `"unknown"` for an out-of-table index.
    #[must_use]
    pub fn name(&self, level: Level) -> &str {
        self.names.get(level.0).map_or("unknown", String::as_str)
    }

    /// Look a level up by name.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<Level> {
        self.names.iter().position(|n| n == name).map(Level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            names: ["debug", "info", "warn", "error", "fatal"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
