//! Rendering layouts: pattern-based text and JSON
//!
//! A layout binds a compiled rendering strategy to the global formatting
//! context (level table, color table, base directory). Layouts are built at
//! configuration time and shared read-only by appenders for their lifetime.

pub mod formatters;
pub mod json;
pub mod pattern;

pub use json::{JsonKeys, JsonLayout};
pub use pattern::{CompiledPattern, PatternLayout};

use crate::core::event::LogEvent;
use crate::core::level::{Level, Levels};
use crate::forward::ForwardPayload;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Default textual pattern, used when neither the appender nor the global
/// configuration specifies one.
pub const DEFAULT_PATTERN: &str =
    "%yyyy-%MM-%dd%T%HH:%mm:%ss %pid %levelc %loggerc %msg %argsc (%linec)%nstack";

/// A coloring function: wraps a fragment in terminal escapes (or not).
pub type ColorFn = fn(&str) -> String;

fn plain(s: &str) -> String {
    s.to_string()
}

fn cyan(s: &str) -> String {
    s.cyan().to_string()
}

fn green(s: &str) -> String {
    s.green().to_string()
}

fn yellow(s: &str) -> String {
    s.yellow().to_string()
}

fn red(s: &str) -> String {
    s.red().to_string()
}

fn magenta(s: &str) -> String {
    s.magenta().to_string()
}

fn gray(s: &str) -> String {
    s.bright_black().to_string()
}

/// Injected color table: one function per severity index plus the muted and
/// accent roles used by `%loggerc`/`%linec` and `%argsc`. Formatters never
/// hardcode escape codes.
#[derive(Debug, Clone)]
pub struct ColorTable {
    severity: Vec<ColorFn>,
    muted: ColorFn,
    accent: ColorFn,
}

impl ColorTable {
    /// Default palette cycled across `level_count` severities.
    #[must_use]
    pub fn default_for(level_count: usize) -> Self {
        const PALETTE: [ColorFn; 5] = [cyan, green, yellow, red, magenta];
        Self {
            severity: (0..level_count).map(|i| PALETTE[i % PALETTE.len()]).collect(),
            muted: gray,
            accent: magenta,
        }
    }

    /// A custom table. Missing severity entries fall back to no coloring.
    #[must_use]
    pub fn new(severity: Vec<ColorFn>, muted: ColorFn, accent: ColorFn) -> Self {
        Self {
            severity,
            muted,
            accent,
        }
    }

    #[must_use]
    pub fn severity(&self, level: Level) -> ColorFn {
        self.severity.get(level.index()).copied().unwrap_or(plain)
    }

    #[must_use]
    pub fn muted(&self) -> ColorFn {
        self.muted
    }

    #[must_use]
    pub fn accent(&self) -> ColorFn {
        self.accent
    }
}

/// Global formatting context shared by every layout of one configuration.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub levels: Arc<Levels>,
    pub colors: ColorTable,
    /// Base directory for the path-relative `%path`/`%pathc` formatters.
    pub basedir: Option<PathBuf>,
    /// Configuration-wide default pattern for appenders that do not
    /// declare their own.
    pub default_pattern: Option<String>,
}

impl LayoutContext {
    #[must_use]
    pub fn new(levels: Arc<Levels>) -> Self {
        let colors = ColorTable::default_for(levels.len());
        Self {
            levels,
            colors,
            basedir: None,
            default_pattern: None,
        }
    }

    #[must_use]
    pub fn with_basedir(mut self, basedir: Option<PathBuf>) -> Self {
        self.basedir = basedir;
        self
    }

    #[must_use]
    pub fn with_default_pattern(mut self, pattern: Option<String>) -> Self {
        self.default_pattern = pattern;
        self
    }

    /// The pattern an appender falls back to: its own, then the global
    /// one, then [`DEFAULT_PATTERN`].
    #[must_use]
    pub fn fallback_pattern<'a>(&'a self, own: Option<&'a str>) -> &'a str {
        own.or(self.default_pattern.as_deref())
            .unwrap_or(DEFAULT_PATTERN)
    }
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(Arc::new(Levels::default()))
    }
}

/// The rendering strategy an appender writes through.
#[derive(Debug, Clone)]
pub enum Layout {
    Pattern(PatternLayout),
    Json(JsonLayout),
}

impl Layout {
    /// Render a locally-originated event to one line.
    #[must_use]
    pub fn render(&self, event: &LogEvent) -> String {
        match self {
            Layout::Pattern(layout) => layout.render(event),
            Layout::Json(layout) => layout.render(event),
        }
    }

    /// Render a payload forwarded from a worker process.
    ///
    /// A pre-rendered line passes through untouched; a field map is
    /// substituted into the layout without re-invoking formatters, so
    /// call-stack-derived fields keep their worker-side values.
    #[must_use]
    pub fn render_payload(&self, payload: &ForwardPayload) -> String {
        match payload {
            ForwardPayload::Line(line) => line.clone(),
            ForwardPayload::Fields(fields) => match self {
                Layout::Pattern(layout) => layout.render_forwarded(fields),
                Layout::Json(layout) => layout.render_forwarded(fields),
            },
        }
    }
}
