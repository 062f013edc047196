//! Configuration surface
//!
//! Deserializable types for the appender and logger maps, consumed by
//! [`LoggerRegistry::configure`](crate::core::registry::LoggerRegistry::configure).
//! Validation happens at configuration time: unknown appender types,
//! unknown level names, and references to undeclared appenders are
//! rejected before any state is replaced.

use crate::core::error::Result;
use crate::layout::{json::JsonKeys, JsonLayout, Layout, LayoutContext, PatternLayout};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Custom level names in ascending severity order; defaults to
    /// `debug < info < warn < error < fatal`.
    pub levels: Option<Vec<String>>,
    /// Default layout pattern for appenders without their own.
    pub pattern: Option<String>,
    /// Base directory for the `%path` formatter.
    pub basedir: Option<PathBuf>,
    #[serde(default)]
    pub appenders: HashMap<String, AppenderConfig>,
    #[serde(default)]
    pub loggers: HashMap<String, LoggerConfig>,
}

impl Config {
    /// Parse a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppenderConfig {
    /// Appender type tag, resolved through the registered-constructor map.
    #[serde(rename = "type")]
    pub kind: String,
    /// This appender's own minimum level name.
    pub level: Option<String>,
    pub directory: Option<PathBuf>,
    pub file_name: Option<String>,
    /// Archive name pattern for `rotate_file`.
    pub file_pattern: Option<String>,
    /// Rotation interval in milliseconds.
    pub interval: Option<i64>,
    /// POSIX permission bits for created files.
    pub mode: Option<u32>,
    pub symlink: Option<SymlinkConfig>,
    pub layout: Option<LayoutConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymlinkConfig {
    /// Path of the symlink kept pointing at the most recent archive.
    pub current: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    pub pattern: Option<String>,
    pub json: Option<JsonLayoutConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonLayoutConfig {
    pub time_key: Option<String>,
    pub message_key: Option<String>,
    pub level_key: Option<String>,
    pub logger_key: Option<String>,
    pub line_key: Option<String>,
    pub error_key: Option<String>,
    pub stack_key: Option<String>,
    pub pid_key: Option<String>,
    pub args_key: Option<String>,
    pub time_pattern: Option<String>,
    #[serde(default)]
    pub eol: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggerConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub appenders: Vec<String>,
    /// Alias: use that logger's threshold and appenders instead of ours.
    pub refer: Option<String>,
}

/// Build the layout an appender declaration asks for.
pub(crate) fn build_layout(cfg: Option<&LayoutConfig>, context: &Arc<LayoutContext>) -> Layout {
    if let Some(json) = cfg.and_then(|c| c.json.as_ref()) {
        let keys = JsonKeys {
            time: json.time_key.clone(),
            message: json.message_key.clone(),
            level: json.level_key.clone(),
            logger: json.logger_key.clone(),
            line: json.line_key.clone(),
            error: json.error_key.clone(),
            stack: json.stack_key.clone(),
            pid: json.pid_key.clone(),
            args: json.args_key.clone(),
        };
        return Layout::Json(JsonLayout::new(
            keys,
            json.time_pattern.as_deref(),
            json.eol,
            Arc::clone(context),
        ));
    }
    let pattern = context.fallback_pattern(cfg.and_then(|c| c.pattern.as_deref()));
    Layout::Pattern(PatternLayout::new(pattern, Arc::clone(context)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let config = Config::from_json(
            r#"{
                "pattern": "%level %msg",
                "basedir": "/srv/app",
                "appenders": {
                    "out": { "type": "console" },
                    "app": {
                        "type": "rotate_file",
                        "level": "info",
                        "directory": "/var/log/app",
                        "file_name": "app.log",
                        "file_pattern": "app-%yyyy%MM%dd.log",
                        "interval": 86400000,
                        "symlink": { "current": "/var/log/app/current" },
                        "layout": { "pattern": "%utctime %level %msg%n" }
                    },
                    "audit": {
                        "type": "file",
                        "file_name": "audit.jsonl",
                        "layout": { "json": { "time_key": "_time", "message_key": "_message", "eol": true } }
                    }
                },
                "loggers": {
                    "default": { "level": "info", "appenders": ["out", "app"] },
                    "audit": { "level": "warn", "appenders": ["audit"] },
                    "web": { "refer": "default" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.appenders.len(), 3);
        assert_eq!(config.loggers.len(), 3);
        let rotate = &config.appenders["app"];
        assert_eq!(rotate.kind, "rotate_file");
        assert_eq!(rotate.interval, Some(86_400_000));
        assert_eq!(
            rotate.symlink.as_ref().unwrap().current,
            PathBuf::from("/var/log/app/current")
        );
        assert_eq!(config.loggers["web"].refer.as_deref(), Some("default"));
    }

    #[test]
    fn test_layout_fallback_chain() {
        let context = Arc::new(LayoutContext::default());
        match build_layout(None, &context) {
            Layout::Pattern(_) => {}
            Layout::Json(_) => panic!("expected pattern layout"),
        }

        let with_global = Arc::new(
            LayoutContext::default().with_default_pattern(Some("%msg".to_string())),
        );
        assert_eq!(with_global.fallback_pattern(None), "%msg");
        assert_eq!(with_global.fallback_pattern(Some("%level")), "%level");
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(Config::from_json("{ not json").is_err());
        assert!(Config::from_json(r#"{"appenders": {"a": {}}}"#).is_err());
    }
}
