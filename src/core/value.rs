//! Extra-argument values attached to a logging call
//!
//! `%args` joining follows fixed conversion rules: strings and numbers
//! stringify, a lazy value is invoked and converted recursively, an
//! error-like value contributes nothing (it is surfaced through the
//! dedicated `%error`/`%stack` formatters), and any other object renders
//! as space-joined `key=JSON(value)` pairs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type LazyFn = Arc<dyn Fn() -> LogValue + Send + Sync>;

#[derive(Clone)]
pub enum LogValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Evaluated at render time; the result is converted recursively.
    Lazy(LazyFn),
    /// Error-like value: skipped when joining `%args`.
    Error {
        message: String,
        stack: Option<String>,
    },
    /// Structured fields, merged into JSON records and rendered as
    /// `key=value` pairs in text.
    Map(BTreeMap<String, serde_json::Value>),
}

impl LogValue {
    /// Capture an error and its `source` chain.
    ///
    /// The chain stands in for a stack trace: each `source` becomes one
    /// `caused by:` line reachable through `%stack`/`%nstack`.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let mut lines = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        let stack = if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        };
        LogValue::Error { message, stack }
    }

    /// An error-like value with an explicit stack text.
    pub fn error_with_stack(message: impl Into<String>, stack: impl Into<String>) -> Self {
        LogValue::Error {
            message: message.into(),
            stack: Some(stack.into()),
        }
    }

    /// A value computed only when a layout actually renders it.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> LogValue + Send + Sync + 'static,
    {
        LogValue::Lazy(Arc::new(f))
    }

    /// Convert one value to its `%args` text fragment.
    #[must_use]
    pub fn convert(&self) -> String {
        match self {
            LogValue::Str(s) => s.clone(),
            LogValue::Int(i) => i.to_string(),
            LogValue::Float(f) => f.to_string(),
            LogValue::Lazy(f) => f().convert(),
            LogValue::Error { .. } => String::new(),
            LogValue::Bool(_) => String::new(),
            LogValue::Map(fields) => fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Join a value list with single spaces, applying [`convert`](Self::convert)
    /// to each element.
    #[must_use]
    pub fn join(values: &[LogValue]) -> String {
        values
            .iter()
            .map(LogValue::convert)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            LogValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            LogValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            LogValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            LogValue::Lazy(_) => f.write_str("Lazy(..)"),
            LogValue::Error { message, .. } => f.debug_tuple("Error").field(message).finish(),
            LogValue::Map(fields) => f.debug_tuple("Map").field(fields).finish(),
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<i64> for LogValue {
    fn from(i: i64) -> Self {
        LogValue::Int(i)
    }
}

impl From<i32> for LogValue {
    fn from(i: i32) -> Self {
        LogValue::Int(i64::from(i))
    }
}

impl From<u32> for LogValue {
    fn from(i: u32) -> Self {
        LogValue::Int(i64::from(i))
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<BTreeMap<String, serde_json::Value>> for LogValue {
    fn from(fields: BTreeMap<String, serde_json::Value>) -> Self {
        LogValue::Map(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strings_and_numbers_stringify() {
        assert_eq!(LogValue::from("plain").convert(), "plain");
        assert_eq!(LogValue::from(42).convert(), "42");
        assert_eq!(LogValue::from(1.5).convert(), "1.5");
    }

    #[test]
    fn test_lazy_converts_recursively() {
        let value = LogValue::lazy(|| LogValue::lazy(|| LogValue::from(7)));
        assert_eq!(value.convert(), "7");
    }

    #[test]
    fn test_errors_contribute_nothing_to_join() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let joined = LogValue::join(&[
            LogValue::from("before"),
            LogValue::error(&io),
            LogValue::from("after"),
        ]);
        assert_eq!(joined, "before  after");
    }

    #[test]
    fn test_map_renders_key_json_pairs() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), json!("value"));
        fields.insert("size".to_string(), json!(3));
        assert_eq!(LogValue::Map(fields).convert(), "name=\"value\" size=3");
    }

    #[test]
    fn test_empty_map_renders_nothing() {
        assert_eq!(LogValue::Map(BTreeMap::new()).convert(), "");
    }

    #[test]
    fn test_error_captures_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer failed")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        match LogValue::error(&err) {
            LogValue::Error { message, stack } => {
                assert_eq!(message, "outer failed");
                assert_eq!(stack.as_deref(), Some("caused by: inner"));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }
}
