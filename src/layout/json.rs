//! JSON layout: one record per line, keyed by configurable names
//!
//! A structurally simpler sibling of the pattern layout that reuses the
//! same formatter primitives for its computed values. Keys left
//! unconfigured are omitted from the output entirely, never emitted as
//! null.

use crate::core::event::LogEvent;
use crate::core::value::LogValue;
use crate::layout::formatters::lookup;
use crate::layout::pattern::CompiledPattern;
use crate::layout::LayoutContext;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Output key names. `None` omits the field.
#[derive(Debug, Clone, Default)]
pub struct JsonKeys {
    pub time: Option<String>,
    pub message: Option<String>,
    pub level: Option<String>,
    pub logger: Option<String>,
    pub line: Option<String>,
    pub error: Option<String>,
    pub stack: Option<String>,
    pub pid: Option<String>,
    /// Catch-all for non-object extra arguments.
    pub args: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JsonLayout {
    keys: JsonKeys,
    /// Optional pattern-compiled template for the time value; falls back
    /// to the `utctime` formatter.
    time_pattern: Option<Arc<CompiledPattern>>,
    eol: bool,
    context: Arc<LayoutContext>,
}

impl JsonLayout {
    #[must_use]
    pub fn new(
        keys: JsonKeys,
        time_pattern: Option<&str>,
        eol: bool,
        context: Arc<LayoutContext>,
    ) -> Self {
        Self {
            keys,
            time_pattern: time_pattern.map(|p| Arc::new(CompiledPattern::compile(p))),
            eol,
            context,
        }
    }

    fn formatted(&self, name: &str, event: &LogEvent) -> String {
        lookup(name).map_or_else(String::new, |(_, f)| f(&self.context, event))
    }

    /// Render one event to a single JSON line.
    #[must_use]
    pub fn render(&self, event: &LogEvent) -> String {
        let mut record = Map::new();
        let mut extras = Vec::new();
        flatten_args(&event.args, &mut record, &mut extras);

        // configured keys overwrite flattened argument fields
        if let Some(key) = &self.keys.time {
            let time = match &self.time_pattern {
                Some(pattern) => pattern.render(&self.context, event),
                None => self.formatted("utctime", event),
            };
            record.insert(key.clone(), Value::String(time));
        }
        if let Some(key) = &self.keys.message {
            record.insert(key.clone(), Value::String(event.message.clone()));
        }
        if let Some(key) = &self.keys.level {
            record.insert(key.clone(), Value::String(self.formatted("level", event)));
        }
        if let Some(key) = &self.keys.logger {
            record.insert(key.clone(), Value::String(self.formatted("logger", event)));
        }
        if let Some(key) = &self.keys.line {
            record.insert(key.clone(), Value::String(self.formatted("line", event)));
        }
        if event.first_error().is_some() {
            if let Some(key) = &self.keys.error {
                record.insert(key.clone(), Value::String(self.formatted("error", event)));
            }
            if let Some(key) = &self.keys.stack {
                record.insert(key.clone(), Value::String(self.formatted("stack", event)));
            }
        }
        if let Some(key) = &self.keys.pid {
            record.insert(key.clone(), Value::String(self.formatted("pid", event)));
        }
        if let Some(key) = &self.keys.args {
            if !extras.is_empty() {
                record.insert(key.clone(), Value::Array(extras));
            }
        }

        let mut line = Value::Object(record).to_string();
        if self.eol {
            line.push('\n');
        }
        line
    }

    /// Serialize a forwarded field map as the record itself.
    #[must_use]
    pub fn render_forwarded(&self, fields: &BTreeMap<String, String>) -> String {
        let record: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let mut line = Value::Object(record).to_string();
        if self.eol {
            line.push('\n');
        }
        line
    }
}

/// Merge object-typed arguments into the top-level record; collect the
/// rest (except error-like values) for the catch-all key.
fn flatten_args(args: &[LogValue], record: &mut Map<String, Value>, extras: &mut Vec<Value>) {
    for arg in args {
        match arg {
            LogValue::Map(fields) => {
                for (key, value) in fields {
                    record.insert(key.clone(), value.clone());
                }
            }
            LogValue::Lazy(f) => flatten_args(&[f()], record, extras),
            LogValue::Error { .. } => {}
            LogValue::Str(s) => extras.push(Value::String(s.clone())),
            LogValue::Int(i) => extras.push(Value::from(*i)),
            LogValue::Float(f) => {
                extras.push(serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number));
            }
            LogValue::Bool(b) => extras.push(Value::Bool(*b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::INFO;
    use serde_json::json;

    fn ctx() -> Arc<LayoutContext> {
        Arc::new(LayoutContext::default())
    }

    fn keys() -> JsonKeys {
        JsonKeys {
            time: Some("_time".to_string()),
            message: Some("_message".to_string()),
            ..JsonKeys::default()
        }
    }

    #[test]
    fn test_simple_record() {
        let layout = JsonLayout::new(keys(), None, true, ctx());
        let event = LogEvent::new(INFO, "test test test");
        let line = layout.render(&event);
        assert!(line.ends_with('\n'));

        let record: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["_message"], "test test test");
        let time = record["_time"].as_str().unwrap();
        assert!(time.ends_with('Z') && time.contains('T'));
    }

    #[test]
    fn test_unconfigured_keys_omitted() {
        let layout = JsonLayout::new(keys(), None, false, ctx());
        let event = LogEvent::new(INFO, "msg").with_logger("web");
        let record: Value = serde_json::from_str(&layout.render(&event)).unwrap();
        let object = record.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(!object.contains_key("level"));
        assert!(!object.contains_key("logger"));
    }

    #[test]
    fn test_object_args_flatten_and_rest_collects() {
        let mut json_keys = keys();
        json_keys.args = Some("other_contents".to_string());
        let layout = JsonLayout::new(json_keys, None, true, ctx());

        let mut fields = BTreeMap::new();
        fields.insert("test".to_string(), json!("hoge"));
        let event = LogEvent::new(INFO, "test test test").with_args(vec![
            LogValue::Map(fields),
            LogValue::from("fuga"),
            LogValue::from(1),
            LogValue::from(true),
        ]);

        let record: Value = serde_json::from_str(&layout.render(&event)).unwrap();
        assert_eq!(record["test"], "hoge");
        assert_eq!(record["other_contents"], json!(["fuga", 1, true]));
    }

    #[test]
    fn test_configured_keys_overwrite_flattened_fields() {
        let layout = JsonLayout::new(keys(), None, false, ctx());
        let mut fields = BTreeMap::new();
        fields.insert("_message".to_string(), json!("spoofed"));
        let event =
            LogEvent::new(INFO, "real message").with_args(vec![LogValue::Map(fields)]);
        let record: Value = serde_json::from_str(&layout.render(&event)).unwrap();
        assert_eq!(record["_message"], "real message");
    }

    #[test]
    fn test_custom_time_pattern() {
        let layout = JsonLayout::new(
            keys(),
            Some("%yyyy/%MM/%dd %HH:%mm:%ss.%sss"),
            false,
            ctx(),
        );
        use chrono::TimeZone;
        let event = LogEvent::new(INFO, "msg").at(
            chrono::Local
                .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
                .single()
                .expect("valid datetime"),
        );
        let record: Value = serde_json::from_str(&layout.render(&event)).unwrap();
        assert_eq!(record["_time"], "2026/02/03 04:05:06.000");
    }

    #[test]
    fn test_error_keys_only_when_error_present() {
        let mut json_keys = keys();
        json_keys.error = Some("error".to_string());
        json_keys.stack = Some("stack".to_string());
        let layout = JsonLayout::new(json_keys, None, false, ctx());

        let calm = LogEvent::new(INFO, "ok");
        let record: Value = serde_json::from_str(&layout.render(&calm)).unwrap();
        assert!(!record.as_object().unwrap().contains_key("error"));

        let failed = LogEvent::new(INFO, "broken")
            .with_args(vec![LogValue::error_with_stack("oops", "trace")]);
        let record: Value = serde_json::from_str(&layout.render(&failed)).unwrap();
        assert_eq!(record["error"], "oops");
        assert_eq!(record["stack"], "trace");
    }

    #[test]
    fn test_render_forwarded_serializes_field_map() {
        let layout = JsonLayout::new(keys(), None, true, ctx());
        let mut fields = BTreeMap::new();
        fields.insert("msg".to_string(), "hello".to_string());
        fields.insert("level".to_string(), "warn".to_string());
        let record: Value = serde_json::from_str(&layout.render_forwarded(&fields)).unwrap();
        assert_eq!(record["msg"], "hello");
        assert_eq!(record["level"], "warn");
    }
}
