//! The formatter registry: named pure functions over a log event
//!
//! Every formatter maps `(context, event)` to a string fragment. Lookups
//! happen once, at pattern-compile time; rendering only calls resolved
//! function pointers.

use crate::core::event::LogEvent;
use crate::core::value::LogValue;
use crate::layout::LayoutContext;
use chrono::{Datelike, Timelike, Utc};
use std::path::{Component, Path, PathBuf};

pub type FormatFn = fn(&LayoutContext, &LogEvent) -> String;

/// All known formatter names, resolved case-sensitively.
pub const TABLE: &[(&str, FormatFn)] = &[
    ("utctime", utctime),
    ("yyyy", yyyy),
    ("MM", month),
    ("dd", day),
    ("T", t_separator),
    ("HH", hour24),
    ("hh", hour12),
    ("mm", minute),
    ("ss", second),
    ("sss", millisecond),
    ("Z", zone_offset),
    ("level", level),
    ("levelc", level_colored),
    ("logger", logger),
    ("loggerc", logger_colored),
    ("msg", msg),
    ("args", args),
    ("argsc", args_colored),
    ("line", line),
    ("linec", line_colored),
    ("path", path),
    ("pathc", path_colored),
    ("error", error),
    ("stack", stack),
    ("nstack", nstack),
    ("pid", pid),
    ("n", newline),
];

/// Resolve a formatter name to its registry entry.
#[must_use]
pub fn lookup(name: &str) -> Option<(&'static str, FormatFn)> {
    TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(known, f)| (*known, *f))
}

fn utctime(_: &LayoutContext, event: &LogEvent) -> String {
    event
        .when
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

fn yyyy(_: &LayoutContext, event: &LogEvent) -> String {
    event.when.year().to_string()
}

fn month(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.month())
}

fn day(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.day())
}

fn t_separator(_: &LayoutContext, _: &LogEvent) -> String {
    "T".to_string()
}

fn hour24(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.hour())
}

fn hour12(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.hour() % 12)
}

fn minute(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.minute())
}

fn second(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:02}", event.when.second())
}

fn millisecond(_: &LayoutContext, event: &LogEvent) -> String {
    format!("{:03}", event.when.timestamp_subsec_millis())
}

fn zone_offset(_: &LayoutContext, event: &LogEvent) -> String {
    use chrono::Offset;
    let seconds = event.when.offset().fix().local_minus_utc();
    if seconds == 0 {
        return "Z".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

fn level(ctx: &LayoutContext, event: &LogEvent) -> String {
    ctx.levels.name(event.level).to_string()
}

fn level_colored(ctx: &LayoutContext, event: &LogEvent) -> String {
    let color = ctx.colors.severity(event.level);
    color(ctx.levels.name(event.level))
}

fn logger_name(event: &LogEvent) -> &str {
    if event.logger.is_empty() {
        "-"
    } else {
        &event.logger
    }
}

fn logger(_: &LayoutContext, event: &LogEvent) -> String {
    logger_name(event).to_string()
}

fn logger_colored(ctx: &LayoutContext, event: &LogEvent) -> String {
    (ctx.colors.muted())(logger_name(event))
}

fn msg(_: &LayoutContext, event: &LogEvent) -> String {
    event.message.clone()
}

fn args(_: &LayoutContext, event: &LogEvent) -> String {
    LogValue::join(&event.args)
}

fn args_colored(ctx: &LayoutContext, event: &LogEvent) -> String {
    (ctx.colors.accent())(&LogValue::join(&event.args))
}

fn short_location(event: &LogEvent) -> String {
    match event.call_site {
        Some(site) => {
            let name = Path::new(site.file)
                .file_name()
                .map_or(site.file, |n| n.to_str().unwrap_or(site.file));
            format!("{}:{}", name, site.line)
        }
        None => "unknown".to_string(),
    }
}

fn line(_: &LayoutContext, event: &LogEvent) -> String {
    short_location(event)
}

fn line_colored(ctx: &LayoutContext, event: &LogEvent) -> String {
    (ctx.colors.muted())(&short_location(event))
}

/// Express `target` relative to `base`, walking up with `..` where the
/// two diverge.
fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();
    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component);
    }
    relative
}

fn long_location(ctx: &LayoutContext, event: &LogEvent) -> String {
    match event.call_site {
        Some(site) => {
            let file = match &ctx.basedir {
                Some(base) => relative_to(base, Path::new(site.file))
                    .to_string_lossy()
                    .into_owned(),
                None => site.file.to_string(),
            };
            format!("{}:{}", file, site.line)
        }
        None => "unknown".to_string(),
    }
}

fn path(ctx: &LayoutContext, event: &LogEvent) -> String {
    long_location(ctx, event)
}

fn path_colored(ctx: &LayoutContext, event: &LogEvent) -> String {
    (ctx.colors.muted())(&long_location(ctx, event))
}

fn error(_: &LayoutContext, event: &LogEvent) -> String {
    event
        .first_error()
        .map(|(message, _)| message.to_string())
        .unwrap_or_default()
}

fn stack(_: &LayoutContext, event: &LogEvent) -> String {
    event
        .first_error()
        .and_then(|(_, stack)| stack.map(ToString::to_string))
        .unwrap_or_default()
}

fn nstack(_: &LayoutContext, event: &LogEvent) -> String {
    event
        .first_error()
        .and_then(|(_, stack)| stack.map(|s| format!("\n{s}")))
        .unwrap_or_default()
}

fn pid(_: &LayoutContext, _: &LogEvent) -> String {
    std::process::id().to_string()
}

fn newline(_: &LayoutContext, _: &LogEvent) -> String {
    "\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::CallSite;
    use crate::core::level::{DEBUG, ERROR};
    use chrono::{Local, TimeZone};

    fn event_at(hour: u32) -> LogEvent {
        LogEvent::new(DEBUG, "hello").at(
            Local
                .with_ymd_and_hms(2026, 3, 7, hour, 5, 9)
                .single()
                .expect("valid datetime"),
        )
    }

    #[test]
    fn test_calendar_fields_are_zero_padded() {
        let ctx = LayoutContext::default();
        let event = event_at(8);
        assert_eq!(yyyy(&ctx, &event), "2026");
        assert_eq!(month(&ctx, &event), "03");
        assert_eq!(day(&ctx, &event), "07");
        assert_eq!(hour24(&ctx, &event), "08");
        assert_eq!(minute(&ctx, &event), "05");
        assert_eq!(second(&ctx, &event), "09");
        assert_eq!(millisecond(&ctx, &event), "000");
    }

    #[test]
    fn test_hour12_wraps_afternoon() {
        let ctx = LayoutContext::default();
        assert_eq!(hour12(&ctx, &event_at(15)), "03");
        assert_eq!(hour12(&ctx, &event_at(12)), "00");
    }

    #[test]
    fn test_zone_offset_shape() {
        let ctx = LayoutContext::default();
        let rendered = zone_offset(&ctx, &event_at(8));
        assert!(
            rendered == "Z"
                || (rendered.len() == 6
                    && (rendered.starts_with('+') || rendered.starts_with('-'))
                    && rendered.contains(':')),
            "unexpected offset: {rendered}"
        );
    }

    #[test]
    fn test_level_name_uses_table() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(ERROR, "x");
        assert_eq!(level(&ctx, &event), "error");
    }

    #[test]
    fn test_logger_defaults_to_dash() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(DEBUG, "x");
        assert_eq!(logger(&ctx, &event), "-");
        assert_eq!(logger(&ctx, &event.clone().with_logger("web")), "web");
    }

    #[test]
    fn test_line_is_basename_with_line_number() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(DEBUG, "x").with_call_site(CallSite {
            file: "src/server/handler.rs",
            line: 42,
        });
        assert_eq!(line(&ctx, &event), "handler.rs:42");
    }

    #[test]
    fn test_line_without_call_site() {
        let ctx = LayoutContext::default();
        assert_eq!(line(&ctx, &LogEvent::new(DEBUG, "x")), "unknown");
    }

    #[test]
    fn test_path_relativizes_against_basedir() {
        let ctx = LayoutContext::default().with_basedir(Some(PathBuf::from("/app/bin")));
        let event = LogEvent::new(DEBUG, "x").with_call_site(CallSite {
            file: "/app/lib/runner.rs",
            line: 7,
        });
        assert_eq!(path(&ctx, &event), "../lib/runner.rs:7");
    }

    #[test]
    fn test_relative_to_descends() {
        assert_eq!(
            relative_to(Path::new("/a"), Path::new("/a/b/c.rs")),
            PathBuf::from("b/c.rs")
        );
    }

    #[test]
    fn test_error_formatters_use_first_error_arg() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(ERROR, "failed")
            .with_args(vec![LogValue::error_with_stack("bad state", "line one\nline two")]);
        assert_eq!(error(&ctx, &event), "bad state");
        assert_eq!(stack(&ctx, &event), "line one\nline two");
        assert_eq!(nstack(&ctx, &event), "\nline one\nline two");
    }

    #[test]
    fn test_error_formatters_empty_without_error() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(ERROR, "failed");
        assert_eq!(error(&ctx, &event), "");
        assert_eq!(stack(&ctx, &event), "");
        assert_eq!(nstack(&ctx, &event), "");
    }

    #[test]
    fn test_pid_matches_process() {
        let ctx = LayoutContext::default();
        let event = LogEvent::new(DEBUG, "x");
        assert_eq!(pid(&ctx, &event), std::process::id().to_string());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("MM").is_some());
        assert!(lookup("mm").is_some());
        assert!(lookup("Mm").is_none());
        assert!(lookup("bogus").is_none());
    }
}
