//! Rotation clock: time to bucket, timestamp to archived file name

use chrono::{DateTime, Datelike, Local, Timelike};

/// Map a point in time onto its rotation bucket for a fixed interval.
///
/// Pure: the active file must roll over exactly when the bucket of an
/// incoming write exceeds the bucket of the file's period.
#[must_use]
pub fn rotation_bucket(when: &DateTime<Local>, interval_ms: i64) -> i64 {
    when.timestamp_millis().div_euclid(interval_ms)
}

/// Substitute `%yyyy %MM %dd %hh %mm` in a filename pattern,
/// case-sensitively. Unknown `%token`s are left verbatim.
///
/// The timestamp is the *previous* write's: an archive is named for the
/// period that just closed, not for the rotation instant.
#[must_use]
pub fn archive_file_name(pattern: &str, when: &DateTime<Local>) -> String {
    let bytes = pattern.as_bytes();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            // pattern names are plain ASCII in practice; copy byte-wise
            // runs as str slices to stay UTF-8 correct
            let start = i;
            while i < bytes.len() && bytes[i] != b'%' {
                i += 1;
            }
            out.push_str(&pattern[start..i]);
            continue;
        }
        let mut end = i + 1;
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }
        match &pattern[i + 1..end] {
            "yyyy" => out.push_str(&when.year().to_string()),
            "MM" => out.push_str(&format!("{:02}", when.month())),
            "dd" => out.push_str(&format!("{:02}", when.day())),
            "hh" => out.push_str(&format!("{:02}", when.hour())),
            "mm" => out.push_str(&format!("{:02}", when.minute())),
            _ => out.push_str(&pattern[i..end]),
        }
        i = end;
    }
    out
}
