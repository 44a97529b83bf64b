// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log line formatting.
//!
//! One record per line: ISO-8601 timestamp with millisecond precision and
//! UTC offset, six-character space-padded level name, subsystem, thread
//! label, message. Newlines inside messages are escaped so the one-line
//! invariant holds.

use crate::record::LogRecord;
use chrono::{DateTime, SecondsFormat, Utc};

/// Render a record into the single-line file format.
pub fn format_line(record: &LogRecord) -> String {
    let timestamp = DateTime::<Utc>::from_timestamp_millis(record.wall_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, false);
    let thread = record.thread_label.as_deref().unwrap_or("-");
    format!(
        "{timestamp} {level}{source} {thread} {message}",
        level = record.level.padded(),
        source = record.source,
        message = escape_message(&record.message),
    )
}

/// Escape embedded line breaks as literal `\n` / `\r`.
pub fn escape_message(message: &str) -> String {
    if !message.contains(['\n', '\r']) {
        return message.to_string();
    }
    message.replace('\r', "\\r").replace('\n', "\\n")
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
