// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hy_core::Level;

fn record(level: Level, message: &str) -> LogRecord {
    LogRecord {
        source: "webserver".into(),
        level,
        // 2023-11-14T22:13:20.000Z
        wall_ms: 1_700_000_000_000,
        mono: std::time::Instant::now(),
        thread_label: Some("acceptor".into()),
        message: message.to_string(),
    }
}

#[test]
fn line_has_all_fields_in_order() {
    let line = format_line(&record(Level::State, "listening on 0.0.0.0:8080"));
    assert_eq!(
        line,
        "2023-11-14T22:13:20.000+00:00 State webserver acceptor listening on 0.0.0.0:8080"
    );
}

#[test]
fn level_field_is_padded_to_six_chars() {
    let line = format_line(&record(Level::Error, "boom"));
    assert!(line.contains(" Error webserver "), "{line}");
}

#[test]
fn missing_thread_label_renders_as_dash() {
    let mut rec = record(Level::Debug, "hi");
    rec.thread_label = None;
    let line = format_line(&rec);
    assert!(line.contains(" webserver - hi"), "{line}");
}

#[test]
fn newlines_are_escaped() {
    let line = format_line(&record(Level::Alert, "first\nsecond\r\nthird"));
    assert!(!line.contains('\n'));
    assert!(line.ends_with("first\\nsecond\\r\\nthird"), "{line}");
}

#[test]
fn escape_is_identity_for_clean_messages() {
    assert_eq!(escape_message("plain"), "plain");
}
