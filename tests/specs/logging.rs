// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log bus delivery and accounting specs.

use crate::prelude::*;
use hy_logbus::FileSink;

#[test]
fn every_record_is_delivered_or_counted() {
    let world = World::new();
    for i in 0..500 {
        world.ctx.bus.log("webserver", Level::Debug, format!("request {i}"));
    }
    world.ctx.bus.flush(Duration::from_secs(5));

    let delivered = world.out.messages_for("webserver").len() as u64;
    let dropped = world.ctx.bus.dropped_count("console");
    assert_eq!(delivered + dropped, 500);
}

#[test]
fn level_matrix_round_trips_and_filters_per_pair() {
    let world = World::new();
    world.ctx.bus.set_level("console", "mdns", Level::Quiet);
    assert_eq!(world.ctx.bus.get_level("console", "mdns"), Some(Level::Quiet));

    world.ctx.bus.log("mdns", Level::Fatal, "silenced");
    world.ctx.bus.log("webserver", Level::State, "heard");
    world.ctx.bus.flush(Duration::from_secs(2));

    assert!(world.out.messages_for("mdns").is_empty());
    assert_eq!(world.out.messages_for("webserver"), vec!["heard".to_string()]);
}

#[test]
fn file_sink_writes_the_documented_line_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hydrogen.log");

    let threads = ThreadRegistry::new();
    let bus = LogBusBuilder::new()
        .sink(Box::new(FileSink::open(&path, 0).expect("file sink")), Level::Trace)
        .start(Arc::new(SystemClock), &threads)
        .expect("bus");

    bus.log("webserver", Level::Alert, "split\nacross lines");
    bus.shutdown(Duration::from_secs(2));

    let contents = std::fs::read_to_string(&path).expect("log file");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1, "one record per line: {contents:?}");
    let line = lines[0];
    // ISO-8601 ms timestamp with offset, padded level, source, thread,
    // escaped message.
    assert!(line.contains("Alert webserver"), "{line}");
    assert!(line.ends_with("split\\nacross lines"), "{line}");
    let timestamp = line.split(' ').next().expect("timestamp field");
    assert!(timestamp.contains('T') && timestamp.contains("+00:00"), "{timestamp}");
    assert_eq!(timestamp.len(), "2023-11-14T22:13:20.000+00:00".len());
}

#[test]
fn landing_flushes_pending_records_before_exit() {
    let world = World::new();
    world.add(world.stub("net"));
    world.launch();
    world.ctx.bus.log("net", Level::State, "just before landing");
    let review = world.land();
    assert!(review.bus_drained);
    assert!(world
        .out
        .messages_for("net")
        .iter()
        .any(|m| m == "just before landing"));
}
