// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::bus::LogBusBuilder;
use crate::test_util::CaptureSink;
use hy_core::SystemClock;
use hy_threads::ThreadRegistry;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn facade_records_land_under_the_ext_source() {
    let registry = ThreadRegistry::new();
    let (sink, out) = CaptureSink::new("console");
    let bus = LogBusBuilder::new()
        .sink(Box::new(sink), Level::Trace)
        .start(Arc::new(SystemClock), &registry)
        .unwrap();

    // The facade is process-global; a second test in this binary cannot
    // install another logger, so everything facade-related lives here.
    init_facade(bus.clone()).unwrap();
    log::warn!(target: "hyper", "connection reset");
    assert!(bus.flush(Duration::from_secs(2)));

    let records = out.records();
    assert_eq!(records.len(), 1);
    let (source, level, message) = &records[0];
    assert_eq!(source, "ext");
    assert_eq!(*level, Level::Alert);
    assert_eq!(message, "hyper: connection reset");
}
