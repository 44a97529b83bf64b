// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use hy_daemon::run::{run, Args};

fn main() {
    std::process::exit(run(Args::parse()));
}
