// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsync::{env, Cli};

fn main() {
    let cli = Cli::parse();

    if let Some(filter) = env::log_filter() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = tsync::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
