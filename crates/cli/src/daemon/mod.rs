// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The tasksyncd background worker: client side and runner.
//!
//! The CLI talks to the daemon over a Unix socket in the project's daemon
//! directory. The runner half is what `tasksyncd` executes.

mod client;
mod lifecycle;
mod runner;

pub use client::{DaemonClient, CLI_VERSION};
pub use lifecycle::{
    connect_daemon, detect_daemon, get_daemon_status, get_log_path, get_socket_path,
    spawn_daemon, stop_daemon_forcefully, DaemonInfo,
};
pub use runner::run_daemon;

#[cfg(test)]
pub(crate) mod fake_daemon;
