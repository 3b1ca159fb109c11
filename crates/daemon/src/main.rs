// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tasksyncd - The tasksync daemon.
//!
//! Keeps a project's offline queue moving: probes the API, replays pending
//! actions when it comes back, and answers `tasksync` over a Unix socket.
//!
//! Usage:
//!   tasksyncd --work-dir <path> [--state-dir <path>]

use std::fs;
use std::path::{Path, PathBuf};

use tsync::config::{find_work_dir, get_daemon_dir};
use tsync::daemon::{get_log_path, run_daemon};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let work_dir = match parse_flag(&args, "--work-dir") {
        Some(dir) => dir,
        None => match find_work_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("tasksyncd: {}", e);
                std::process::exit(1);
            }
        },
    };
    let state_dir = parse_flag(&args, "--state-dir").unwrap_or_else(|| get_daemon_dir(&work_dir));

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("tasksyncd: failed to create {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }
    setup_logging(&get_log_path(&state_dir));

    tracing::info!(
        "tasksyncd starting, work_dir={}, state_dir={}",
        work_dir.display(),
        state_dir.display()
    );

    if let Err(e) = run_daemon(&state_dir, &work_dir) {
        tracing::error!("daemon failed: {}", e);
        eprintln!("tasksyncd: {}", e);
        std::process::exit(1);
    }

    tracing::info!("tasksyncd stopped");
}

fn parse_flag(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(tsync::env::vars::TASKSYNC_LOG)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Fall back to stderr when the log file cannot be opened
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
