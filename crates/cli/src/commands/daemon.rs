// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands.
//!
//! The daemon owns the project's background drains: it probes the API,
//! replays pending actions on reconnect, and serves sync requests.

use super::{format_time, Project};
use crate::daemon;
use crate::error::{Error, Result};

/// Show daemon status.
pub fn status() -> Result<()> {
    let project = Project::find()?;

    match daemon::get_daemon_status(&project.daemon_dir()) {
        Ok(Some(status)) => {
            println!("Status: running");
            println!("PID: {}", status.pid);
            println!("Uptime: {}s", status.uptime_secs);
            println!("API: {}", if status.online { "online" } else { "offline" });
            println!("Pending: {}", status.pending_actions);
            println!(
                "Last sync: {}",
                status
                    .last_sync_time
                    .map(format_time)
                    .unwrap_or_else(|| "never".to_string())
            );
        }
        Ok(None) => {
            println!("Status: not running");
        }
        Err(e) => {
            println!("Status: error ({})", e);
        }
    }

    Ok(())
}

/// Stop the daemon.
pub fn stop() -> Result<()> {
    let project = Project::find()?;

    match daemon::stop_daemon_forcefully(&project.daemon_dir()) {
        Ok(true) => println!("Daemon stopped."),
        Ok(false) => println!("Daemon is not running."),
        Err(e) => println!("Failed to stop daemon: {}", e),
    }

    Ok(())
}

/// Start the daemon.
pub fn start() -> Result<()> {
    let project = Project::find()?;
    let daemon_dir = project.daemon_dir();

    match daemon::detect_daemon(&daemon_dir)? {
        Some(info) => {
            println!("Daemon is already running (PID: {})", info.pid);
        }
        None => match daemon::spawn_daemon(&daemon_dir, &project.work_dir) {
            Ok(info) => {
                println!("Daemon started (PID: {})", info.pid);
            }
            Err(e) => {
                return Err(Error::Daemon(format!("failed to start daemon: {}", e)));
            }
        },
    }

    Ok(())
}

/// View daemon logs.
pub fn logs(follow: bool) -> Result<()> {
    let project = Project::find()?;
    let log_path = daemon::get_log_path(&project.daemon_dir());

    if !log_path.exists() {
        println!("No daemon logs found at {}", log_path.display());
        return Ok(());
    }

    if follow {
        let status = std::process::Command::new("tail")
            .arg("-f")
            .arg(&log_path)
            .status()?;

        if !status.success() {
            return Err(Error::Io(std::io::Error::other("tail command failed")));
        }
    } else {
        print!("{}", std::fs::read_to_string(&log_path)?);
    }

    Ok(())
}
