// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: spawn, detect, cleanup.
//!
//! The daemon (tasksyncd) runs in the background for one project and talks
//! to the CLI over a Unix socket. PID, socket, lock and log files live in the
//! daemon directory (`.tasksync/` unless `TASKSYNC_STATE_DIR` is set).

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use ts_ipc::DaemonStatus;

use super::client::DaemonClient;
use crate::env;
use crate::error::{Error, Result};

const SOCKET_NAME: &str = "daemon.sock";
const PID_NAME: &str = "daemon.pid";
const LOCK_NAME: &str = "daemon.lock";
const LOG_NAME: &str = "daemon.log";

/// Timeout for liveness checks.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Information about a running daemon.
#[derive(Debug, Clone)]
pub struct DaemonInfo {
    /// Process ID of the daemon.
    pub pid: u32,
}

pub fn get_socket_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(SOCKET_NAME)
}

pub fn get_pid_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(PID_NAME)
}

/// Lock file held for the daemon's whole lifetime.
pub fn get_lock_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(LOCK_NAME)
}

pub fn get_log_path(daemon_dir: &Path) -> PathBuf {
    daemon_dir.join(LOG_NAME)
}

/// Detect if a daemon is running for the given daemon directory.
///
/// Returns Some(DaemonInfo) if a daemon is running and responding,
/// None otherwise. Cleans up stale PID/socket files if found.
pub fn detect_daemon(daemon_dir: &Path) -> Result<Option<DaemonInfo>> {
    let socket_path = get_socket_path(daemon_dir);
    let pid_path = get_pid_path(daemon_dir);

    if !socket_path.exists() {
        if pid_path.exists() {
            let _ = fs::remove_file(&pid_path);
        }
        return Ok(None);
    }

    let alive = connect(&socket_path, PING_TIMEOUT)
        .and_then(|mut client| client.ping())
        .is_ok();
    if !alive {
        cleanup_stale_files(daemon_dir);
        return Ok(None);
    }

    // A missing PID file means the daemon is still starting up.
    match read_pid_file(&pid_path) {
        Some(pid) if pid > 0 => Ok(Some(DaemonInfo { pid })),
        _ => Ok(None),
    }
}

/// Get daemon status by connecting to the daemon.
pub fn get_daemon_status(daemon_dir: &Path) -> Result<Option<DaemonStatus>> {
    let socket_path = get_socket_path(daemon_dir);

    if !socket_path.exists() {
        return Ok(None);
    }

    match DaemonClient::connect(&socket_path) {
        Ok(mut client) => client.status().map(Some),
        Err(e) => {
            cleanup_stale_files(daemon_dir);
            Err(e)
        }
    }
}

/// Connect to the running daemon and check it speaks our version.
pub fn connect_daemon(daemon_dir: &Path) -> Result<DaemonClient> {
    let mut client = DaemonClient::connect(&get_socket_path(daemon_dir))?;
    client.handshake()?;
    Ok(client)
}

/// Send a shutdown request to the daemon.
fn stop_daemon(daemon_dir: &Path) -> Result<()> {
    let socket_path = get_socket_path(daemon_dir);

    if !socket_path.exists() {
        return Err(Error::Daemon("daemon is not running".to_string()));
    }

    connect(&socket_path, PING_TIMEOUT)?.shutdown()
}

fn connect(socket_path: &Path, timeout: Duration) -> Result<DaemonClient> {
    let client = DaemonClient::connect(socket_path)?;
    client.set_timeouts(timeout)?;
    Ok(client)
}

/// Find the tasksyncd binary.
fn find_daemon_binary() -> PathBuf {
    if let Some(path) = env::daemon_binary() {
        return path;
    }

    if let Ok(exe) = std::env::current_exe() {
        let daemon = exe.with_file_name("tasksyncd");
        if daemon.exists() {
            return daemon;
        }
    }

    PathBuf::from("tasksyncd")
}

/// Spawn a daemon for the project at `work_dir`.
///
/// Returns the running daemon if one is already up. The daemon itself takes
/// an exclusive lock, so racing spawns leave a single instance.
pub fn spawn_daemon(daemon_dir: &Path, work_dir: &Path) -> Result<DaemonInfo> {
    if let Some(info) = detect_daemon(daemon_dir)? {
        return Ok(info);
    }

    fs::create_dir_all(daemon_dir)?;

    let binary = find_daemon_binary();

    let mut child = Command::new(&binary)
        .arg("--state-dir")
        .arg(daemon_dir)
        .arg("--work-dir")
        .arg(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Daemon(format!(
                "failed to start tasksyncd ({}): {}",
                binary.display(),
                e
            ))
        })?;

    // The daemon prints READY once its socket is bound.
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    for _ in 0..150 {
        if let Ok(Some(status)) = child.try_wait() {
            let stderr_output = if let Some(mut stderr) = child.stderr.take() {
                use std::io::Read;
                let mut output = String::new();
                let _ = stderr.read_to_string(&mut output);
                output
            } else {
                String::new()
            };
            return Err(Error::Daemon(format!(
                "daemon process exited with status: {}\n{}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(info) = detect_daemon(daemon_dir)? {
            return Ok(info);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Daemon(
        "daemon failed to start: could not connect after multiple attempts".to_string(),
    ))
}

fn cleanup_stale_files(daemon_dir: &Path) {
    let _ = fs::remove_file(get_socket_path(daemon_dir));
    let _ = fs::remove_file(get_pid_path(daemon_dir));
}

fn read_pid_file(pid_path: &Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Stop the daemon, killing it if graceful shutdown fails.
///
/// Returns false if no daemon was running.
pub fn stop_daemon_forcefully(daemon_dir: &Path) -> Result<bool> {
    let pid = read_pid_file(&get_pid_path(daemon_dir));
    if pid.is_none() && !get_socket_path(daemon_dir).exists() {
        return Ok(false);
    }

    if stop_daemon(daemon_dir).is_ok() {
        if let Some(pid) = pid {
            wait_for_process_exit(pid, Duration::from_secs(1));
        }
        cleanup_stale_files(daemon_dir);
        return Ok(true);
    }

    if let Some(pid) = pid {
        let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
        std::thread::sleep(Duration::from_millis(100));
    }

    cleanup_stale_files(daemon_dir);
    Ok(true)
}

fn wait_for_process_exit(pid: u32, timeout: Duration) {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        let result = Command::new("kill").arg("-0").arg(pid.to_string()).output();

        match result {
            Ok(output) if !output.status.success() => return,
            Err(_) => return,
            _ => {}
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
