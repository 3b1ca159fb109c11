// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon runner: main loop and IPC handling.
//!
//! The daemon:
//! 1. Acquires flock for single instance
//! 2. Creates Unix socket for IPC
//! 3. Probes the API and tracks connectivity
//! 4. Drains the queue on reconnect, on a poll timer, and when asked

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ts_core::DrainTrigger;
use ts_ipc::{framing_async, DaemonRequest, DaemonResponse, DaemonStatus};

use super::lifecycle::{get_lock_path, get_pid_path, get_socket_path};
use crate::config::{get_db_path, Config};
use crate::error::{Error, Result};
use crate::sync::{ServiceParts, SyncCoordinator, SyncService};

/// State shared by IPC handlers.
struct DaemonState {
    service: Arc<SyncService>,
    /// Wakes the registered-drain task.
    wake: Arc<Notify>,
    shutdown: CancellationToken,
    pid: u32,
    start_time: Instant,
}

/// Run the daemon for the project at `work_dir`.
///
/// This function blocks until shutdown is requested.
///
/// # Arguments
/// * `daemon_dir` - Directory for daemon files (socket, pid, lock, log)
/// * `work_dir` - The project's `.tasksync` directory
pub fn run_daemon(daemon_dir: &Path, work_dir: &Path) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(run_daemon_async(daemon_dir, work_dir))
}

async fn run_daemon_async(daemon_dir: &Path, work_dir: &Path) -> Result<()> {
    let config = Config::load(work_dir)?;
    fs::create_dir_all(daemon_dir)?;

    let lock_path = get_lock_path(daemon_dir);
    let socket_path = get_socket_path(daemon_dir);
    let pid_path = get_pid_path(daemon_dir);

    let lock_file = acquire_lock(&lock_path)?;

    let pid = std::process::id();
    fs::write(&pid_path, pid.to_string())?;

    let _ = fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;

    // Signal ready early so IPC is responsive before the first probe returns.
    println!("READY");
    let _ = std::io::stdout().flush();

    // Start offline; the probe loop's first reading flips the state and the
    // reconnect task drains anything left from earlier runs.
    let parts = ServiceParts::from_config(&config)?;
    let service = Arc::new(SyncService::open(&get_db_path(work_dir, &config), parts, false)?);
    info!(
        pid,
        api = %config.api_base_url,
        pending = service.pending_count()?,
        "daemon started"
    );

    let shutdown = CancellationToken::new();
    let (wake, workers) = spawn_workers(&service, &config, &shutdown);

    let state = Arc::new(DaemonState {
        service,
        wake,
        shutdown: shutdown.clone(),
        pid,
        start_time: Instant::now(),
    });

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => match result {
                Ok((stream, _)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, &state).await {
                            debug!(error = %e, "ipc connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "failed to accept ipc connection"),
            },
        }
    }

    info!("daemon shutting down");
    for worker in workers {
        if let Err(e) = worker.await {
            warn!(error = %e, "worker task ended abnormally");
        }
    }
    drop(lock_file);
    let _ = fs::remove_file(&socket_path);
    let _ = fs::remove_file(&pid_path);

    Ok(())
}

/// Start the probe, reconnect, polling and registered-drain tasks.
///
/// Returns the handle that wakes the registered-drain task and the task
/// handles to join at shutdown.
fn spawn_workers(
    service: &Arc<SyncService>,
    config: &Config,
    shutdown: &CancellationToken,
) -> (Arc<Notify>, Vec<JoinHandle<()>>) {
    let coordinator = Arc::clone(service.coordinator());

    // Subscribe before the first probe so its transition is seen.
    let reconnect = coordinator.spawn_on_reconnect(shutdown.clone());
    let probe = tokio::spawn(Arc::clone(service.probe()).run(
        Arc::clone(service.monitor()),
        config.probe_interval(),
        shutdown.clone(),
    ));
    let polling = tokio::spawn(
        Arc::clone(&coordinator).run_polling(config.poll_interval(), shutdown.clone()),
    );

    let wake = Arc::new(Notify::new());
    let registered = tokio::spawn(run_registered_drains(
        coordinator,
        Arc::clone(&wake),
        shutdown.clone(),
    ));
    (wake, vec![reconnect, probe, polling, registered])
}

/// Drain once per burst of `RegisterSync` requests.
///
/// Registrations that arrive while offline are satisfied by the reconnect
/// drain instead.
async fn run_registered_drains(
    coordinator: Arc<SyncCoordinator>,
    wake: Arc<Notify>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = wake.notified() => {}
        }
        if !coordinator.monitor().is_online() {
            debug!("offline, registered sync waits for reconnect");
            continue;
        }
        if let Err(e) = coordinator.drain(DrainTrigger::Background).await {
            warn!(error = %e, "registered drain failed");
        }
    }
}

/// Answer requests on one connection until the client hangs up.
async fn serve_connection(mut stream: UnixStream, state: &DaemonState) -> Result<()> {
    loop {
        let request = match framing_async::read_request(&mut stream).await {
            Ok(request) => request,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let response = handle_request(request, state).await;
        framing_async::write_response(&mut stream, &response).await?;
    }
}

async fn handle_request(request: DaemonRequest, state: &DaemonState) -> DaemonResponse {
    match request {
        DaemonRequest::Status => match status(state) {
            Ok(status) => DaemonResponse::Status(status),
            Err(e) => DaemonResponse::Error {
                message: e.to_string(),
            },
        },
        DaemonRequest::RegisterSync { tag } => {
            debug!(%tag, "sync registered");
            state.wake.notify_one();
            DaemonResponse::SyncRegistered { tag }
        }
        DaemonRequest::SyncNow => {
            match state.service.coordinator().drain(DrainTrigger::Manual).await {
                Ok(report) => DaemonResponse::SyncCompleted(report),
                Err(e) => DaemonResponse::Error {
                    message: e.to_string(),
                },
            }
        }
        DaemonRequest::Shutdown => {
            state.shutdown.cancel();
            DaemonResponse::ShuttingDown
        }
        DaemonRequest::Ping => DaemonResponse::Pong,
        DaemonRequest::Hello { .. } => DaemonResponse::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }
}

fn status(state: &DaemonState) -> Result<DaemonStatus> {
    let connectivity = state.service.connectivity();
    let mut status = DaemonStatus::new(state.pid, state.start_time.elapsed().as_secs());
    status.online = connectivity.is_online;
    status.last_sync_time = connectivity.last_sync_time;
    status.pending_actions = state.service.pending_count()?;
    status.last_report = state.service.coordinator().last_report();
    Ok(status)
}

/// Acquire an exclusive lock on the lock file.
fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    // Non-blocking: a second daemon for the same directory exits here.
    file.try_lock_exclusive()
        .map_err(|e| Error::Io(std::io::Error::other(format!("lock already held: {}", e))))?;

    Ok(file)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
