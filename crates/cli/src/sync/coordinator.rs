// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync coordinator: replays the pending action queue.
//!
//! A drain takes one snapshot of the queue and replays it in order, one
//! request at a time. A 2xx removes the action; anything else leaves it for
//! the next drain and the pass continues. If connectivity drops, the replay
//! in flight finishes and the rest of the snapshot is left queued.
//!
//! At most one drain runs at a time. A trigger that arrives while a drain is
//! running is coalesced into it and gets a `skipped` report. With a drain
//! lock file configured the same holds across processes sharing the queue.
//!
//! With a probe configured, a replay that fails at the transport re-checks
//! reachability so a dropped connection stops the pass.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ts_core::{ClockSource, DrainReport, DrainTrigger, PendingAction, SystemClock};

use super::auth::{self, CredentialSource};
use super::monitor::ConnectivityMonitor;
use super::probe::ReachabilityProbe;
use super::queue::ActionQueue;
use super::transport::{HttpRequest, Transport};
use crate::error::{Error, Result};

/// Why one replay did not remove its action.
enum ReplayFailure {
    Status(u16),
    Transport(String),
    Storage(String),
}

pub struct SyncCoordinator {
    queue: Arc<ActionQueue>,
    transport: Arc<dyn Transport>,
    monitor: Arc<ConnectivityMonitor>,
    credentials: Arc<dyn CredentialSource>,
    clock: Arc<dyn ClockSource>,
    probe: Option<Arc<ReachabilityProbe>>,
    drain_lock: Option<PathBuf>,
    gate: tokio::sync::Mutex<()>,
    last_report: Mutex<Option<DrainReport>>,
}

impl SyncCoordinator {
    pub fn new(
        queue: Arc<ActionQueue>,
        transport: Arc<dyn Transport>,
        monitor: Arc<ConnectivityMonitor>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self::with_clock(queue, transport, monitor, credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        queue: Arc<ActionQueue>,
        transport: Arc<dyn Transport>,
        monitor: Arc<ConnectivityMonitor>,
        credentials: Arc<dyn CredentialSource>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        SyncCoordinator {
            queue,
            transport,
            monitor,
            credentials,
            clock,
            probe: None,
            drain_lock: None,
            gate: tokio::sync::Mutex::new(()),
            last_report: Mutex::new(None),
        }
    }

    /// Re-check reachability with `probe` after a replay transport failure.
    pub fn with_probe(mut self, probe: Arc<ReachabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Hold an exclusive lock on `path` for the length of each drain.
    ///
    /// Every process draining the same queue must use the same path.
    pub fn with_drain_lock(mut self, path: impl Into<PathBuf>) -> Self {
        self.drain_lock = Some(path.into());
        self
    }

    pub fn drain_lock_path(&self) -> Option<&Path> {
        self.drain_lock.as_deref()
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn queue(&self) -> &Arc<ActionQueue> {
        &self.queue
    }

    /// True while a drain is running.
    pub fn is_draining(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Report of the most recent drain that was not skipped.
    pub fn last_report(&self) -> Option<DrainReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Run one drain pass.
    ///
    /// Replay failures are counted in the report; only a failure to read the
    /// queue is returned as an error.
    pub async fn drain(&self, trigger: DrainTrigger) -> Result<DrainReport> {
        let Ok(_running) = self.gate.try_lock() else {
            debug!(%trigger, "drain already running, trigger coalesced");
            return Ok(DrainReport::skipped(trigger, self.clock.now_ms()));
        };
        let _locked = match &self.drain_lock {
            Some(path) => match try_lock_drain(path)? {
                Some(file) => Some(file),
                None => {
                    debug!(%trigger, path = %path.display(), "another process is draining");
                    return Ok(DrainReport::skipped(trigger, self.clock.now_ms()));
                }
            },
            None => None,
        };

        let mut report = DrainReport::new(trigger, self.clock.now_ms());
        let snapshot = self.queue.list_all().map_err(Error::Storage)?;
        report.snapshot = snapshot.len();

        for action in &snapshot {
            if !self.monitor.is_online() {
                report.interrupted = true;
                info!(
                    remaining = report.not_attempted(),
                    "connectivity lost, stopping drain"
                );
                break;
            }

            report.attempted += 1;
            match self.replay(action).await {
                Ok(()) => report.replayed += 1,
                Err(failure) => {
                    report.failed += 1;
                    match failure {
                        ReplayFailure::Status(status) => {
                            warn!(id = %action.id, status, "replay rejected, action kept")
                        }
                        ReplayFailure::Transport(e) => {
                            warn!(id = %action.id, error = %e, "replay failed, action kept");
                            if let Some(probe) = &self.probe {
                                probe.probe_into(&self.monitor).await;
                            }
                        }
                        ReplayFailure::Storage(e) => {
                            warn!(id = %action.id, error = %e, "replayed but not removed")
                        }
                    }
                }
            }
        }

        report.finished_at = self.clock.now_ms();
        self.monitor.record_sync_completion(report.finished_at);
        info!(
            %trigger,
            snapshot = report.snapshot,
            replayed = report.replayed,
            failed = report.failed,
            interrupted = report.interrupted,
            "drain finished"
        );

        *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());
        Ok(report)
    }

    async fn replay(&self, action: &PendingAction) -> std::result::Result<(), ReplayFailure> {
        let mut wire = HttpRequest::from_action(&action.request());
        auth::apply(&mut wire.headers, self.credentials.as_ref());
        debug!(id = %action.id, method = %action.method, url = %action.url, "replaying");

        let response = self
            .transport
            .send(wire)
            .await
            .map_err(|e| ReplayFailure::Transport(e.to_string()))?;
        if !response.is_success() {
            return Err(ReplayFailure::Status(response.status));
        }
        self.queue
            .remove(&action.id)
            .map_err(|e| ReplayFailure::Storage(e.to_string()))?;
        Ok(())
    }

    /// Drain whenever connectivity comes back, until cancelled.
    pub fn spawn_on_reconnect(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        let mut events = self.monitor.subscribe();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => event,
                };
                let reconnected = match event {
                    Ok(transition) => transition.is_online(),
                    // Missed some transitions; act on the current state.
                    Err(RecvError::Lagged(_)) => coordinator.monitor.is_online(),
                    Err(RecvError::Closed) => break,
                };
                if reconnected {
                    if let Err(e) = coordinator.drain(DrainTrigger::Reconnect).await {
                        warn!(error = %e, "reconnect drain failed");
                    }
                }
            }
        })
    }

    /// Drain every `interval` while online with work queued, until cancelled.
    pub async fn run_polling(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
            if !self.monitor.is_online() {
                continue;
            }
            match self.queue.count() {
                Ok(0) => {}
                Ok(_) => {
                    if let Err(e) = self.drain(DrainTrigger::Poll).await {
                        warn!(error = %e, "poll drain failed");
                    }
                }
                Err(e) => warn!(error = %e, "failed to count pending actions"),
            }
        }
    }
}

/// Take the drain lock without blocking. `None` if another holder has it.
fn try_lock_drain(path: &Path) -> Result<Option<File>> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(Some(file)),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
