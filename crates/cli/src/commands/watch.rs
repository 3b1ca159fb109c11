// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync loop: probe, replay on reconnect, poll.
//!
//! When a daemon is running for the project it owns replay, and `watch`
//! only reports connectivity.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use ts_core::DrainTrigger;

use super::{block_on, Project};
use crate::error::Result;
use crate::sync::{SyncService, Transition};

/// Who replays the queue while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// This process drains on reconnect and on the poll interval.
    Local,
    /// A running daemon drains; this process only probes.
    Daemon,
}

pub fn run() -> Result<()> {
    let project = Project::find()?;
    block_on(async {
        let service = project.open_service().await?;
        let replay = if service.background().name() == "daemon" {
            Replay::Daemon
        } else {
            Replay::Local
        };
        service.on_connectivity_change(|transition| println!("{}", transition_line(transition)));

        let state = service.connectivity();
        println!(
            "Watching {} ({}, {} pending). Press Ctrl-C to stop.",
            project.config.api_base_url,
            if state.is_online { "online" } else { "offline" },
            service.pending_count()?
        );
        if replay == Replay::Daemon {
            println!("Daemon is running; it replays pending actions.");
        }

        let cancel = CancellationToken::new();
        let tasks = spawn_watchers(
            &service,
            replay,
            project.config.probe_interval(),
            project.config.poll_interval(),
            &cancel,
        );

        if replay == Replay::Local && state.is_online && service.pending_count()? > 0 {
            let report = service.coordinator().drain(DrainTrigger::Manual).await?;
            for line in super::sync::describe(&report) {
                println!("{}", line);
            }
        }

        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
        cancel.cancel();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "watch task ended abnormally");
            }
        }
        Ok(())
    })
}

/// Start the probe loop and, for [`Replay::Local`], the reconnect and
/// polling drains. All stop when `cancel` fires.
pub(crate) fn spawn_watchers(
    service: &SyncService,
    replay: Replay,
    probe_interval: Duration,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    let mut tasks = Vec::new();
    let coordinator = service.coordinator();
    if replay == Replay::Local {
        // Subscribe before the first probe so its transition is seen.
        tasks.push(coordinator.spawn_on_reconnect(cancel.clone()));
    }
    tasks.push(tokio::spawn(Arc::clone(service.probe()).run(
        Arc::clone(service.monitor()),
        probe_interval,
        cancel.clone(),
    )));
    if replay == Replay::Local {
        tasks.push(tokio::spawn(
            Arc::clone(coordinator).run_polling(poll_interval, cancel.clone()),
        ));
    }
    tasks
}

pub(crate) fn transition_line(transition: Transition) -> &'static str {
    match transition {
        Transition::WentOnline => "API reachable; replaying pending actions.",
        Transition::WentOffline => "API unreachable; requests will be queued.",
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
