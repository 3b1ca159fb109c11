// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background replay strategies.
//!
//! Callers only see the [`BackgroundSync`] trait. [`DaemonSync`] hands the
//! work to a running `tasksyncd`; [`InlineSync`] drains in this process.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;
use ts_core::{DrainReport, DrainTrigger};

use super::coordinator::SyncCoordinator;
use crate::daemon::{connect_daemon, detect_daemon};
use crate::error::{Error, Result};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A way to get the pending queue drained.
pub trait BackgroundSync: Send + Sync {
    /// Short name for logs and `status` output.
    fn name(&self) -> &'static str;

    /// Ask for a drain once connectivity allows, under `tag`.
    fn register<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Drain now and report what happened.
    fn drain_queue(&self) -> BoxFuture<'_, Result<DrainReport>>;
}

/// Delegates draining to the project's daemon.
pub struct DaemonSync {
    daemon_dir: PathBuf,
}

impl DaemonSync {
    pub fn new(daemon_dir: impl Into<PathBuf>) -> Self {
        DaemonSync {
            daemon_dir: daemon_dir.into(),
        }
    }

    /// Run a blocking daemon round-trip off the async runtime.
    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let dir = self.daemon_dir.clone();
        tokio::task::spawn_blocking(move || f(&dir))
            .await
            .map_err(|e| Error::Daemon(format!("daemon call panicked: {}", e)))?
    }
}

impl BackgroundSync for DaemonSync {
    fn name(&self) -> &'static str {
        "daemon"
    }

    fn register<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, Result<()>> {
        let tag = tag.to_string();
        Box::pin(async move {
            self.call(move |dir| connect_daemon(dir)?.register_sync(&tag))
                .await?;
            debug!("sync registered with daemon");
            Ok(())
        })
    }

    fn drain_queue(&self) -> BoxFuture<'_, Result<DrainReport>> {
        Box::pin(self.call(|dir| connect_daemon(dir)?.sync_now()))
    }
}

/// Drains in the current process.
pub struct InlineSync {
    coordinator: Arc<SyncCoordinator>,
}

impl InlineSync {
    pub fn new(coordinator: Arc<SyncCoordinator>) -> Self {
        InlineSync { coordinator }
    }
}

impl BackgroundSync for InlineSync {
    fn name(&self) -> &'static str {
        "inline"
    }

    // Inline draining follows connectivity events, so there is nothing to
    // schedule.
    fn register<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            debug!(tag, "no daemon, replay waits for the next drain");
            Ok(())
        })
    }

    fn drain_queue(&self) -> BoxFuture<'_, Result<DrainReport>> {
        Box::pin(self.coordinator.drain(DrainTrigger::Manual))
    }
}

/// Use the daemon if one answers on `daemon_dir`, otherwise drain inline.
pub fn select_strategy(
    daemon_dir: &Path,
    coordinator: Arc<SyncCoordinator>,
) -> Arc<dyn BackgroundSync> {
    match detect_daemon(daemon_dir) {
        Ok(Some(info)) => {
            debug!(pid = info.pid, "using daemon for background sync");
            Arc::new(DaemonSync::new(daemon_dir))
        }
        Ok(None) => Arc::new(InlineSync::new(coordinator)),
        Err(e) => {
            debug!(error = %e, "daemon detection failed, draining inline");
            Arc::new(InlineSync::new(coordinator))
        }
    }
}

#[cfg(test)]
#[path = "background_tests.rs"]
mod tests;
