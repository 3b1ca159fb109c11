// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod daemon;
pub mod init;
pub mod pending;
pub mod request;
pub mod status;
pub mod sync;
pub mod watch;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::config::{find_work_dir, get_daemon_dir, get_db_path, Config};
use crate::error::{Error, Result};
use crate::sync::{select_strategy, ServiceParts, SyncService};

/// The project found from the current directory.
pub struct Project {
    pub work_dir: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn find() -> Result<Self> {
        let work_dir = find_work_dir()?;
        let config = Config::load(&work_dir)?;
        Ok(Project { work_dir, config })
    }

    pub fn daemon_dir(&self) -> PathBuf {
        get_daemon_dir(&self.work_dir)
    }

    /// Open the service without touching the network.
    ///
    /// Connectivity reads as offline; use for queue inspection only.
    pub fn open_local(&self) -> Result<SyncService> {
        let parts = ServiceParts::from_config(&self.config)?;
        SyncService::open(&get_db_path(&self.work_dir, &self.config), parts, false)
    }

    /// Open the service, probe the API, and pick the background strategy.
    pub async fn open_service(&self) -> Result<SyncService> {
        let service = SyncService::from_config(&self.work_dir, &self.config).await?;
        let background = select_strategy(&self.daemon_dir(), Arc::clone(service.coordinator()));
        Ok(service.with_background(background))
    }
}

/// Run an async command body to completion.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    rt.block_on(future)
}

/// Local wall-clock rendering of a millisecond timestamp.
pub fn format_time(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
