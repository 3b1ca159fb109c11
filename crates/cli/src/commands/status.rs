// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use ts_ipc::DaemonStatus;

use super::{block_on, format_time, Project};
use crate::cli::OutputFormat;
use crate::daemon;
use crate::error::Result;
use crate::sync::SyncService;

#[derive(Debug, Serialize)]
pub(crate) struct StatusView {
    pub api: String,
    pub online: bool,
    pub pending_actions: usize,
    pub last_sync_time: Option<u64>,
    pub daemon: Option<DaemonStatus>,
}

pub fn run(output: OutputFormat) -> Result<()> {
    let project = Project::find()?;
    let (online, pending, last_sync) = block_on(async {
        let service = SyncService::from_config(&project.work_dir, &project.config).await?;
        let state = service.connectivity();
        Ok((state.is_online, service.pending_count()?, state.last_sync_time))
    })?;

    let view = StatusView {
        api: project.config.api_base_url.clone(),
        online,
        pending_actions: pending,
        last_sync_time: last_sync,
        daemon: daemon::get_daemon_status(&project.daemon_dir())
            .ok()
            .flatten(),
    };

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => {
            for line in render(&view) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub(crate) fn render(view: &StatusView) -> Vec<String> {
    let reachability = if view.online { "online" } else { "offline" };
    let last_sync = view
        .last_sync_time
        .map(format_time)
        .unwrap_or_else(|| "never".to_string());
    let daemon = match &view.daemon {
        Some(status) => format!(
            "running (PID: {}, uptime: {}s)",
            status.pid, status.uptime_secs
        ),
        None => "not running".to_string(),
    };

    vec![
        format!("API: {} ({})", view.api, reachability),
        format!("Pending: {}", view.pending_actions),
        format!("Last sync: {}", last_sync),
        format!("Daemon: {}", daemon),
    ]
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
