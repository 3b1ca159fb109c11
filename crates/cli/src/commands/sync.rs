// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tasksync sync`: drain now, through the daemon if one is running.

use ts_core::DrainReport;

use super::{block_on, Project};
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(output: OutputFormat) -> Result<()> {
    let project = Project::find()?;
    let (report, strategy) = block_on(async {
        let service = project.open_service().await?;
        let report = service.trigger_sync().await?;
        Ok((report, service.background().name()))
    })?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for line in describe(&report) {
                println!("{}", line);
            }
            if strategy == "daemon" {
                println!("(drained by tasksyncd)");
            }
        }
    }
    Ok(())
}

/// Human summary of a drain.
pub(crate) fn describe(report: &DrainReport) -> Vec<String> {
    if report.skipped {
        return vec!["A sync is already running; this request was folded into it.".to_string()];
    }
    if report.snapshot == 0 {
        return vec!["Nothing to sync.".to_string()];
    }

    let mut lines = Vec::new();
    if report.attempted > 0 {
        lines.push(format!(
            "Replayed {} of {} pending action(s).",
            report.replayed, report.snapshot
        ));
    }
    if report.failed > 0 {
        lines.push(format!(
            "{} action(s) failed and stay queued.",
            report.failed
        ));
    }
    if report.interrupted {
        let reason = if report.attempted == 0 {
            "API unreachable"
        } else {
            "Connection lost"
        };
        lines.push(format!(
            "{}; {} action(s) left for the next sync.",
            reason,
            report.not_attempted()
        ));
    }
    lines
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
