// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection: `pending`, `count` and `discard`.
//!
//! None of these touch the network.

use ts_core::{ActionId, PendingAction};

use super::{format_time, Project};
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn list(output: OutputFormat) -> Result<()> {
    let service = Project::find()?.open_local()?;
    let actions = service.list_pending()?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&actions)?),
        OutputFormat::Text => {
            if actions.is_empty() {
                println!("No pending actions.");
            }
            for action in &actions {
                println!("{}", format_action(action));
            }
        }
    }
    Ok(())
}

pub fn count() -> Result<()> {
    let service = Project::find()?.open_local()?;
    println!("{}", service.pending_count()?);
    Ok(())
}

pub fn discard(id: &str) -> Result<()> {
    let id = ActionId::parse(id)?;
    let service = Project::find()?.open_local()?;
    service.discard(&id)?;
    println!("Discarded {}", id);
    Ok(())
}

/// One line per action: id, time queued, method and URL.
pub(crate) fn format_action(action: &PendingAction) -> String {
    let size = if action.body.is_empty() {
        String::new()
    } else {
        format!(" ({} bytes)", action.body.len())
    };
    format!(
        "{}  {}  {:<6} {}{}",
        action.id,
        format_time(action.enqueued_at),
        action.method.as_str(),
        action.url,
        size
    )
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
