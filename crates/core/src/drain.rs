// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of one pass over the pending action queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What started a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainTrigger {
    /// Connectivity came back.
    Reconnect,
    /// Explicitly requested by a user or caller.
    Manual,
    /// Periodic poll while online.
    Poll,
    /// Requested through a registered background sync tag.
    Background,
}

impl fmt::Display for DrainTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrainTrigger::Reconnect => "reconnect",
            DrainTrigger::Manual => "manual",
            DrainTrigger::Poll => "poll",
            DrainTrigger::Background => "background",
        };
        write!(f, "{s}")
    }
}

/// Summary of a drain.
///
/// Replay failures are counted here rather than returned as errors; the
/// failed actions stay queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    pub trigger: DrainTrigger,
    pub started_at: u64,
    pub finished_at: u64,
    /// Actions in the snapshot taken at drain start.
    pub snapshot: usize,
    /// Replays actually issued.
    pub attempted: usize,
    /// Replays confirmed with a 2xx and removed from the queue.
    pub replayed: usize,
    /// Replays that failed and were left queued.
    pub failed: usize,
    /// Connectivity dropped and the rest of the snapshot was left for later.
    pub interrupted: bool,
    /// Another drain was already running, so this one did nothing.
    pub skipped: bool,
}

impl DrainReport {
    /// An empty report for a drain starting at `started_at`.
    pub fn new(trigger: DrainTrigger, started_at: u64) -> Self {
        DrainReport {
            trigger,
            started_at,
            finished_at: started_at,
            snapshot: 0,
            attempted: 0,
            replayed: 0,
            failed: 0,
            interrupted: false,
            skipped: false,
        }
    }

    /// Report for a trigger that was coalesced into an in-flight drain.
    pub fn skipped(trigger: DrainTrigger, now_ms: u64) -> Self {
        DrainReport { skipped: true, ..DrainReport::new(trigger, now_ms) }
    }

    /// Actions from the snapshot that were not attempted.
    pub fn not_attempted(&self) -> usize {
        self.snapshot.saturating_sub(self.attempted)
    }

    /// True when every action in the snapshot was replayed.
    pub fn is_complete(&self) -> bool {
        !self.skipped && self.replayed == self.snapshot
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
