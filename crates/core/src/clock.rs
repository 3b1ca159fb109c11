// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Monotonic action ids.
//!
//! An [`ActionId`] pairs a wall clock reading with a sequence number so that
//! ids handed out by one [`IdClock`] sort in the order they were issued, even
//! when several are issued within the same millisecond or the wall clock
//! steps backwards.
//!
//! Format: `{wall_ms}-{seq}`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Identifier of a pending action.
///
/// Ordering is by `wall_ms`, then `seq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Sequence number among ids issued in the same millisecond.
    pub seq: u32,
}

impl ActionId {
    /// Creates an id from its components.
    pub fn new(wall_ms: u64, seq: u32) -> Self {
        ActionId { wall_ms, seq }
    }

    /// Parses an id from its string representation.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wall_ms, self.seq)
    }
}

impl FromStr for ActionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (wall, seq) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidActionId(format!("expected 'wall_ms-seq', got '{s}'")))?;

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidActionId(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let seq = seq
            .parse::<u32>()
            .map_err(|_| Error::InvalidActionId(format!("invalid seq '{seq}' in '{s}'")))?;

        Ok(ActionId::new(wall_ms, seq))
    }
}

impl TryFrom<String> for ActionId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ActionId> for String {
    fn from(id: ActionId) -> Self {
        id.to_string()
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a controllable clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: ClockSource + ?Sized> ClockSource for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(initial_ms: u64) -> Self {
        ManualClock { time_ms: AtomicU64::new(initial_ms) }
    }

    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, AtomicOrdering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, AtomicOrdering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(AtomicOrdering::SeqCst)
    }
}

/// Generator of strictly increasing [`ActionId`]s.
pub struct IdClock<C: ClockSource = SystemClock> {
    clock: C,
    last_wall_ms: Mutex<u64>,
    last_seq: AtomicU32,
}

impl IdClock<SystemClock> {
    /// Creates an id clock backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for IdClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockSource> IdClock<C> {
    /// Creates an id clock with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        IdClock { clock, last_wall_ms: Mutex::new(0), last_seq: AtomicU32::new(0) }
    }

    /// Current wall clock reading of the underlying source.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Issues the next id.
    ///
    /// Never returns an id less than or equal to one previously issued or
    /// observed, even if the wall clock goes backwards.
    pub fn next_id(&self) -> ActionId {
        let physical = self.clock.now_ms();
        let mut last_ms = self.last_wall_ms.lock().unwrap_or_else(|e| e.into_inner());

        if physical > *last_ms {
            *last_ms = physical;
            self.last_seq.store(0, AtomicOrdering::SeqCst);
            ActionId::new(physical, 0)
        } else {
            let seq = self.last_seq.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            ActionId::new(*last_ms, seq)
        }
    }

    /// Advances the clock past an id issued elsewhere (e.g. loaded from disk).
    pub fn observe(&self, id: &ActionId) {
        let mut last_ms = self.last_wall_ms.lock().unwrap_or_else(|e| e.into_inner());

        if id.wall_ms > *last_ms {
            *last_ms = id.wall_ms;
            self.last_seq.store(id.seq, AtomicOrdering::SeqCst);
        } else if id.wall_ms == *last_ms {
            self.last_seq.fetch_max(id.seq, AtomicOrdering::SeqCst);
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
