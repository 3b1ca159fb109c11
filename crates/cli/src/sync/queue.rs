// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of deferred mutating requests.
//!
//! Backed by the `pending_actions` table. Every enqueue is committed before
//! it returns (the database runs with `synchronous=FULL`), so an action that
//! was reported as deferred survives a crash or restart. Actions are only
//! ever inserted and deleted.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use ts_core::{
    ActionId, ActionRequest, ClockSource, Database, Error, IdClock, PendingAction, Result,
    SystemClock,
};

use super::auth;

/// Attempts at finding a free id when another writer shares the database.
const MAX_ID_ATTEMPTS: usize = 16;

/// Persistent FIFO of [`PendingAction`]s.
pub struct ActionQueue {
    db: Mutex<Database>,
    ids: IdClock<Arc<dyn ClockSource>>,
}

impl ActionQueue {
    /// Open a queue over `db` using the system clock.
    pub fn new(db: Database) -> Result<Self> {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    /// Open a queue with a custom clock.
    ///
    /// The id clock is seeded past the newest stored id so ids keep
    /// increasing across restarts even if the wall clock went backwards.
    pub fn with_clock(db: Database, clock: Arc<dyn ClockSource>) -> Result<Self> {
        let ids = IdClock::with_clock(clock);
        if let Some(latest) = db.latest_action_id()? {
            ids.observe(&latest);
        }
        Ok(ActionQueue {
            db: Mutex::new(db),
            ids,
        })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist a request for later replay and return its id.
    ///
    /// Any `Authorization` header is dropped; credentials are re-applied at
    /// replay time.
    pub fn enqueue(&self, mut request: ActionRequest) -> Result<ActionId> {
        auth::strip(&mut request.headers);
        let db = self.db();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let id = self.ids.next_id();
            let action = PendingAction::new(id, request.clone(), id.wall_ms);
            match db.insert_action(&action) {
                Ok(()) => {
                    debug!(id = %id, method = %action.method, url = %action.url, "action enqueued");
                    return Ok(id);
                }
                // Another process sharing the file took this id.
                Err(Error::DuplicateAction(_)) if attempt < MAX_ID_ATTEMPTS => {
                    if let Some(latest) = db.latest_action_id()? {
                        self.ids.observe(&latest);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// All pending actions in replay order.
    pub fn list_all(&self) -> Result<Vec<PendingAction>> {
        self.db().list_actions()
    }

    pub fn get(&self, id: &ActionId) -> Result<Option<PendingAction>> {
        self.db().get_action(id)
    }

    /// Delete an action. Removing an absent id is not an error.
    ///
    /// Returns true if the action was present.
    pub fn remove(&self, id: &ActionId) -> Result<bool> {
        let removed = self.db().delete_action(id)?;
        if removed {
            debug!(id = %id, "action removed");
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        self.db().count_actions()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
