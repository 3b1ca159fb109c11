// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Holds the process's view of whether the API is reachable and when the
//! queue was last drained. Reachability is fed in through
//! [`ConnectivityMonitor::observe`] (by the probe loop, or a test);
//! handlers registered with [`ConnectivityMonitor::on_transition`] fire once
//! per actual change.
//!
//! Each handler invocation runs on its own blocking task (or thread when no
//! tokio runtime is present), so a handler that hangs or panics does not
//! delay the others or the caller of `observe`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};
use ts_core::{Database, Result};

/// `sync_meta` key holding the last completed drain time.
const LAST_SYNC_KEY: &str = "last_sync_time";

/// Capacity of the transition broadcast channel.
const EVENT_CAPACITY: usize = 16;

/// Snapshot of connectivity and sync progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectivityState {
    pub is_online: bool,
    /// Milliseconds since Unix epoch when the last drain finished.
    pub last_sync_time: Option<u64>,
}

/// A change in reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

impl Transition {
    pub fn is_online(&self) -> bool {
        matches!(self, Transition::WentOnline)
    }
}

/// Handle returned by [`ConnectivityMonitor::on_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(Transition) + Send + Sync>;

pub struct ConnectivityMonitor {
    online: AtomicBool,
    last_sync: Mutex<Option<u64>>,
    store: Option<Mutex<Database>>,
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
    events: broadcast::Sender<Transition>,
}

impl ConnectivityMonitor {
    /// A monitor with no persistence, starting in the given state.
    pub fn new(initially_online: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConnectivityMonitor {
            online: AtomicBool::new(initially_online),
            last_sync: Mutex::new(None),
            store: None,
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// A monitor that persists `last_sync_time` in `sync_meta`.
    pub fn with_store(initially_online: bool, db: Database) -> Result<Self> {
        let last_sync = db
            .get_meta(LAST_SYNC_KEY)?
            .and_then(|v| v.parse::<u64>().ok());
        let mut monitor = Self::new(initially_online);
        monitor.last_sync = Mutex::new(last_sync);
        monitor.store = Some(Mutex::new(db));
        Ok(monitor)
    }

    fn last_sync(&self) -> MutexGuard<'_, Option<u64>> {
        self.last_sync.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Handler)>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> ConnectivityState {
        ConnectivityState {
            is_online: self.is_online(),
            last_sync_time: *self.last_sync(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Feed a reachability reading.
    ///
    /// Returns true if the reading changed the state, in which case every
    /// handler is invoked once and subscribers receive the transition.
    pub fn observe(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }

        let transition = if online {
            Transition::WentOnline
        } else {
            Transition::WentOffline
        };
        info!(online, "connectivity changed");

        let handlers: Vec<Handler> = self.handlers().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in handlers {
            dispatch(handler, transition);
        }
        // No receivers is fine.
        let _ = self.events.send(transition);
        true
    }

    /// Register a handler invoked once per transition.
    pub fn on_transition<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(Transition) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    /// Ordered stream of transitions for async consumers.
    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.events.subscribe()
    }

    /// Record that a drain finished at `timestamp_ms`.
    ///
    /// Persistence failures are logged; the in-memory value is always updated.
    pub fn record_sync_completion(&self, timestamp_ms: u64) {
        *self.last_sync() = Some(timestamp_ms);

        if let Some(store) = &self.store {
            let db = store.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = db.set_meta(LAST_SYNC_KEY, &timestamp_ms.to_string()) {
                warn!(error = %e, "failed to persist last sync time");
            }
        }
    }
}

fn dispatch(handler: Handler, transition: Transition) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn_blocking(move || handler(transition));
        }
        Err(_) => {
            std::thread::spawn(move || handler(transition));
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
