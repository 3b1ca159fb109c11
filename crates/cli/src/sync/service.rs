// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync service facade.
//!
//! [`SyncService`] wires the queue, cache, monitor, interceptor and
//! coordinator to one database file and is what commands and the daemon
//! use. Each component opens its own connection to the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use ts_core::{
    join_url, ActionId, ClockSource, Database, DrainReport, PendingAction, SystemClock,
};
use ts_ipc::SYNC_TAG;

use super::auth::{CredentialSource, EnvCredential, NoCredential};
use super::background::{BackgroundSync, InlineSync};
use super::cache::{CachePolicy, ResponseCache};
use super::coordinator::SyncCoordinator;
use super::interceptor::{ApiRequest, RequestInterceptor, RequestOutcome};
use super::monitor::{ConnectivityMonitor, ConnectivityState, SubscriptionId, Transition};
use super::probe::ReachabilityProbe;
use super::queue::ActionQueue;
use super::transport::{HttpTransport, Transport};
use crate::config::{get_db_path, Config};
use crate::error::{Error, Result};

/// Collaborators and settings for a [`SyncService`].
pub struct ServiceParts {
    pub transport: Arc<dyn Transport>,
    pub credentials: Arc<dyn CredentialSource>,
    pub clock: Arc<dyn ClockSource>,
    pub base_url: String,
    pub health_path: String,
    pub cache_policy: CachePolicy,
}

impl ServiceParts {
    /// Unauthenticated parts with default settings.
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        ServiceParts {
            transport,
            credentials: Arc::new(NoCredential),
            clock: Arc::new(SystemClock),
            base_url: base_url.into(),
            health_path: "/health".to_string(),
            cache_policy: CachePolicy::default(),
        }
    }

    /// Parts for talking to the API described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(ServiceParts {
            transport: Arc::new(transport),
            credentials: Arc::new(EnvCredential::new(config.token_env.clone())),
            clock: Arc::new(SystemClock),
            base_url: config.api_base_url.clone(),
            health_path: config.health_path.clone(),
            cache_policy: CachePolicy {
                ttl: config.cache_ttl(),
                max_entries: config.cache_max_entries,
            },
        })
    }
}

pub struct SyncService {
    base_url: String,
    queue: Arc<ActionQueue>,
    cache: Arc<ResponseCache>,
    monitor: Arc<ConnectivityMonitor>,
    interceptor: RequestInterceptor,
    coordinator: Arc<SyncCoordinator>,
    probe: Arc<ReachabilityProbe>,
    background: Arc<dyn BackgroundSync>,
}

impl SyncService {
    /// Open the service on the database at `db_path`.
    ///
    /// Drains are serialized across processes by a lock file next to the
    /// database.
    pub fn open(db_path: &Path, parts: ServiceParts, online: bool) -> Result<Self> {
        let open = || Database::open(db_path).map_err(Error::Storage);
        let lock = drain_lock_path(db_path);
        Self::assemble([open()?, open()?, open()?], parts, online, Some(lock))
    }

    /// Open the service on private in-memory databases.
    pub fn open_in_memory(parts: ServiceParts, online: bool) -> Result<Self> {
        let open = || Database::open_in_memory().map_err(Error::Storage);
        Self::assemble([open()?, open()?, open()?], parts, online, None)
    }

    /// Open the project's service, probing the API for the initial state.
    pub async fn from_config(work_dir: &Path, config: &Config) -> Result<Self> {
        let parts = ServiceParts::from_config(config)?;
        let probe = ReachabilityProbe::new(
            Arc::clone(&parts.transport),
            &parts.base_url,
            &parts.health_path,
        )?;
        let online = probe.check().await;
        debug!(online, url = probe.url(), "initial probe");
        Self::open(&get_db_path(work_dir, config), parts, online)
    }

    fn assemble(
        dbs: [Database; 3],
        parts: ServiceParts,
        online: bool,
        drain_lock: Option<PathBuf>,
    ) -> Result<Self> {
        let [queue_db, cache_db, meta_db] = dbs;
        let probe = Arc::new(ReachabilityProbe::new(
            Arc::clone(&parts.transport),
            &parts.base_url,
            &parts.health_path,
        )?);

        let queue = Arc::new(
            ActionQueue::with_clock(queue_db, Arc::clone(&parts.clock)).map_err(Error::Storage)?,
        );
        let cache = Arc::new(ResponseCache::with_clock(
            cache_db,
            parts.cache_policy,
            Arc::clone(&parts.clock),
        ));
        let monitor =
            Arc::new(ConnectivityMonitor::with_store(online, meta_db).map_err(Error::Storage)?);

        let interceptor = RequestInterceptor::new(
            Arc::clone(&parts.transport),
            Arc::clone(&queue),
            Arc::clone(&cache),
            Arc::clone(&monitor),
            Arc::clone(&parts.credentials),
            parts.base_url.clone(),
        );
        let mut coordinator = SyncCoordinator::with_clock(
            Arc::clone(&queue),
            parts.transport,
            Arc::clone(&monitor),
            parts.credentials,
            parts.clock,
        )
        .with_probe(Arc::clone(&probe));
        if let Some(path) = drain_lock {
            coordinator = coordinator.with_drain_lock(path);
        }
        let coordinator = Arc::new(coordinator);
        let background: Arc<dyn BackgroundSync> = Arc::new(InlineSync::new(Arc::clone(&coordinator)));

        Ok(SyncService {
            base_url: parts.base_url,
            queue,
            cache,
            monitor,
            interceptor,
            coordinator,
            probe,
            background,
        })
    }

    /// Replace the background strategy (inline by default).
    pub fn with_background(mut self, background: Arc<dyn BackgroundSync>) -> Self {
        self.background = background;
        self
    }

    /// Send a request through the interceptor.
    ///
    /// A deferred request is registered with the background strategy. A
    /// registration failure is logged; the action is already queued.
    pub async fn execute(&self, request: ApiRequest) -> Result<RequestOutcome> {
        let outcome = self.interceptor.execute(request).await?;
        if let RequestOutcome::Deferred { id } = &outcome {
            if let Err(e) = self.background.register(SYNC_TAG).await {
                warn!(%id, error = %e, "could not register background sync");
            }
        }
        Ok(outcome)
    }

    /// Queue `request` for replay without trying the network.
    pub fn enqueue_deferred(&self, mut request: ApiRequest) -> Result<ActionId> {
        request.url = join_url(&self.base_url, &request.url)?;
        self.queue.enqueue(request).map_err(Error::Storage)
    }

    /// Pending actions, oldest first.
    pub fn list_pending(&self) -> Result<Vec<PendingAction>> {
        self.queue.list_all().map_err(Error::Storage)
    }

    pub fn pending_count(&self) -> Result<usize> {
        self.queue.count().map_err(Error::Storage)
    }

    /// Drop a pending action without replaying it.
    pub fn discard(&self, id: &ActionId) -> Result<()> {
        if self.queue.remove(id).map_err(Error::Storage)? {
            Ok(())
        } else {
            Err(Error::ActionNotFound(id.to_string()))
        }
    }

    /// Drain the queue through the background strategy.
    pub async fn trigger_sync(&self) -> Result<DrainReport> {
        self.background.drain_queue().await
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.monitor.status()
    }

    pub fn on_connectivity_change<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(Transition) + Send + Sync + 'static,
    {
        self.monitor.on_transition(handler)
    }

    /// Probe the API now and update the monitor. Returns reachability.
    pub async fn refresh_connectivity(&self) -> bool {
        self.probe.probe_into(&self.monitor).await
    }

    pub fn queue(&self) -> &Arc<ActionQueue> {
        &self.queue
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    pub fn probe(&self) -> &Arc<ReachabilityProbe> {
        &self.probe
    }

    pub fn background(&self) -> &Arc<dyn BackgroundSync> {
        &self.background
    }
}

/// `offline.db` locks `offline.db-drain.lock` in the same directory.
fn drain_lock_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.file_name().unwrap_or_default().to_os_string();
    name.push("-drain.lock");
    db_path.with_file_name(name)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
