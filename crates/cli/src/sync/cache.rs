// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-through response cache.
//!
//! Successful GET responses are stored keyed by normalized URL so that an
//! offline read can be answered with the last known data. Entries expire
//! after a TTL and the table is capped, dropping the oldest entries first.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ts_core::{normalize_url, CachedResponse, ClockSource, Database, Result, SystemClock};

use super::transport::HttpResponse;

/// Expiry and size limits for the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy {
            ttl: Duration::from_secs(3600),
            max_entries: 100,
        }
    }
}

/// Cache of the last successful response per URL.
pub struct ResponseCache {
    db: Mutex<Database>,
    policy: CachePolicy,
    clock: Arc<dyn ClockSource>,
}

impl ResponseCache {
    pub fn new(db: Database, policy: CachePolicy) -> Self {
        Self::with_clock(db, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, policy: CachePolicy, clock: Arc<dyn ClockSource>) -> Self {
        ResponseCache {
            db: Mutex::new(db),
            policy,
            clock,
        }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `response` as the latest data for `url`, replacing any entry.
    pub fn store(&self, url: &str, response: &HttpResponse) -> Result<()> {
        let now = self.clock.now_ms();
        let ttl_ms = u64::try_from(self.policy.ttl.as_millis()).unwrap_or(u64::MAX);
        let entry = CachedResponse {
            url: normalize_url(url)?,
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
            stored_at: now,
            expires_at: now.saturating_add(ttl_ms),
        };

        let db = self.db();
        db.put_cached(&entry)?;
        db.trim_cache(self.policy.max_entries)?;
        Ok(())
    }

    /// Last stored response for `url`, or `None` on a miss.
    ///
    /// An expired entry is a miss and is deleted.
    pub fn lookup(&self, url: &str) -> Result<Option<CachedResponse>> {
        let key = normalize_url(url)?;
        let now = self.clock.now_ms();
        let db = self.db();

        match db.get_cached(&key)? {
            Some(entry) if entry.is_expired(now) => {
                db.delete_cached(&key)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete every expired entry.
    pub fn purge_expired(&self) -> Result<usize> {
        self.db().purge_expired(self.clock.now_ms())
    }

    pub fn len(&self) -> Result<usize> {
        self.db().count_cached()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
