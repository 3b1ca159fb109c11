// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-through cache records.

use serde::{Deserialize, Serialize};

/// Last successful response for a read request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// Normalized request URL (the cache key).
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// Milliseconds since Unix epoch when the response was stored.
    pub stored_at: u64,
    /// Milliseconds since Unix epoch after which the entry is a miss.
    pub expires_at: u64,
}

impl CachedResponse {
    /// Returns true once `now_ms` reaches the expiry timestamp.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    /// Age of the entry at `now_ms`, in milliseconds.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at)
    }
}
