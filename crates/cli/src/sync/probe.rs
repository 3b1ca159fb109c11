// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability probe feeding the connectivity monitor.
//!
//! Any response from the health endpoint, whatever its status, means the
//! API is reachable. Only a transport failure counts as offline.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use ts_core::join_url;

use super::monitor::ConnectivityMonitor;
use super::transport::{HttpRequest, Transport};

pub struct ReachabilityProbe {
    transport: Arc<dyn Transport>,
    url: String,
}

impl ReachabilityProbe {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        health_path: &str,
    ) -> ts_core::Result<Self> {
        Ok(ReachabilityProbe {
            transport,
            url: join_url(base_url, health_path)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns whether the health endpoint answered at all.
    pub async fn check(&self) -> bool {
        match self.transport.send(HttpRequest::get(&self.url)).await {
            Ok(response) => {
                debug!(status = response.status, "probe answered");
                true
            }
            Err(e) => {
                debug!(error = %e, "probe failed");
                false
            }
        }
    }

    /// Probe once and feed the result to `monitor`.
    pub async fn probe_into(&self, monitor: &ConnectivityMonitor) -> bool {
        let online = self.check().await;
        monitor.observe(online);
        online
    }

    /// Probe every `interval` until cancelled.
    pub async fn run(
        self: Arc<Self>,
        monitor: Arc<ConnectivityMonitor>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.probe_into(&monitor) => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        debug!("probe loop stopped");
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
