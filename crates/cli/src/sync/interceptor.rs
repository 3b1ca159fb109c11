// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request interceptor.
//!
//! Wraps every outgoing API call and decides what happens when the network
//! does not answer:
//!
//! | outcome of send        | mutating request       | read request                  |
//! |------------------------|------------------------|-------------------------------|
//! | 2xx                    | `Response`             | `Response`, cache refreshed   |
//! | non-2xx                | `Error::Application`   | `Error::Application`          |
//! | no response, offline   | enqueue, `Deferred`    | `Cached` or `Unavailable`     |
//! | no response, online    | `Error::Transport`     | `Cached` or `Error::Transport`|

use std::sync::Arc;

use tracing::{debug, info, warn};
use ts_core::{join_url, ActionId, ActionRequest, CachedResponse, Method};

use super::auth::{self, CredentialSource};
use super::cache::ResponseCache;
use super::monitor::ConnectivityMonitor;
use super::queue::ActionQueue;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::error::{Error, Result};

/// A caller's request. Relative URLs are resolved against the API base.
pub type ApiRequest = ActionRequest;

/// What the caller gets back from [`RequestInterceptor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The server answered with a 2xx.
    Response(HttpResponse),
    /// The request was queued for replay.
    Deferred { id: ActionId },
    /// Stale data served from the cache.
    Cached(CachedResponse),
    /// Offline with nothing cached for this read.
    Unavailable { url: String },
}

impl RequestOutcome {
    /// True when the data did not come from the server just now.
    pub fn is_stale(&self) -> bool {
        matches!(self, RequestOutcome::Cached(_))
    }
}

pub struct RequestInterceptor {
    transport: Arc<dyn Transport>,
    queue: Arc<ActionQueue>,
    cache: Arc<ResponseCache>,
    monitor: Arc<ConnectivityMonitor>,
    credentials: Arc<dyn CredentialSource>,
    base_url: String,
}

impl RequestInterceptor {
    pub fn new(
        transport: Arc<dyn Transport>,
        queue: Arc<ActionQueue>,
        cache: Arc<ResponseCache>,
        monitor: Arc<ConnectivityMonitor>,
        credentials: Arc<dyn CredentialSource>,
        base_url: impl Into<String>,
    ) -> Self {
        RequestInterceptor {
            transport,
            queue,
            cache,
            monitor,
            credentials,
            base_url: base_url.into(),
        }
    }

    /// Send `request`, deferring or falling back to the cache on failure.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<RequestOutcome> {
        request.url = join_url(&self.base_url, &request.url)?;

        let mut wire = HttpRequest::from_action(&request);
        auth::apply(&mut wire.headers, self.credentials.as_ref());
        debug!(method = %request.method, url = %request.url, "sending request");

        match self.transport.send(wire).await {
            Ok(response) if response.is_success() => {
                if request.method == Method::Get {
                    if let Err(e) = self.cache.store(&request.url, &response) {
                        warn!(url = %request.url, error = %e, "failed to cache response");
                    }
                }
                Ok(RequestOutcome::Response(response))
            }
            Ok(response) => Err(Error::Application {
                status: response.status,
                body: response.body,
            }),
            Err(e) => self.on_transport_failure(request, e),
        }
    }

    fn on_transport_failure(
        &self,
        request: ApiRequest,
        error: TransportError,
    ) -> Result<RequestOutcome> {
        let online = self.monitor.is_online();
        debug!(url = %request.url, online, error = %error, "request got no response");

        if request.method.is_mutating() {
            if online {
                return Err(Error::Transport(error));
            }
            let method = request.method;
            let url = request.url.clone();
            let id = self.queue.enqueue(request).map_err(Error::Storage)?;
            info!(id = %id, method = %method, url = %url, "request deferred until online");
            return Ok(RequestOutcome::Deferred { id });
        }

        // Only GET responses are cached.
        if request.method == Method::Get {
            match self.cache.lookup(&request.url) {
                Ok(Some(entry)) => return Ok(RequestOutcome::Cached(entry)),
                Ok(None) => {}
                Err(e) => warn!(url = %request.url, error = %e, "cache lookup failed"),
            }
        }

        if online {
            Err(Error::Transport(error))
        } else {
            Ok(RequestOutcome::Unavailable { url: request.url })
        }
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod tests;
