// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue and replay for API requests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Interceptor │────►│  Transport  │────►│     API     │
//! │             │◄────│   (trait)   │◄────│   Server    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!    │       │               ▲
//!    ▼       ▼               │
//! ┌───────┐ ┌───────┐  ┌─────────────┐     ┌─────────────┐
//! │ Cache │ │ Queue │◄─│ Coordinator │◄────│   Monitor   │◄── probe
//! └───────┘ └───────┘  └─────────────┘     └─────────────┘
//! ```
//!
//! - Mutations that fail while offline are queued and replayed in order
//! - GET responses are cached and served stale while offline
//! - Drains run on reconnect, on a poll timer, or on demand
//! - Injectable transport and credential traits for testing

mod auth;
mod background;
mod cache;
mod coordinator;
mod interceptor;
mod monitor;
mod probe;
mod queue;
mod service;
mod transport;

pub use auth::{CredentialSource, EnvCredential, NoCredential, StaticCredential, AUTHORIZATION};
pub use background::{select_strategy, BackgroundSync, DaemonSync, InlineSync};
pub use cache::{CachePolicy, ResponseCache};
pub use coordinator::SyncCoordinator;
pub use interceptor::{ApiRequest, RequestInterceptor, RequestOutcome};
pub use monitor::{ConnectivityMonitor, ConnectivityState, SubscriptionId, Transition};
pub use probe::ReachabilityProbe;
pub use queue::ActionQueue;
pub use service::{ServiceParts, SyncService};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Transport, TransportError, TransportResult,
};

#[cfg(test)]
pub(crate) mod test_helpers;
