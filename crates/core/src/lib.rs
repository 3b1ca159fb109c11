// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ts-core: Shared library for tasksync
//!
//! This crate provides the data model, id generation, URL normalization and
//! SQLite storage used by both the tasksync CLI and the tasksyncd daemon.

pub mod action;
pub mod cache;
pub mod clock;
pub mod db;
pub mod drain;
pub mod error;
pub mod normalize;

pub use action::{ActionRequest, Headers, Method, PendingAction};
pub use cache::CachedResponse;
pub use clock::{ActionId, ClockSource, IdClock, ManualClock, SystemClock};
pub use db::Database;
pub use drain::{DrainReport, DrainTrigger};
pub use error::{Error, Result};
pub use normalize::{join_url, normalize_url};
