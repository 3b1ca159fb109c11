// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tsync - Offline queue-and-replay for a task-manager API.
//!
//! This crate provides the library behind the `tasksync` CLI and the
//! `tasksyncd` daemon. Requests go through a [`SyncService`]: while the API
//! is reachable they are sent as-is, and while it is not, mutations are
//! persisted in a durable queue and reads are served from a response cache.
//! When connectivity returns the queue is replayed in order.
//!
//! # Main Components
//!
//! - [`sync::ConnectivityMonitor`] - Tracks reachability and notifies subscribers
//! - [`sync::ActionQueue`] - SQLite-backed FIFO of pending mutations
//! - [`sync::RequestInterceptor`] - Sends, defers, or serves requests from cache
//! - [`sync::SyncCoordinator`] - Replays the queue when the API comes back
//!
//! ```rust,ignore
//! use tsync::{find_work_dir, Config, SyncService};
//! use tsync::sync::ApiRequest;
//! use ts_core::Method;
//!
//! let work_dir = find_work_dir()?;
//! let config = Config::load(&work_dir)?;
//! let service = SyncService::from_config(&work_dir, &config).await?;
//! let outcome = service.execute(ApiRequest::new(Method::Post, "/tasks")).await?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod daemon;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, DaemonCommand, OutputFormat};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};
pub use sync::SyncService;

use clap::CommandFactory;
use clap_complete::generate;

/// Run a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { api_url, path } => commands::init::run(api_url, path),
        Command::Request {
            method,
            path,
            data,
            headers,
            output,
        } => commands::request::run(method, path, data, headers, output),
        Command::Pending { output } => commands::pending::list(output),
        Command::Count => commands::pending::count(),
        Command::Sync { output } => commands::sync::run(output),
        Command::Discard { id } => commands::pending::discard(&id),
        Command::Status { output } => commands::status::run(output),
        Command::Watch => commands::watch::run(),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tasksync", &mut std::io::stdout());
            Ok(())
        }
        Command::Daemon(cmd) => match cmd {
            DaemonCommand::Status => commands::daemon::status(),
            DaemonCommand::Stop => commands::daemon::stop(),
            DaemonCommand::Start => commands::daemon::start(),
            DaemonCommand::Logs { follow } => commands::daemon::logs(follow),
        },
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
