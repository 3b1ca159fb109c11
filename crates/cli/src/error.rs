// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the tsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'tasksync init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("pending action not found: {0}\n  hint: run 'tasksync pending' to list queued actions")]
    ActionNotFound(String),

    #[error("invalid header '{0}'\n  hint: headers are written as 'Name: value'")]
    InvalidHeader(String),

    /// A request was rejected before it reached the network.
    #[error("{0}")]
    Input(ts_core::Error),

    /// The network never produced a response.
    #[error("network error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status. Never deferred.
    #[error("request failed with status {status}: {}", summarize(.body))]
    Application { status: u16, body: String },

    #[error("offline and no cached response for {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(ts_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("daemon version mismatch: daemon is v{daemon_version}, CLI is v{cli_version}\n  hint: run 'tasksync daemon stop' and retry")]
    DaemonVersionMismatch {
        daemon_version: String,
        cli_version: String,
    },
}

/// A specialized Result type for tsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Trims a response body to something that fits on one error line.
fn summarize(body: &str) -> String {
    const MAX: usize = 200;
    let line = body.lines().next().unwrap_or("").trim();
    if line.chars().count() > MAX {
        let cut: String = line.chars().take(MAX).collect();
        format!("{cut}...")
    } else if line.is_empty() {
        "(empty body)".to_string()
    } else {
        line.to_string()
    }
}

impl From<ts_core::Error> for Error {
    fn from(e: ts_core::Error) -> Self {
        match e {
            ts_core::Error::InvalidMethod(_)
            | ts_core::Error::InvalidUrl { .. }
            | ts_core::Error::InvalidActionId(_) => Error::Input(e),
            other => Error::Storage(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
