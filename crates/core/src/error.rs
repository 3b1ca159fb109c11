// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ts-core operations.

use thiserror::Error;

/// All possible errors that can occur in ts-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid HTTP method: '{0}'\n  hint: valid methods are: GET, HEAD, OPTIONS, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid action id: {0}")]
    InvalidActionId(String),

    #[error("duplicate action id: {0}")]
    DuplicateAction(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for ts-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
