// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for CLI-daemon communication.
//!
//! This crate defines the message types and framing protocol used between
//! the `tasksync` CLI and the `tasksyncd` daemon. Messages are serialized as
//! JSON with length-prefixed framing.

use serde::{Deserialize, Serialize};

pub use ts_core::DrainReport;

/// Background sync tag a client registers after deferring an action.
pub const SYNC_TAG: &str = "sync-pending-actions";

// ============================================================================
// Protocol types
// ============================================================================

/// Request sent from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonRequest {
    /// Get daemon status.
    Status,
    /// Graceful shutdown.
    Shutdown,
    /// Ping to check if daemon is alive.
    Ping,
    /// Version handshake request.
    Hello { version: String },
    /// Ask the daemon to drain the queue when it next can.
    RegisterSync { tag: String },
    /// Drain now and report the outcome.
    SyncNow,
}

/// Response sent from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonResponse {
    /// Status response.
    Status(DaemonStatus),
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Pong response.
    Pong,
    /// Error response.
    Error { message: String },
    /// Version handshake response.
    Hello { version: String },
    /// Sync tag accepted; a drain is scheduled.
    SyncRegistered { tag: String },
    /// Result of a drain run for `SyncNow`.
    SyncCompleted(DrainReport),
}

/// Daemon status information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    /// Current daemon PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Last observed reachability of the API.
    #[serde(default)]
    pub online: bool,
    /// Actions waiting for replay.
    #[serde(default)]
    pub pending_actions: usize,
    /// Milliseconds since Unix epoch of the last completed drain.
    #[serde(default)]
    pub last_sync_time: Option<u64>,
    /// Outcome of the most recent drain.
    #[serde(default)]
    pub last_report: Option<DrainReport>,
}

impl DaemonStatus {
    /// Create a new status with the given parameters.
    pub fn new(pid: u32, uptime_secs: u64) -> Self {
        Self {
            pid,
            uptime_secs,
            online: false,
            pending_actions: 0,
            last_sync_time: None,
            last_report: None,
        }
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// Maximum message size (1MB) to prevent malformed messages from causing hangs.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

fn encode<T: Serialize>(message: &T) -> std::io::Result<(u32, Vec<u8>)> {
    let json = serde_json::to_vec(message)
        .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
    let len = u32::try_from(json.len())
        .ok()
        .filter(|len| *len as usize <= MAX_MESSAGE_SIZE)
        .ok_or_else(|| std::io::Error::other("message too large"))?;
    Ok((len, json))
}

fn check_len(len_buf: [u8; 4]) -> std::io::Result<usize> {
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::other(format!(
            "message too large: {} bytes (max {})",
            len, MAX_MESSAGE_SIZE
        )));
    }
    Ok(len)
}

fn decode<T: serde::de::DeserializeOwned>(buf: &[u8]) -> std::io::Result<T> {
    serde_json::from_slice(buf)
        .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
}

/// IPC message framing over blocking streams.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    use super::{check_len, decode, encode, DaemonRequest, DaemonResponse};

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let (len, json) = encode(message)?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = check_len(len_buf)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        decode(&buf)
    }

    /// Write a request to the given writer.
    pub fn write_request<W: Write>(writer: &mut W, request: &DaemonRequest) -> std::io::Result<()> {
        write_message(writer, request)
    }

    /// Read a response from the given reader.
    pub fn read_response<R: Read>(reader: &mut R) -> std::io::Result<DaemonResponse> {
        read_message(reader)
    }
}

/// IPC message framing over tokio streams, same wire format as [`framing`].
pub mod framing_async {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use super::{check_len, decode, encode, DaemonRequest, DaemonResponse};

    /// Write a serializable message to the given writer.
    pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let (len, json) = encode(message)?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub async fn read_message<R: AsyncRead + Unpin, T: DeserializeOwned>(
        reader: &mut R,
    ) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = check_len(len_buf)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        decode(&buf)
    }

    /// Read a request from the given reader.
    pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<DaemonRequest> {
        read_message(reader).await
    }

    /// Write a response to the given writer.
    pub async fn write_response<W: AsyncWrite + Unpin>(
        writer: &mut W,
        response: &DaemonResponse,
    ) -> std::io::Result<()> {
        write_message(writer, response).await
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
