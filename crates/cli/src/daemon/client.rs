// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client for the tasksyncd daemon.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use ts_ipc::{framing, DaemonRequest, DaemonResponse, DaemonStatus, DrainReport};

use crate::error::{Error, Result};

/// Connection timeout for daemon communication.
const TIMEOUT_SECS: u64 = 5;

/// CLI version sent in the handshake.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A client connection to the daemon.
pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to the daemon at the given socket path.
    pub fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .map_err(|e| Error::Daemon(format!("failed to connect to daemon: {}", e)))?;

        stream
            .set_read_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Daemon(format!("failed to set read timeout: {}", e)))?;
        stream
            .set_write_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Daemon(format!("failed to set write timeout: {}", e)))?;

        Ok(DaemonClient { stream })
    }

    /// Override the default read and write timeouts.
    pub fn set_timeouts(&self, timeout: Duration) -> Result<()> {
        self.stream.set_read_timeout(Some(timeout))?;
        self.stream.set_write_timeout(Some(timeout))?;
        Ok(())
    }

    /// Send a request and receive a response.
    fn request(&mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        framing::write_request(&mut self.stream, &request)?;
        match framing::read_response(&mut self.stream)? {
            DaemonResponse::Error { message } => Err(Error::Daemon(message)),
            response => Ok(response),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        match self.request(DaemonRequest::Ping)? {
            DaemonResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Exchange versions, failing if the daemon was built from another release.
    pub fn handshake(&mut self) -> Result<()> {
        let request = DaemonRequest::Hello {
            version: CLI_VERSION.to_string(),
        };
        match self.request(request)? {
            DaemonResponse::Hello { version } if version == CLI_VERSION => Ok(()),
            DaemonResponse::Hello { version } => Err(Error::DaemonVersionMismatch {
                daemon_version: version,
                cli_version: CLI_VERSION.to_string(),
            }),
            other => Err(unexpected(other)),
        }
    }

    pub fn status(&mut self) -> Result<DaemonStatus> {
        match self.request(DaemonRequest::Status)? {
            DaemonResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Ask the daemon to drain under `tag` when it can.
    pub fn register_sync(&mut self, tag: &str) -> Result<()> {
        let request = DaemonRequest::RegisterSync {
            tag: tag.to_string(),
        };
        match self.request(request)? {
            DaemonResponse::SyncRegistered { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Drain now and wait for the report.
    ///
    /// A drain may replay many requests, so the read timeout is lifted.
    pub fn sync_now(&mut self) -> Result<DrainReport> {
        self.stream
            .set_read_timeout(None)
            .map_err(|e| Error::Daemon(format!("failed to set read timeout: {}", e)))?;
        match self.request(DaemonRequest::SyncNow)? {
            DaemonResponse::SyncCompleted(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    pub fn shutdown(&mut self) -> Result<()> {
        match self.request(DaemonRequest::Shutdown)? {
            DaemonResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: DaemonResponse) -> Error {
    Error::Daemon(format!("unexpected response: {:?}", response))
}
