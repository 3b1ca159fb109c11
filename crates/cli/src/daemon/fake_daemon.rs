// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process stand-in for tasksyncd, for tests.

#![allow(clippy::unwrap_used)]

use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{Arc, Mutex};

use ts_core::{DrainReport, DrainTrigger};
use ts_ipc::{framing, DaemonRequest, DaemonResponse, DaemonStatus};

use super::lifecycle::{get_pid_path, get_socket_path};

/// Serves canned responses on `<dir>/daemon.sock` from a background thread.
pub struct FakeDaemon {
    requests: Arc<Mutex<Vec<DaemonRequest>>>,
}

impl FakeDaemon {
    pub fn start(dir: &Path, version: &str) -> Self {
        let listener = UnixListener::bind(get_socket_path(dir)).unwrap();
        std::fs::write(get_pid_path(dir), std::process::id().to_string()).unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let version = version.to_string();
        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &version, &log);
            }
        });
        FakeDaemon { requests }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<DaemonRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(mut stream: UnixStream, version: &str, log: &Mutex<Vec<DaemonRequest>>) {
    while let Ok(request) = framing::read_message::<_, DaemonRequest>(&mut stream) {
        log.lock().unwrap().push(request.clone());
        let response = match request {
            DaemonRequest::Ping => DaemonResponse::Pong,
            DaemonRequest::Hello { .. } => DaemonResponse::Hello {
                version: version.to_string(),
            },
            DaemonRequest::Status => {
                let mut status = DaemonStatus::new(std::process::id(), 7);
                status.pending_actions = 3;
                DaemonResponse::Status(status)
            }
            DaemonRequest::RegisterSync { tag } => DaemonResponse::SyncRegistered { tag },
            DaemonRequest::SyncNow => {
                DaemonResponse::SyncCompleted(DrainReport::new(DrainTrigger::Manual, 1_000))
            }
            DaemonRequest::Shutdown => DaemonResponse::ShuttingDown,
        };
        if framing::write_message(&mut stream, &response).is_err() {
            return;
        }
    }
}
