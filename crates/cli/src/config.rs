// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.tasksync/config.toml`. Every key has a
//! default, so an empty file is a valid configuration:
//! - `api_base_url`: base URL relative request paths are joined onto
//! - `health_path`: endpoint the reachability probe hits
//! - timeouts and intervals for requests, probing and polling
//! - cache TTL and size cap
//! - `token_env`: environment variable holding the bearer token
//! - `database`: optional override for the SQLite file location

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".tasksync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "offline.db";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Project configuration stored in `.tasksync/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task-manager API.
    pub api_base_url: String,
    /// Path (relative to `api_base_url`) probed for reachability.
    pub health_path: String,
    /// Per-request timeout, also applied to replays.
    pub request_timeout_secs: u64,
    /// Interval between reachability probes.
    pub probe_interval_secs: u64,
    /// Interval between queue polls while online.
    pub poll_interval_secs: u64,
    /// How long a cached read stays usable.
    pub cache_ttl_secs: u64,
    /// Maximum number of cached reads kept.
    pub cache_max_entries: usize,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    /// Optional path for the database (relative to project root or absolute).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://localhost:8000/api".to_string(),
            health_path: "/health".to_string(),
            request_timeout_secs: 30,
            probe_interval_secs: 10,
            poll_interval_secs: 30,
            cache_ttl_secs: 3600,
            cache_max_entries: 100,
            token_env: env::vars::TASKSYNC_TOKEN.to_string(),
            database: None,
        }
    }
}

impl Config {
    /// Creates a default config pointing at the given API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is not an absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self> {
        let config = Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would otherwise fail much later.
    pub fn validate(&self) -> Result<()> {
        ts_core::normalize_url(&self.api_base_url)
            .map_err(|e| Error::Config(format!("api_base_url: {}", e)))?;
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.probe_interval_secs == 0 || self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "probe and poll intervals must be greater than 0".to_string(),
            ));
        }
        if self.token_env.trim().is_empty() {
            return Err(Error::Config("token_env cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Loads configuration from the given `.tasksync/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.tasksync/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Find the .tasksync directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Find the .tasksync directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the database path from config
pub fn get_db_path(work_dir: &Path, config: &Config) -> PathBuf {
    match &config.database {
        Some(database) => {
            let database_path = Path::new(database);
            if database_path.is_absolute() {
                database_path.to_path_buf()
            } else {
                // Relative to work_dir's parent (the project root)
                work_dir.parent().unwrap_or(work_dir).join(database)
            }
        }
        None => work_dir.join(DB_FILE_NAME),
    }
}

/// Get the directory for daemon files (socket, pid, lock, log).
///
/// `TASKSYNC_STATE_DIR` wins; otherwise each project keeps its daemon
/// files next to its config.
pub fn get_daemon_dir(work_dir: &Path) -> PathBuf {
    resolve_daemon_dir(work_dir, env::state_dir())
}

fn resolve_daemon_dir(work_dir: &Path, state_dir: Option<PathBuf>) -> PathBuf {
    state_dir.unwrap_or_else(|| work_dir.to_path_buf())
}

/// Initialize a new .tasksync directory at the given path
pub fn init_work_dir(path: &Path, api_base_url: Option<&str>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let config = match api_base_url {
        Some(url) => Config::new(url)?,
        None => Config::default(),
    };

    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// The queue database and daemon runtime files are machine-local.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = "# Offline queue and response cache\noffline.db\noffline.db-*\n\n# Daemon runtime state\ndaemon.*\n";
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
