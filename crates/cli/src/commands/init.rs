// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::config::{get_db_path, init_work_dir, Config};
use crate::error::{Error, Result};
use crate::sync::{ServiceParts, SyncService};

pub fn run(api_url: Option<String>, path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let work_dir = init_work_dir(&target_path, api_url.as_deref())?;
    let config = Config::load(&work_dir)?;

    // Create the database now so a bad path fails here rather than offline.
    let db_path = get_db_path(&work_dir, &config);
    let parts = ServiceParts::from_config(&config)?;
    SyncService::open(&db_path, parts, false)
        .map_err(|e| Error::Config(format!("cannot open {}: {}", db_path.display(), e)))?;

    println!("Initialized tasksync at {}", work_dir.display());
    println!("API: {}", config.api_base_url);
    println!("Token variable: {}", config.token_env);

    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
