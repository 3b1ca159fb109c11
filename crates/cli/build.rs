// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::var("OUT_DIR")?;
    let path = std::path::Path::new(&out_dir).join("env_vars.rs");
    let mut f = std::fs::File::create(path)?;

    let vars = [
        ("TASKSYNC_STATE_DIR", "TASKSYNC_STATE_DIR"),
        ("TASKSYNC_DAEMON_BINARY", "TASKSYNC_DAEMON_BINARY"),
        ("TASKSYNC_LOG", "TASKSYNC_LOG"),
        ("TASKSYNC_TOKEN", "TASKSYNC_TOKEN"),
    ];

    for (const_name, env_name) in &vars {
        writeln!(f, "pub const {const_name}: &str = \"{env_name}\";")?;
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
