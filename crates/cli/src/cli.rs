// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline queue and replay for the task-manager API")]
#[command(
    long_about = "Offline queue and replay for the task-manager API.\n\n\
    Requests that cannot reach the server are queued and replayed in order once \
    it is reachable again. Reads fall back to the last cached response."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize tasksync in the current directory
    #[command(after_help = "\
Examples:
  tasksync init                                  Use the default API URL
  tasksync init --api-url https://tasks.example.com/api")]
    Init {
        /// Base URL of the task-manager API
        #[arg(long, value_parser = non_empty_string)]
        api_url: Option<String>,

        /// Directory to initialize (defaults to the current directory)
        path: Option<String>,
    },

    /// Send an API request, queueing it if the server is unreachable
    #[command(after_help = "\
Examples:
  tasksync request GET /tasks
  tasksync request POST /tasks --data '{\"title\":\"Write report\"}'
  tasksync request PATCH /tasks/42 -d '{\"status\":\"done\"}' -H 'If-Match: 7'")]
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS)
        method: String,

        /// Path under the API base URL, or an absolute URL
        #[arg(value_parser = non_empty_string)]
        path: String,

        /// Request body (sent as JSON unless a Content-Type header is given)
        #[arg(long, short)]
        data: Option<String>,

        /// Extra header as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H', value_name = "HEADER")]
        headers: Vec<String>,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued actions, oldest first
    Pending {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print the number of queued actions
    Count,

    /// Replay queued actions now
    Sync {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Drop a queued action without replaying it
    Discard {
        /// Action ID, as shown by 'tasksync pending'
        id: String,
    },

    /// Show connectivity, queue and daemon state
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Stay in the foreground and replay whenever the API is reachable
    Watch,

    /// Generate shell completions
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  tasksync completion bash > ~/.local/share/bash-completion/completions/tasksync
  tasksync completion zsh > ~/.zfunc/_tasksync
  tasksync completion fish > ~/.config/fish/completions/tasksync.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Manage the tasksyncd daemon
    #[command(subcommand)]
    Daemon(DaemonCommand),
}

/// Daemon management commands.
#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Show daemon status
    Status,
    /// Stop the daemon
    Stop,
    /// Start the daemon
    Start,
    /// View daemon logs
    Logs {
        /// Follow log output (tail -f)
        #[arg(long)]
        follow: bool,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
