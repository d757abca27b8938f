// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use pulse_core::NotificationId;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  pulse list              Show all notifications
  pulse list --unread     Show unread notifications only
  pulse read 42           Mark notification 42 as read
  pulse watch             Stream new notifications until Ctrl-C";

#[derive(Parser)]
#[command(name = "pulse", version)]
#[command(about = "Keep up with dealer and order notifications from the terminal")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: <config dir>/pulse/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Stream notifications as they arrive
    Watch,

    /// List notifications, newest first
    List {
        /// Only show unread notifications
        #[arg(long, short)]
        unread: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Mark a notification as read
    #[command(arg_required_else_help = true)]
    Read {
        /// Notification ID
        #[arg(value_parser = NotificationId::from_str)]
        id: NotificationId,
    },

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    #[command(arg_required_else_help = true)]
    Delete {
        /// Notification ID
        #[arg(value_parser = NotificationId::from_str)]
        id: NotificationId,
    },
}
