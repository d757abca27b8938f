// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulsers - command-line front end for the synced notification store.
//!
//! Each command logs in with the configured token, acts on the store, and
//! logs out again. Only `watch` opens a push connection; the one-shot
//! commands work on the fetched snapshot.
//!
//! ```rust,ignore
//! use pulsers::{run, Cli};
//! use clap::Parser;
//!
//! run(Cli::parse())?;
//! ```

mod cli;
mod commands;
mod display;
mod logging;

pub mod config;
pub mod error;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose);
    let config = Config::resolve(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli.command, &config))
}

async fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Watch => {
            let store = commands::open_store(config)?;
            commands::watch::run(&store, config.settings()).await
        }
        Command::List { unread, output } => {
            let store = commands::open_snapshot_store(config)?;
            commands::list::run(&store, unread, output).await
        }
        Command::Read { id } => {
            let store = commands::open_snapshot_store(config)?;
            commands::mark::read(&store, &id).await
        }
        Command::ReadAll => {
            let store = commands::open_snapshot_store(config)?;
            commands::mark::read_all(&store).await
        }
        Command::Delete { id } => {
            let store = commands::open_snapshot_store(config)?;
            commands::mark::delete(&store, &id).await
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
