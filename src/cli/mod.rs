//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Feedback - user accounts and owner-only feedback over HTTP
#[derive(Parser)]
#[command(name = "feedback")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default lookup
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Inspect and remove user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Maintain the session table
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List registered users with their feedback counts
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a user and all of their feedback
    #[command(alias = "rm")]
    Remove {
        username: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Delete sessions that have passed their inactivity deadline
    Prune,
}

pub use commands::*;
