//! Command-line interface for roster.
//!
//! This module provides the CLI structure and command handlers for the
//! `roster` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, GetCommand, ListCommand, OutputFormat, PersonArgs,
    ReplaceCommand, SearchCommand, ServeCommand, StatusCommand,
};

/// roster - person records with fuzzy search
///
/// Serves create, read, update, delete and search over a JSON file of
/// people, or runs a single operation against that file directly.
#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the people file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeCommand),

    /// Show one person by id
    Get(GetCommand),

    /// List everyone
    List(ListCommand),

    /// Search by age and fuzzy name
    Search(SearchCommand),

    /// Add a person
    Add(AddCommand),

    /// Replace a person
    Replace(ReplaceCommand),

    /// Delete a person
    Delete(DeleteCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
