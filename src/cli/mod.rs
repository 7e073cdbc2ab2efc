//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{HistoryCommand, ListCommand, RunCommand, ValidateCommand};

/// Deployment pipeline runner for static sites
#[derive(Debug, Parser, Clone)]
#[command(name = "deployline")]
#[command(author = "Deployline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A deployment pipeline runner for building and publishing static sites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a deploy
    Run(RunCommand),

    /// Validate a deploy configuration
    Validate(ValidateCommand),

    /// Show run history
    History(HistoryCommand),

    /// List pipelines seen in history
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
