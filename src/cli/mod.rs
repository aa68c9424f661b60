use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::State;

pub mod commands;

#[derive(Parser)]
#[command(name = "bundle-api")]
#[command(about = "Bundle lifecycle tooling for dataset release packages")]
#[command(long_about = "Inspect the bundle lifecycle table and configuration, or replay a state \
                       change against fixture data to see how it cascades to content items, \
                       dataset versions and the audit log.")]
pub struct Cli {
    /// Configuration file to load instead of bundle-api.toml
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the bundle lifecycle transition table as JSON
    Transitions,
    /// Print the effective configuration
    Config {
        /// Save the effective configuration as TOML instead of printing it
        #[arg(long, help = "File path to write the configuration to")]
        write: Option<PathBuf>,
    },
    /// Replay a bundle state change against a JSON fixture
    Simulate {
        /// Fixture with bundles, content items and dataset versions
        #[arg(long, help = "JSON fixture to load into the in-memory collaborators")]
        fixture: PathBuf,
        /// Bundle to move
        #[arg(long, help = "Id of the bundle to transition")]
        bundle: String,
        /// Target state
        #[arg(long, help = "DRAFT, IN_REVIEW, APPROVED or PUBLISHED")]
        state: State,
        /// Fingerprint to send as If-Match (defaults to the stored one)
        #[arg(long, help = "ETag to present; omit to use the bundle's current fingerprint")]
        if_match: Option<String>,
        /// Access token naming the caller
        #[arg(long, help = "Token to resolve against the fixture's identities")]
        token: Option<String>,
    },
}
