//! Command line argument parsing.

use clap::{Parser, Subcommand};

/// Publish over-the-air updates for Expo and React Native apps
#[derive(Parser, Debug)]
#[command(
    name = "airlift",
    version,
    about = "Publish over-the-air updates for Expo and React Native apps",
    long_about = "Export your app's JavaScript bundles and assets, upload them \
to your update server, and manage published updates.

Run 'airlift init' once inside your app's package root, then 'airlift update' \
to publish."
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect this project to an update server
    Init,

    /// Export the app and publish a new update
    Update {
        /// A message to describe the update
        #[arg(short, long)]
        message: Option<String>,

        /// The runtime version of the update
        #[arg(short, long)]
        version: Option<String>,

        /// Skip exporting the bundle and reuse the previous export
        #[arg(long)]
        skip_export: bool,
    },

    /// List all updates
    #[command(alias = "ls")]
    List,

    /// Roll back a published update
    Rollback {
        /// ID of the update to roll back
        update_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Command {
    /// Command name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Update { .. } => "update",
            Command::List => "list",
            Command::Rollback { .. } => "rollback",
        }
    }
}
