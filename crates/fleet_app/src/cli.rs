//! Command line of the `fleet-admin` binary

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fleet-admin")]
#[command(about = "Administers the fleet usage store.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Print store health and fleet counts as JSON
    Status,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested command; `status` when none is given
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Status)
    }
}
