//! Command line interface for the job board server

pub mod serve;

use clap::{Parser, Subcommand};

/// Jobee - job board API
#[derive(Parser)]
#[command(name = "jobboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),
}
