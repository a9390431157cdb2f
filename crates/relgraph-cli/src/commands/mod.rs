//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod import;
pub mod plan;

/// Relational to graph migration
#[derive(Parser)]
#[command(name = "relgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the statements a plan would run, without connecting
    Plan(plan::PlanArgs),

    /// Run a migration plan against Neo4j
    Import(import::ImportArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Plan(args) => plan::execute(args),
            Commands::Import(args) => import::execute(args).await,
        }
    }
}
