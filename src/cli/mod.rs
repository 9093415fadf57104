pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newswatch")]
#[command(about = "Filter news feeds through trigger rules", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/newswatch/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a rules file and print the active triggers
    Check {
        /// Path to the rules file
        rules: PathBuf,
    },
    /// Fetch sources once and print the matching items
    Filter {
        /// Path to the rules file
        #[arg(short, long)]
        rules: PathBuf,

        /// Feed URLs or local feed files
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Poll the configured sources and print new matches
    Watch {
        /// Rules file (default: from config)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Poll interval (e.g., "30s", "2m", "1h")
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip the poll on start
        #[arg(long)]
        no_initial_update: bool,
    },
}
