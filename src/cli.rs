use clap::Parser;
use std::path::PathBuf;

use crate::models::{Category, SortKey, SortOrder};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulated token market feed with a sorted, filtered view", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Partition to display; repeat to watch several
    #[arg(long = "category")]
    pub categories: Vec<Category>,

    /// Sort key: price, change24h, marketCap, volume24h or name
    #[arg(long)]
    pub sort_by: Option<SortKey>,

    /// Sort order: asc or desc
    #[arg(long)]
    pub order: Option<SortOrder>,

    /// Only show tokens of this category in the `all` partition
    #[arg(long)]
    pub filter: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Print views as JSON lines
    #[arg(long)]
    pub json: bool,
}
