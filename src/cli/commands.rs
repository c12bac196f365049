use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keynote-tracker")]
#[command(about = "Track announcements, releases and keynotes from the sources you follow")]
#[command(version)]
pub struct Cli {
    /// Sources configuration file (overrides KEYNOTE_TRACKER_SOURCES)
    #[arg(long, global = true)]
    pub sources: Option<PathBuf>,

    /// Cache file (overrides KEYNOTE_TRACKER_CACHE)
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Refresh before showing announcements even if the cache is fresh
    #[arg(long)]
    pub refresh: bool,

    /// Show one source, same as `list <SOURCE>`
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every configured source and update the cache
    Refresh,

    /// Show cached announcements of one source
    List {
        /// Source key, as printed by `sources`
        source: String,
    },

    /// List configured sources
    Sources,

    /// Show cache status
    Status,

    /// Reset the cache
    Clear,
}
