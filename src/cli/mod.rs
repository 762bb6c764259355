pub mod completions;
pub mod inspect;
pub mod merge;

use clap::{Parser, Subcommand};

/// tilemerge - Shared-tileset consolidation for tile map documents
#[derive(Parser, Debug)]
#[command(name = "tilemerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge duplicate tiles across maps into one shared tileset
    Merge(merge::MergeArgs),

    /// Report duplicate tiles across maps without writing anything
    Inspect(inspect::InspectArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
