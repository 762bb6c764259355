use clap::Parser;
use miette::Result;
use tilemerge::cli::{Cli, Commands};
use tilemerge::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Merge(args) => tilemerge::cli::merge::run(args, &printer)?,
        Commands::Inspect(args) => tilemerge::cli::inspect::run(args, &printer)?,
        Commands::Completions(args) => tilemerge::cli::completions::run(args)?,
    }

    Ok(())
}
