//! estr CLI - scope-aware traversals of ECMAScript sources
//!
//! Capture-safe renaming, binding lookup, declaration listing and tag files.

mod commands;
mod logging;
mod output;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use commands::Commands;
use logging::{LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "estr",
    author,
    version,
    about = "Scope-aware ECMAScript traversals",
    long_about = "estr resolves every identifier of an ECMAScript script to its declaration.\n\n\
                  It renames variables without capturing other bindings, locates the binding\n\
                  of a name at a position, lists declarations and writes ctags-style tag files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "error",
        help = "Set the log level"
    )]
    pub log_level: LogLevel,

    #[arg(long, global = true, help = "Write logs to the specified file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let guard = init_logging(&cli);

    let succeeded = match &cli.command {
        Commands::Rename(args) => args.run(),
        Commands::FindVar(args) => args.run(),
        Commands::Collect(args) => args.run(),
        Commands::Tags(args) => args.run(),
    }?;

    drop(guard);
    if !succeeded {
        process::exit(1);
    }
    Ok(())
}
