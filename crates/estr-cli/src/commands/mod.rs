//! CLI command implementations

pub mod collect;
pub mod find_var;
pub mod rename;
pub mod tags;

pub use collect::CollectArgs;
pub use find_var::FindVarArgs;
pub use rename::RenameArgs;
pub use tags::TagsArgs;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use estr_core::config::{Config, load_config_or_default_with_warnings};
use estr_core::parser::ParsedFile;
use estr_core::semantic::Warning;

use crate::output::pretty::PrettyFormatter;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename a variable without capturing other bindings
    Rename(RenameArgs),

    /// Locate the binding of a name at a position
    FindVar(FindVarArgs),

    /// List the declarations of the program scope
    Collect(CollectArgs),

    /// Write a ctags-style tag file
    Tags(TagsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

pub(crate) fn configure_colors() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }
}

/// Configuration for `path`, searched from its directory upward.
pub(crate) fn load_config(path: &Path) -> Config {
    let start = fs::canonicalize(path)
        .ok()
        .and_then(|path| {
            if path.is_dir() {
                Some(path)
            } else {
                path.parent().map(Path::to_path_buf)
            }
        })
        .unwrap_or_else(|| PathBuf::from("."));
    let result = load_config_or_default_with_warnings(&start);
    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    result.config
}

pub(crate) fn read_source(path: &Path) -> Result<ParsedFile> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ParsedFile::from_source(&path.to_string_lossy(), &source))
}

pub(crate) fn print_warnings(formatter: &PrettyFormatter<'_>, warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{}", formatter.format_warning(warning));
    }
}
