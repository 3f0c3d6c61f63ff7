//! Rename command - capture-safe renaming of one binding

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use estr_core::refactor::rename;
use estr_core::syntax::Position;

use super::{OutputFormat, configure_colors, load_config, print_warnings, read_source};
use crate::output::json::JsonFormatter;
use crate::output::pretty::PrettyFormatter;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Script containing the variable
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Current name of the variable
    #[arg(value_name = "OLD")]
    pub old_name: String,

    /// Line of any occurrence of the variable (1-based)
    #[arg(value_name = "LINE")]
    pub line: usize,

    /// Column of that occurrence (0-based)
    #[arg(value_name = "COLUMN")]
    pub column: usize,

    /// Name to rename to
    #[arg(value_name = "NEW")]
    pub new_name: String,

    /// Rewrite the file in place instead of printing it
    #[arg(short, long)]
    pub write: bool,

    /// Only validate the rename
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Output format (pretty, json)
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

impl RenameArgs {
    /// Returns whether the rename was accepted.
    pub fn run(&self) -> Result<bool> {
        configure_colors();
        let config = load_config(&self.file);
        let check_only = self.check || (config.rename.check_only && !self.write);

        let parsed = read_source(&self.file)?;
        let position = Position::new(self.line, self.column);
        let result = rename(&parsed, &self.old_name, position, &self.new_name);

        if self.write
            && let Ok(source) = &result.outcome
        {
            fs::write(&self.file, source)
                .with_context(|| format!("Failed to write {}", self.file.display()))?;
            tracing::info!(file = %self.file.display(), "rewrote file");
        }

        match self.format {
            OutputFormat::Json => {
                let succeeded = result.is_ok();
                let formatter = JsonFormatter::new(parsed.filename());
                let output = if check_only || self.write {
                    formatter.format(&result.map(|_| ()))
                } else {
                    formatter.format(&result)
                };
                println!("{output}");
                Ok(succeeded)
            }
            OutputFormat::Pretty => {
                let formatter = PrettyFormatter::with_source(&parsed);
                print_warnings(&formatter, &result.warnings);
                match &result.outcome {
                    Ok(source) => {
                        if self.write {
                            println!(
                                "{} {} -> {} in {}",
                                "renamed".green().bold(),
                                self.old_name,
                                self.new_name,
                                self.file.display()
                            );
                        } else if check_only {
                            println!(
                                "{} {} can be renamed to {}",
                                "ok".green().bold(),
                                self.old_name,
                                self.new_name
                            );
                        } else {
                            print!("{source}");
                        }
                        Ok(true)
                    }
                    Err(error) => {
                        eprintln!("{}", formatter.format_error(error));
                        Ok(false)
                    }
                }
            }
        }
    }
}
