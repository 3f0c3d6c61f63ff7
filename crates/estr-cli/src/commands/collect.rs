//! Collect command - lists the declarations of the program scope

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use estr_core::refactor::collect;

use super::{OutputFormat, configure_colors, print_warnings, read_source};
use crate::output::json::JsonFormatter;
use crate::output::pretty::PrettyFormatter;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Script to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format (pretty, json)
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

impl CollectArgs {
    pub fn run(&self) -> Result<bool> {
        configure_colors();
        let parsed = read_source(&self.file)?;
        let result = collect(&parsed);

        match self.format {
            OutputFormat::Json => {
                println!("{}", JsonFormatter::new(parsed.filename()).format(&result));
            }
            OutputFormat::Pretty => {
                let formatter = PrettyFormatter::with_source(&parsed);
                print_warnings(&formatter, &result.warnings);
                match &result.outcome {
                    Ok(reports) => print!("{}", formatter.format_declarations(reports)),
                    Err(error) => eprintln!("{}", formatter.format_error(error)),
                }
            }
        }

        Ok(result.is_ok())
    }
}
