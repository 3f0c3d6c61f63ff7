//! Find-var command - locates the binding of a name

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use estr_core::refactor::find_var_report;
use estr_core::syntax::Position;

use super::{OutputFormat, configure_colors, print_warnings, read_source};
use crate::output::json::JsonFormatter;
use crate::output::pretty::PrettyFormatter;

#[derive(Args, Debug)]
pub struct FindVarArgs {
    /// Script to search
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Name of the variable
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Line of an occurrence (1-based)
    #[arg(value_name = "LINE")]
    pub line: usize,

    /// Column of that occurrence (0-based)
    #[arg(value_name = "COLUMN")]
    pub column: usize,

    /// Output format (pretty, json)
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

impl FindVarArgs {
    pub fn run(&self) -> Result<bool> {
        configure_colors();
        let parsed = read_source(&self.file)?;
        let position = Position::new(self.line, self.column);

        let report = find_var_report(&parsed, &self.name, position);
        let succeeded = report.is_ok();

        match self.format {
            OutputFormat::Json => {
                println!("{}", JsonFormatter::new(parsed.filename()).format(&report));
            }
            OutputFormat::Pretty => {
                let formatter = PrettyFormatter::with_source(&parsed);
                print_warnings(&formatter, &report.warnings);
                match &report.outcome {
                    Ok(variable) => println!("{}", formatter.format_variable(variable)),
                    Err(error) => eprintln!("{}", formatter.format_error(error)),
                }
            }
        }

        Ok(succeeded)
    }
}
