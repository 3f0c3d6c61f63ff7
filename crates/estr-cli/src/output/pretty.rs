//! Pretty formatter for human-readable terminal output
//!
//! Errors and warnings get a location arrow and, when the source is at hand,
//! the offending line with a caret under the reported column.

use colored::Colorize;
use estr_core::parser::ParsedFile;
use estr_core::refactor::{DeclarationReport, RefactorError, VariableReport};
use estr_core::semantic::Warning;
use estr_core::syntax::Position;

pub struct PrettyFormatter<'a> {
    file: &'a str,
    source: Option<&'a ParsedFile>,
}

impl<'a> PrettyFormatter<'a> {
    pub fn new(file: &'a str) -> Self {
        Self { file, source: None }
    }

    pub fn with_source(parsed: &'a ParsedFile) -> Self {
        Self {
            file: parsed.filename(),
            source: Some(parsed),
        }
    }

    pub fn format_error(&self, error: &RefactorError) -> String {
        let header = format!(
            "{}[{}]: {}",
            "error".red().bold(),
            error.kind().as_str().dimmed(),
            error
        );
        self.with_location(header, error_position(error))
    }

    pub fn format_warning(&self, warning: &Warning) -> String {
        let header = format!("{}: {}", "warning".yellow().bold(), warning.message);
        self.with_location(header, warning.loc.map(|loc| loc.start))
    }

    pub fn format_variable(&self, report: &VariableReport) -> String {
        let mut lines = vec![format!(
            "{} {} declared at {}:{}",
            report.kind.as_str().cyan(),
            report.name.bold(),
            self.file,
            report.declaration.start
        )];
        lines.push(format!(
            "  {} {} scope {}",
            "scope:".blue(),
            report.scope.kind,
            report.scope.span
        ));
        if report.occurrences.is_empty() {
            lines.push(format!("  {} none", "occurrences:".blue()));
        } else {
            lines.push(format!("  {}", "occurrences:".blue()));
            for occurrence in &report.occurrences {
                lines.push(format!("    {}:{}", self.file, occurrence.start));
            }
        }
        lines.join("\n")
    }

    pub fn format_declarations(&self, reports: &[DeclarationReport]) -> String {
        let mut output = String::new();
        for report in reports {
            let marker = if report.hoist_conflict {
                format!(" {}", "(hoisted over catch)".yellow())
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{}:{}  {} {}{}\n",
                self.file,
                report.loc.start,
                report.kind.as_str().cyan(),
                report.name.bold(),
                marker
            ));
        }

        let noun = if reports.len() == 1 {
            "declaration"
        } else {
            "declarations"
        };
        output.push_str(&format!("\nFound {} {}\n", reports.len().to_string().bold(), noun));
        output
    }

    fn with_location(&self, header: String, position: Option<Position>) -> String {
        let Some(position) = position else {
            return header;
        };

        let mut lines = vec![
            header,
            format!("  {} {}:{}", "-->".blue(), self.file, position),
        ];

        let source_line = self
            .source
            .and_then(|parsed| parsed.get_line(position.line));
        if let Some(source_line) = source_line {
            let padding = " ".repeat(position.line.to_string().len());
            lines.push(format!("{} {}", padding, "|".blue()));
            lines.push(format!(
                "{} {} {}",
                position.line.to_string().blue(),
                "|".blue(),
                source_line
            ));
            lines.push(format!(
                "{} {} {}{}",
                padding,
                "|".blue(),
                " ".repeat(position.column),
                "^".red()
            ));
        }

        lines.join("\n")
    }
}

/// Most relevant source position of an error, if it carries one.
fn error_position(error: &RefactorError) -> Option<Position> {
    match error {
        RefactorError::Parse { errors, .. } => errors
            .first()
            .map(|e| Position::new(e.line, e.column)),
        RefactorError::NoBindingScope { position, .. }
        | RefactorError::HoistConflict { position, .. } => Some(*position),
        RefactorError::RenamedBindingConflict { existing, .. } => Some(*existing),
        RefactorError::CaptureExisting { occurrences, .. } => occurrences.first().copied(),
        RefactorError::CaptureRenamed { captures, .. } => {
            captures.first().map(|capture| capture.occurrence)
        }
        RefactorError::InvalidName { .. } | RefactorError::MissingBinding { .. } => None,
    }
}
