use std::fmt::Write as _;

use serde::Serialize;

use crate::parser::ParseError;
use crate::semantic::{DeclarationKind, Warning};
use crate::syntax::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Parse,
    InvalidName,
    MissingBinding,
    RenamedBindingConflict,
    CaptureExisting,
    CaptureRenamed,
    HoistConflict,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Parse => "Parse",
            ErrorKind::InvalidName => "InvalidName",
            ErrorKind::MissingBinding => "MissingBinding",
            ErrorKind::RenamedBindingConflict => "RenamedBindingConflict",
            ErrorKind::CaptureExisting => "CaptureExisting",
            ErrorKind::CaptureRenamed => "CaptureRenamed",
            ErrorKind::HoistConflict => "HoistConflict",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An occurrence that an intervening declaration of the new name would
/// capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub occurrence: Position,
    pub binder: Position,
    pub binder_kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefactorError {
    #[error("failed to parse {file}: {}", describe_parse_errors(.errors))]
    Parse {
        file: String,
        errors: Vec<ParseError>,
    },

    #[error("not a valid variable name >{name}<")]
    InvalidName { name: String },

    #[error("no binding scope found for {name} at {position}")]
    NoBindingScope { name: String, position: Position },

    #[error("binding for {name} not found in its binding scope")]
    MissingBinding { name: String },

    #[error(
        "renamed binding for {old_name} would conflict with existing binding for {new_name} in the same scope: {existing} '{existing_kind}'"
    )]
    RenamedBindingConflict {
        old_name: String,
        new_name: String,
        existing: Position,
        existing_kind: DeclarationKind,
    },

    #[error(
        "renamed binding for {old_name} would capture existing occurrences of {new_name}: {}",
        join_positions(.occurrences)
    )]
    CaptureExisting {
        old_name: String,
        new_name: String,
        occurrences: Vec<Position>,
    },

    #[error(
        "renamed occurrences of {old_name} would be captured by existing bindings for {new_name}: {}",
        describe_captures(.old_name, .new_name, .captures)
    )]
    CaptureRenamed {
        old_name: String,
        new_name: String,
        captures: Vec<Capture>,
    },

    #[error("cannot rename declaration hoisted over catch: {name} {position}")]
    HoistConflict { name: String, position: Position },
}

impl RefactorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefactorError::Parse { .. } => ErrorKind::Parse,
            RefactorError::InvalidName { .. } => ErrorKind::InvalidName,
            RefactorError::NoBindingScope { .. } | RefactorError::MissingBinding { .. } => {
                ErrorKind::MissingBinding
            }
            RefactorError::RenamedBindingConflict { .. } => ErrorKind::RenamedBindingConflict,
            RefactorError::CaptureExisting { .. } => ErrorKind::CaptureExisting,
            RefactorError::CaptureRenamed { .. } => ErrorKind::CaptureRenamed,
            RefactorError::HoistConflict { .. } => ErrorKind::HoistConflict,
        }
    }
}

fn describe_parse_errors(errors: &[ParseError]) -> String {
    match errors {
        [] => "unknown parse error".to_string(),
        [first] => first.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

fn join_positions(positions: &[Position]) -> String {
    positions
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_captures(old_name: &str, new_name: &str, captures: &[Capture]) -> String {
    let mut out = String::new();
    for (i, capture) in captures.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(
            out,
            "{old_name} {} by {new_name} {} '{}'",
            capture.occurrence, capture.binder, capture.binder_kind
        );
    }
    out
}

/// Outcome of a core operation together with the warnings gathered while
/// computing it. Warnings are carried on success and failure alike.
#[derive(Debug)]
pub struct Refactoring<T> {
    pub outcome: Result<T, RefactorError>,
    pub warnings: Vec<Warning>,
}

impl<T> Refactoring<T> {
    pub fn ok(value: T, warnings: Vec<Warning>) -> Self {
        Self {
            outcome: Ok(value),
            warnings,
        }
    }

    pub fn err(error: RefactorError, warnings: Vec<Warning>) -> Self {
        Self {
            outcome: Err(error),
            warnings,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Kind of the failure, if the operation failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.outcome.as_ref().err().map(RefactorError::kind)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Refactoring<U> {
        Refactoring {
            outcome: self.outcome.map(f),
            warnings: self.warnings,
        }
    }
}
