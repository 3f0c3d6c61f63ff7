//! Binding lookup, declaration listing and capture-safe renaming.

pub mod collect;
pub mod error;
pub mod find_var;
pub mod names;
pub mod rename;

pub use collect::{DeclarationReport, collect};
pub use error::{Capture, ErrorKind, RefactorError, Refactoring};
pub use find_var::{FoundVariable, ScopeReport, VariableReport, find_var, find_var_report};
pub use names::check_name;
pub use rename::rename;

use crate::parser::ParsedFile;
use crate::syntax::SyntaxTree;

fn syntax_tree(parsed: &ParsedFile) -> Result<&SyntaxTree, RefactorError> {
    parsed.tree().ok_or_else(|| RefactorError::Parse {
        file: parsed.filename().to_string(),
        errors: parsed.errors().to_vec(),
    })
}
