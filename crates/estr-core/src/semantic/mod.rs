//! Semantic analysis module
//!
//! Declaration collection and static scope resolution over a [`SyntaxTree`].
//!
//! [`SyntaxTree`]: crate::syntax::SyntaxTree

pub mod declarations;
pub mod resolver;
pub mod scope;

use std::fmt;

use serde::Serialize;

use crate::syntax::SourceLoc;

pub use declarations::{Collected, collect_declarations, collect_lexical_declarations};
pub use resolver::{ScopeAnalysis, ScopeResolver, Target};
pub use scope::{Declaration, DeclarationKind, Scope, ScopeId, ScopeKind, ScopeTree};

/// Advisory message attached to an analysis or refactoring result. Warnings
/// never change control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLoc>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            loc: None,
        }
    }

    pub fn at(message: impl Into<String>, loc: SourceLoc) -> Self {
        Self {
            message: message.into(),
            loc: Some(loc),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{} ({loc})", self.message),
            None => f.write_str(&self.message),
        }
    }
}
