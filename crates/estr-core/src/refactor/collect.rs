use serde::Serialize;

use crate::parser::ParsedFile;
use crate::semantic::{DeclarationKind, collect_declarations};
use crate::syntax::SourceLoc;

use super::{Refactoring, syntax_tree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationReport {
    pub name: String,
    pub kind: DeclarationKind,
    pub loc: SourceLoc,
    /// Hoisted over a catch parameter of the same name.
    pub hoist_conflict: bool,
}

/// Declarations of the program scope, in discovery order.
pub fn collect(parsed: &ParsedFile) -> Refactoring<Vec<DeclarationReport>> {
    let tree = match syntax_tree(parsed) {
        Ok(tree) => tree,
        Err(error) => return Refactoring::err(error, Vec::new()),
    };

    let collected = collect_declarations(tree, tree.root());
    let reports = collected
        .declarations
        .iter()
        .map(|declaration| DeclarationReport {
            name: tree
                .name(declaration.ident)
                .unwrap_or_default()
                .to_string(),
            kind: declaration.kind,
            loc: tree[declaration.ident].loc,
            hoist_conflict: collected.hoist_conflicts.contains(&declaration.ident),
        })
        .collect();

    Refactoring::ok(reports, collected.warnings)
}
