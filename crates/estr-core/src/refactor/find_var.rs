use serde::Serialize;

use crate::parser::ParsedFile;
use crate::semantic::{
    Declaration, DeclarationKind, ScopeAnalysis, ScopeId, ScopeKind, ScopeResolver, Target,
    Warning,
};
use crate::syntax::{NodeId, Position, SourceLoc, SyntaxTree};

use super::{RefactorError, Refactoring, syntax_tree};

/// A located binding: its scope, its declaration and the occurrences bound
/// to it. Keeps the analysis it was found in so callers can inspect scopes.
#[derive(Debug)]
pub struct FoundVariable {
    pub scope: ScopeId,
    pub declaration: Declaration,
    /// Non-declaring occurrences, in resolution order.
    pub occurrences: Vec<NodeId>,
    pub analysis: ScopeAnalysis,
}

impl FoundVariable {
    pub fn report(&self, tree: &SyntaxTree) -> VariableReport {
        let scope = self.analysis.scope(self.scope);
        VariableReport {
            name: tree.name(self.declaration.ident).unwrap_or_default().to_string(),
            kind: self.declaration.kind,
            scope: ScopeReport {
                kind: scope.kind,
                span: scope.loc.to_span_string(),
                loc: scope.loc,
            },
            declaration: tree[self.declaration.ident].loc,
            occurrences: self
                .occurrences
                .iter()
                .map(|&ident| tree[ident].loc)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeReport {
    pub kind: ScopeKind,
    pub span: String,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableReport {
    pub name: String,
    pub kind: DeclarationKind,
    pub scope: ScopeReport,
    pub declaration: SourceLoc,
    pub occurrences: Vec<SourceLoc>,
}

/// Locate the binding of `name` at `position`. A hoisting conflict adds a
/// warning but does not fail the lookup.
pub fn find_var(parsed: &ParsedFile, name: &str, position: Position) -> Refactoring<FoundVariable> {
    let tree = match syntax_tree(parsed) {
        Ok(tree) => tree,
        Err(error) => return Refactoring::err(error, Vec::new()),
    };

    let analysis = ScopeResolver::new(tree)
        .with_target(Target::new(name, position))
        .resolve();
    let mut warnings = analysis.warnings().to_vec();

    let Some(scope) = analysis.binding_scope() else {
        return Refactoring::err(
            RefactorError::NoBindingScope {
                name: name.to_string(),
                position,
            },
            warnings,
        );
    };
    let Some(declaration) = analysis.find_declaration(tree, scope, name) else {
        return Refactoring::err(
            RefactorError::MissingBinding {
                name: name.to_string(),
            },
            warnings,
        );
    };

    let occurrences = analysis.occurrences(declaration.ident).to_vec();
    let hoisted = analysis.has_hoist_conflict(declaration.ident)
        || occurrences
            .iter()
            .any(|&ident| analysis.has_hoist_conflict(ident));
    if hoisted {
        warnings.push(Warning::new("information affected by hoisting over catch"));
    }

    tracing::debug!(
        name,
        %position,
        occurrences = occurrences.len(),
        hoisted,
        "variable found"
    );

    Refactoring::ok(
        FoundVariable {
            scope,
            declaration,
            occurrences,
            analysis,
        },
        warnings,
    )
}

/// [`find_var`] summarised as a [`VariableReport`].
pub fn find_var_report(
    parsed: &ParsedFile,
    name: &str,
    position: Position,
) -> Refactoring<VariableReport> {
    let Refactoring { outcome, warnings } = find_var(parsed, name, position);
    let outcome =
        outcome.and_then(|found| syntax_tree(parsed).map(|tree| found.report(tree)));
    Refactoring { outcome, warnings }
}
