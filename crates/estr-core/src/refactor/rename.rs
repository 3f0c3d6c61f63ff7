//! Capture-safe renaming
//!
//! A rename is only applied once every safety check has passed, in order:
//! both names are valid, the old name has a binding scope at the requested
//! position, the new name does not collide with a binder of that scope or of
//! its companion scope, no free occurrence of the new name would be
//! captured, no occurrence of the old binding would be captured by an
//! intervening binder of the new name, and no occurrence is involved in
//! hoisting over a catch parameter.
//! The first failing check aborts the rename.

use crate::parser::ParsedFile;
use crate::semantic::{ScopeAnalysis, ScopeResolver, Target};
use crate::syntax::{NodeId, Position, SyntaxTree};

use super::error::Capture;
use super::names::check_name;
use super::{RefactorError, Refactoring, syntax_tree};

pub fn rename(
    parsed: &ParsedFile,
    old_name: &str,
    position: Position,
    new_name: &str,
) -> Refactoring<String> {
    if let Err(error) = check_name(old_name).and_then(|()| check_name(new_name)) {
        return Refactoring::err(error, Vec::new());
    }

    let tree = match syntax_tree(parsed) {
        Ok(tree) => tree,
        Err(error) => return Refactoring::err(error, Vec::new()),
    };

    let analysis = ScopeResolver::new(tree)
        .with_target(Target::new(old_name, position))
        .resolve();

    let outcome = check(tree, &analysis, old_name, position, new_name)
        .map(|occurrences| replace(tree, parsed.source(), &occurrences, new_name));

    match &outcome {
        Ok(_) => tracing::debug!(old_name, new_name, %position, "rename applied"),
        Err(error) => tracing::debug!(kind = %error.kind(), %error, "rename rejected"),
    }

    Refactoring {
        outcome,
        warnings: analysis.into_warnings(),
    }
}

/// Run the safety checks, returning every identifier to rewrite (the
/// declaring occurrence included).
fn check(
    tree: &SyntaxTree,
    analysis: &ScopeAnalysis,
    old_name: &str,
    position: Position,
    new_name: &str,
) -> Result<Vec<NodeId>, RefactorError> {
    let scope_id = analysis
        .binding_scope()
        .ok_or_else(|| RefactorError::NoBindingScope {
            name: old_name.to_string(),
            position,
        })?;
    let scope = analysis.scope(scope_id);

    let old_binding = analysis.find_declaration(tree, scope_id, old_name);
    let existing = analysis.find_declaration(tree, scope_id, new_name).or_else(|| {
        analysis
            .companion(scope_id)
            .and_then(|companion| analysis.find_declaration(tree, companion, new_name))
    });
    if let Some(existing) = existing
        && old_binding.is_none_or(|old| old.ident != existing.ident)
    {
        return Err(RefactorError::RenamedBindingConflict {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            existing: tree[existing.ident].loc.start,
            existing_kind: existing.kind,
        });
    }

    let free: Vec<Position> = scope
        .free_variables
        .iter()
        .filter(|&&ident| tree.name(ident) == Some(new_name))
        .map(|&ident| tree[ident].loc.start)
        .collect();
    if !free.is_empty() {
        return Err(RefactorError::CaptureExisting {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            occurrences: free,
        });
    }

    let old_binding = old_binding.ok_or_else(|| RefactorError::MissingBinding {
        name: old_name.to_string(),
    })?;

    let mut occurrences = analysis.occurrences(old_binding.ident).to_vec();
    occurrences.push(old_binding.ident);

    let mut captures = Vec::new();
    let mut hoisted = None;
    for &occurrence in &occurrences {
        for &inner in analysis.inner_scopes(occurrence) {
            captures.extend(
                analysis
                    .scope(inner)
                    .declarations
                    .iter()
                    .filter(|declaration| tree.name(declaration.ident) == Some(new_name))
                    .map(|declaration| Capture {
                        occurrence: tree[occurrence].loc.start,
                        binder: tree[declaration.ident].loc.start,
                        binder_kind: declaration.kind,
                    }),
            );
        }
        if analysis.has_hoist_conflict(occurrence) {
            hoisted = Some(occurrence);
        }
    }

    if !captures.is_empty() {
        return Err(RefactorError::CaptureRenamed {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            captures,
        });
    }

    if let Some(ident) = hoisted {
        return Err(RefactorError::HoistConflict {
            name: old_name.to_string(),
            position: tree[ident].loc.start,
        });
    }

    Ok(occurrences)
}

/// Copy `source`, substituting `new_name` at every occurrence. A shorthand
/// property keeps its key: `{ a }` becomes `{ a: b }`.
fn replace(tree: &SyntaxTree, source: &str, occurrences: &[NodeId], new_name: &str) -> String {
    let mut sorted = occurrences.to_vec();
    sorted.sort_by_key(|&ident| tree[ident].range.start);
    sorted.dedup();

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for ident in sorted {
        let node = &tree[ident];
        let (start, end) = (node.range.start, node.range.end);
        out.push_str(&source[cursor..start]);
        if node.is_shorthand() {
            out.push_str(&source[start..end]);
            out.push_str(": ");
        }
        out.push_str(new_name);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refactor::ErrorKind;

    fn rename_in(code: &str, old: &str, line: usize, column: usize, new: &str) -> Refactoring<String> {
        let parsed = ParsedFile::from_source("test.js", code);
        rename(&parsed, old, Position::new(line, column), new)
    }

    #[test]
    fn renames_declaration_and_uses() {
        let result = rename_in("var a = 1;\nfunction f() { return a + a; }", "a", 1, 4, "b");

        assert_eq!(
            result.outcome.unwrap(),
            "var b = 1;\nfunction f() { return b + b; }"
        );
    }

    #[test]
    fn rename_from_a_use_site() {
        let result = rename_in("var a = 1;\na;", "a", 2, 0, "longer");

        assert_eq!(result.outcome.unwrap(), "var longer = 1;\nlonger;");
    }

    #[test]
    fn preserves_comments_and_whitespace() {
        let code = "/* a */ var  a = 1; // a\n\ta ;";
        let result = rename_in(code, "a", 1, 13, "z");

        assert_eq!(result.outcome.unwrap(), "/* a */ var  z = 1; // a\n\tz ;");
    }

    #[test]
    fn expands_shorthand_properties() {
        let result = rename_in("var a; var o = { a }; var { a: x } = o;", "a", 1, 4, "b");

        assert_eq!(
            result.outcome.unwrap(),
            "var b; var o = { a: b }; var { a: x } = o;"
        );
    }

    #[test]
    fn leaves_property_names_alone() {
        let result = rename_in("var a = {}; a.a = a;", "a", 1, 4, "q");

        assert_eq!(result.outcome.unwrap(), "var q = {}; q.a = q;");
    }

    #[test]
    fn renaming_to_the_same_name_is_identity() {
        let code = "function f(a) { return a; }";
        let result = rename_in(code, "a", 1, 11, "a");

        assert_eq!(result.outcome.unwrap(), code);
    }

    #[test]
    fn global_without_binder_is_missing() {
        let result = rename_in("exports.x = 1;", "exports", 1, 0, "x_____x");

        assert_eq!(result.error_kind(), Some(ErrorKind::MissingBinding));
    }

    #[test]
    fn wrong_position_is_missing() {
        let result = rename_in("var b = 1;", "b", 3, 0, "c");

        assert_eq!(result.error_kind(), Some(ErrorKind::MissingBinding));
    }

    #[test]
    fn parse_errors_are_reported() {
        let result = rename_in("var = ;", "a", 1, 0, "b");

        assert_eq!(result.error_kind(), Some(ErrorKind::Parse));
    }

    #[test]
    fn invalid_name_wins_over_parse_error() {
        let result = rename_in("var = ;", "a", 1, 0, "1abc");

        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidName));
    }

    #[test]
    fn conflicting_binder_in_same_scope() {
        let result = rename_in("function f(a, b) {}", "a", 1, 11, "b");

        match result.outcome {
            Err(RefactorError::RenamedBindingConflict { existing, existing_kind, .. }) => {
                assert_eq!(existing, Position::new(1, 14));
                assert_eq!(existing_kind.as_str(), "parameter");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hoist_warnings_travel_with_success() {
        let result = rename_in(
            "try {} catch (e) { var e; }\nvar other = 1;",
            "other",
            2,
            4,
            "renamed",
        );

        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn renames_switch_discriminant_with_outer_binding() {
        let result = rename_in("var x = 1; switch (x) { case 1: let x = 2; }", "x", 1, 4, "z");

        assert_eq!(
            result.outcome.unwrap(),
            "var z = 1; switch (z) { case 1: let x = 2; }"
        );
    }

    #[test]
    fn renames_default_parameter_with_outer_binding() {
        let result = rename_in(
            "var b = 1; function f(a = b) { var b = 2; return a; }",
            "b",
            1,
            4,
            "c",
        );

        assert_eq!(
            result.outcome.unwrap(),
            "var c = 1; function f(a = c) { var b = 2; return a; }"
        );
    }

    #[test]
    fn parameter_renamed_onto_body_var_conflicts() {
        let result = rename_in("function f(a = 1) { var b; return 0; }", "a", 1, 11, "b");

        assert_eq!(result.error_kind(), Some(ErrorKind::RenamedBindingConflict));
    }

    #[test]
    fn body_var_renamed_onto_parameter_conflicts() {
        let result = rename_in("function f(a = 1) { var b; return b; }", "b", 1, 24, "a");

        match result.outcome {
            Err(RefactorError::RenamedBindingConflict { existing, existing_kind, .. }) => {
                assert_eq!(existing, Position::new(1, 11));
                assert_eq!(existing_kind.as_str(), "parameter");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn outer_binding_renamed_onto_pattern_parameter_is_captured() {
        let result = rename_in("var b = 1; function f({ a } = b) {}", "b", 1, 4, "a");

        assert_eq!(result.error_kind(), Some(ErrorKind::CaptureRenamed));
    }

    #[test]
    fn capture_by_block_scoped_binding() {
        let result = rename_in("var y = 1; { let a; y; }", "y", 1, 4, "a");

        assert_eq!(result.error_kind(), Some(ErrorKind::CaptureRenamed));
    }
}
