//! Tag extraction for ctags-style index files
//!
//! Tags are gathered into an explicit accumulator per run. Scopes are the
//! span strings of enclosing functions, or `global` at top level.

use std::fmt;

use serde::Serialize;

use crate::parser::{ParseError, ParsedFile};
use crate::syntax::walk::{Visitor, binding_identifiers, walk};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

const GLOBAL: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TagKind {
    #[serde(rename = "f")]
    Function,
    #[serde(rename = "fe")]
    FunctionExpression,
    #[serde(rename = "vp")]
    Parameter,
    #[serde(rename = "v")]
    Variable,
    #[serde(rename = "ve")]
    CatchParameter,
    #[serde(rename = "export")]
    Export,
    #[serde(rename = "prototype")]
    Prototype,
    #[serde(rename = "fa")]
    FunctionAssignment,
    #[serde(rename = "property")]
    Property,
}

impl TagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Function => "f",
            TagKind::FunctionExpression => "fe",
            TagKind::Parameter => "vp",
            TagKind::Variable => "v",
            TagKind::CatchParameter => "ve",
            TagKind::Export => "export",
            TagKind::Prototype => "prototype",
            TagKind::FunctionAssignment => "fa",
            TagKind::Property => "property",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub kind: TagKind,
    pub scope: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{};\"\t{}\tlineno:{}\tscope:{}",
            self.name, self.file, self.line, self.kind, self.line, self.scope
        )
    }
}

/// Accumulates tags for one file.
#[derive(Debug)]
pub struct TagCollector {
    file: String,
    classic: bool,
    scopes: Vec<String>,
    tags: Vec<Tag>,
}

impl TagCollector {
    /// With `classic` set, function-valued member assignments and object
    /// literal properties are tagged as well.
    pub fn new(file: impl Into<String>, classic: bool) -> Self {
        Self {
            file: file.into(),
            classic,
            scopes: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn collect(mut self, tree: &SyntaxTree) -> Vec<Tag> {
        walk(tree, tree.root(), &mut self);
        self.tags
    }

    fn push(&mut self, tree: &SyntaxTree, ident: NodeId, kind: TagKind, scope: String) {
        let Some(name) = tree.name(ident) else {
            return;
        };
        self.tags.push(Tag {
            name: name.to_string(),
            file: self.file.clone(),
            line: tree[ident].loc.start.line,
            kind,
            scope,
        });
    }

    fn enclosing(&self) -> String {
        self.scopes
            .last()
            .cloned()
            .unwrap_or_else(|| GLOBAL.to_string())
    }

    fn parameters(&mut self, tree: &SyntaxTree, params: &[NodeId], span: &str) {
        for &param in params {
            for ident in binding_identifiers(tree, param) {
                self.push(tree, ident, TagKind::Parameter, span.to_string());
            }
        }
    }

    fn assignment(&mut self, tree: &SyntaxTree, left: NodeId, right: NodeId) {
        let NodeKind::MemberExpression {
            object,
            property,
            computed: false,
        } = tree.kind(left)
        else {
            return;
        };

        let kind = if tree.name(*object) == Some("exports") {
            TagKind::Export
        } else if matches!(
            tree.kind(*object),
            NodeKind::MemberExpression { property: inner, computed: false, .. }
                if tree.name(*inner) == Some("prototype")
        ) {
            TagKind::Prototype
        } else if self.classic && tree.kind(right).is_function() {
            TagKind::FunctionAssignment
        } else {
            return;
        };
        self.push(tree, *property, kind, GLOBAL.to_string());
    }

    fn object_properties(&mut self, tree: &SyntaxTree, properties: &[NodeId]) {
        for &property in properties {
            let NodeKind::Property {
                key: Some(key),
                value: Some(value),
                computed: false,
            } = tree.kind(property)
            else {
                continue;
            };
            if !tree.kind(*value).is_function() {
                continue;
            }
            let name = match tree.kind(*key) {
                NodeKind::StringLiteral { value } => value.clone(),
                NodeKind::Identifier { name, .. } => name.clone(),
                _ => continue,
            };
            self.tags.push(Tag {
                name,
                file: self.file.clone(),
                line: tree[property].loc.start.line,
                kind: TagKind::Property,
                scope: GLOBAL.to_string(),
            });
        }
    }
}

impl Visitor for TagCollector {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId, children: &[NodeId]) {
        let mut opened = false;

        match tree.kind(node) {
            NodeKind::FunctionDeclaration { id, params, .. } => {
                let span = tree[node].loc.to_span_string();
                let enclosing = self.enclosing();
                self.push(tree, *id, TagKind::Function, enclosing);
                self.parameters(tree, params, &span);
                self.scopes.push(span);
                opened = true;
            }
            NodeKind::FunctionExpression { id, params, .. } => {
                let span = tree[node].loc.to_span_string();
                if let Some(id) = id {
                    self.push(tree, *id, TagKind::FunctionExpression, span.clone());
                }
                self.parameters(tree, params, &span);
                self.scopes.push(span);
                opened = true;
            }
            NodeKind::VariableDeclarator { id, .. } => {
                let enclosing = self.enclosing();
                for ident in binding_identifiers(tree, *id) {
                    self.push(tree, ident, TagKind::Variable, enclosing.clone());
                }
            }
            NodeKind::CatchClause {
                param: Some(param), ..
            } => {
                let span = tree[node].loc.to_span_string();
                for ident in binding_identifiers(tree, *param) {
                    self.push(tree, ident, TagKind::CatchParameter, span.clone());
                }
            }
            NodeKind::AssignmentExpression {
                compound: false,
                left,
                right,
            } => self.assignment(tree, *left, *right),
            NodeKind::ObjectExpression { properties } if self.classic => {
                self.object_properties(tree, properties);
            }
            _ => {}
        }

        for &child in children {
            walk(tree, child, self);
        }

        if opened {
            self.scopes.pop();
        }
    }
}

/// Parse failures surface as the first parse error of the file.
pub fn extract_tags(parsed: &ParsedFile, classic: bool) -> Result<Vec<Tag>, ParseError> {
    match parsed.tree() {
        Some(tree) => Ok(TagCollector::new(parsed.filename(), classic).collect(tree)),
        None => Err(parsed.errors().first().cloned().unwrap_or_else(|| ParseError {
            line: 0,
            column: 0,
            span_lo: 0,
            span_hi: 0,
            message: "no syntax tree".to_string(),
        })),
    }
}

/// Render a sorted tag file. Tags are ordered by name; ties keep their
/// input order.
pub fn tag_file(mut tags: Vec<Tag>) -> String {
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    out.push_str("!_TAG_FILE_SORTED\t1\t\n");
    out.push_str("!_TAG_PROGRAM_NAME\testr\t\n");
    out.push_str(concat!("!_TAG_PROGRAM_VERSION\t", env!("CARGO_PKG_VERSION"), "\t\n"));
    for tag in &tags {
        out.push_str(&tag.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(code: &str, classic: bool) -> Vec<Tag> {
        let parsed = ParsedFile::from_source("sample.js", code);
        extract_tags(&parsed, classic).unwrap()
    }

    fn summary(tags: &[Tag]) -> Vec<String> {
        tags.iter()
            .map(|t| format!("{} {} {} {}", t.name, t.kind, t.line, t.scope))
            .collect()
    }

    #[test]
    fn functions_parameters_and_variables() {
        let code = "var a = 1;\nfunction f(x, y) {\n  var b;\n  var g = function h(z) {};\n}";

        assert_eq!(
            summary(&tags(code, false)),
            vec![
                "a v 1 global",
                "f f 2 global",
                "x vp 2 2:1-5:1",
                "y vp 2 2:1-5:1",
                "b v 3 2:1-5:1",
                "g v 4 2:1-5:1",
                "h fe 4 4:11-4:26",
                "z vp 4 4:11-4:26",
            ]
        );
    }

    #[test]
    fn nested_function_declaration_scope_is_enclosing_function() {
        let code = "function outer() {\n  function inner() {}\n}";

        assert_eq!(
            summary(&tags(code, false)),
            vec!["outer f 1 global", "inner f 2 1:1-3:1"]
        );
    }

    #[test]
    fn catch_parameter_scope_is_the_clause() {
        let code = "try {} catch (err) {}";

        assert_eq!(summary(&tags(code, false)), vec!["err ve 1 1:8-1:21"]);
    }

    #[test]
    fn exports_and_prototype_assignments() {
        let code = "exports.run = run;\nFoo.prototype.bar = 1;\nobj.method = function() {};";

        assert_eq!(
            summary(&tags(code, false)),
            vec!["run export 1 global", "bar prototype 2 global"]
        );
    }

    #[test]
    fn classic_mode_adds_function_assignments_and_properties() {
        let code = "obj.method = function() {};\nvar o = { 'quoted': function() {}, plain: function() {}, data: 1 };";
        let names: Vec<String> = summary(&tags(code, true));

        assert!(names.contains(&"method fa 1 global".to_string()));
        assert!(names.contains(&"quoted property 2 global".to_string()));
        assert!(names.contains(&"plain property 2 global".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("data ")));
    }

    #[test]
    fn tag_file_is_sorted_with_headers() {
        let file = tag_file(tags("var b;\nvar a;", false));
        let lines: Vec<&str> = file.lines().collect();

        assert_eq!(lines[0], "!_TAG_FILE_SORTED\t1\t");
        assert_eq!(lines[1], "!_TAG_PROGRAM_NAME\testr\t");
        assert!(lines[2].starts_with("!_TAG_PROGRAM_VERSION\t"));
        assert_eq!(lines[3], "a\tsample.js\t2;\"\tv\tlineno:2\tscope:global");
        assert_eq!(lines[4], "b\tsample.js\t1;\"\tv\tlineno:1\tscope:global");
    }

    #[test]
    fn unparsable_file_reports_error() {
        let parsed = ParsedFile::from_source("bad.js", "var = ;");

        assert!(extract_tags(&parsed, false).is_err());
    }
}
