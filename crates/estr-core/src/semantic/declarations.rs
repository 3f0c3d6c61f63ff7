//! Declaration collection for a scope root
//!
//! Hoisted declarations (`var` and function declarations) are collected
//! across blocks but never across nested functions. Lexical declarations
//! (`let`, `const`, `class`) are collected only at the root's own block
//! level; deeper ones belong to the block scope that directly holds them.
//!
//! A hoisted declaration that shares its name with an enclosing catch
//! parameter is flagged as a hoisting conflict.

use crate::syntax::walk::{Visitor, binding_identifiers, walk};
use crate::syntax::{NodeId, NodeKind, SyntaxTree, VariableKind};

use super::Warning;
use super::scope::{Declaration, DeclarationKind};

#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub declarations: Vec<Declaration>,
    /// Declaring identifiers hoisted over a catch parameter of the same name.
    pub hoist_conflicts: Vec<NodeId>,
    pub warnings: Vec<Warning>,
}

pub fn collect_declarations(tree: &SyntaxTree, root: NodeId) -> Collected {
    let mut collector = Collector {
        root,
        catches: Vec::new(),
        lexical_depth: 0,
        out: Collected::default(),
    };
    walk(tree, root, &mut collector);
    collector.out
}

/// Lexical declarations held directly by a block, `for` head or `switch`.
pub fn collect_lexical_declarations(tree: &SyntaxTree, container: NodeId) -> Vec<Declaration> {
    let statements: Vec<NodeId> = match tree.kind(container) {
        NodeKind::BlockStatement { body } => body.clone(),
        NodeKind::ForStatement { init, .. } => init.iter().copied().collect(),
        NodeKind::ForInStatement { left, .. } => vec![*left],
        NodeKind::SwitchStatement { cases, .. } => cases
            .iter()
            .flat_map(|&case| match tree.kind(case) {
                NodeKind::Generic { children, .. } => children
                    .iter()
                    .filter(|(key, _)| *key == "consequent")
                    .map(|&(_, stmt)| stmt)
                    .collect(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut declarations = Vec::new();
    for statement in statements {
        match tree.kind(statement) {
            NodeKind::VariableDeclaration { kind, declarations: declarators } if kind.is_lexical() => {
                for &declarator in declarators {
                    if let NodeKind::VariableDeclarator { id, .. } = tree.kind(declarator) {
                        declarations.extend(
                            binding_identifiers(tree, *id)
                                .into_iter()
                                .map(|ident| Declaration::new(ident, lexical_kind(*kind))),
                        );
                    }
                }
            }
            NodeKind::ClassDeclaration { id, .. } => {
                declarations.push(Declaration::new(*id, DeclarationKind::Class));
            }
            _ => {}
        }
    }
    declarations
}

fn lexical_kind(kind: VariableKind) -> DeclarationKind {
    match kind {
        VariableKind::Var => DeclarationKind::Var,
        VariableKind::Let => DeclarationKind::Let,
        VariableKind::Const => DeclarationKind::Const,
    }
}

struct Collector {
    root: NodeId,
    catches: Vec<String>,
    lexical_depth: usize,
    out: Collected,
}

impl Collector {
    fn hoisted(&mut self, tree: &SyntaxTree, ident: NodeId, kind: DeclarationKind, site: NodeId) {
        let name = tree.name(ident).unwrap_or_default();
        if self.catches.iter().any(|caught| caught == name) {
            let form = if kind == DeclarationKind::Function {
                "function"
            } else {
                "var"
            };
            let loc = tree[site].loc;
            tracing::warn!(name, %loc, "{form} declaration hoisted over catch parameter");
            self.out.hoist_conflicts.push(ident);
            self.out.warnings.push(Warning::at(
                format!("hoisting {form} declaration over catch of same name: {name}"),
                loc,
            ));
        }
        self.out.declarations.push(Declaration::new(ident, kind));
    }
}

impl Visitor for Collector {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId, children: &[NodeId]) {
        match tree.kind(node) {
            NodeKind::FunctionDeclaration { id, .. } => {
                self.hoisted(tree, *id, DeclarationKind::Function, node);
                return;
            }
            NodeKind::FunctionExpression { .. } | NodeKind::ClassExpression { .. } => return,
            NodeKind::ClassDeclaration { id, .. } => {
                if self.lexical_depth == 0 {
                    self.out
                        .declarations
                        .push(Declaration::new(*id, DeclarationKind::Class));
                }
                return;
            }
            NodeKind::VariableDeclarator { kind, id, .. } => {
                for ident in binding_identifiers(tree, *id) {
                    if !kind.is_lexical() {
                        self.hoisted(tree, ident, DeclarationKind::Var, node);
                    } else if self.lexical_depth == 0 {
                        self.out
                            .declarations
                            .push(Declaration::new(ident, lexical_kind(*kind)));
                    }
                }
            }
            NodeKind::CatchClause { param, body } => {
                let names: Vec<String> = param
                    .map(|param| binding_identifiers(tree, param))
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|ident| tree.name(ident).map(str::to_string))
                    .collect();
                let pushed = names.len();
                self.catches.extend(names);
                walk(tree, *body, self);
                self.catches.truncate(self.catches.len() - pushed);
                return;
            }
            _ => {}
        }

        let nested = node != self.root && tree.kind(node).is_lexical_container();
        if nested {
            self.lexical_depth += 1;
        }
        for &child in children {
            walk(tree, child, self);
        }
        if nested {
            self.lexical_depth -= 1;
        }
    }
}
