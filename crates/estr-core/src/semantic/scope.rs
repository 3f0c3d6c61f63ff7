//! Scope storage for binding resolution
//!
//! Scopes live in an arena and are addressed by [`ScopeId`]. They carry no
//! parent pointers: the enclosing scope of a scope is only known positionally,
//! through the resolver's stack.

use std::fmt;

use id_arena::{Arena, Id};
use serde::Serialize;

use crate::syntax::{NodeId, SourceLoc};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Program,
    /// Parameter list with defaults or patterns, resolved apart from the body.
    Parameters,
    Function,
    Catch,
    Block,
    Class,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScopeKind::Program => "program",
            ScopeKind::Parameters => "parameters",
            ScopeKind::Function => "function",
            ScopeKind::Catch => "catch",
            ScopeKind::Block => "block",
            ScopeKind::Class => "class",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationKind {
    Function,
    Var,
    Let,
    Const,
    Class,
    Parameter,
    FunctionExpressionName,
    ClassExpressionName,
    CatchParameter,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
            DeclarationKind::Class => "class",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::FunctionExpressionName => "function-expression-name",
            DeclarationKind::ClassExpressionName => "class-expression-name",
            DeclarationKind::CatchParameter => "catch-parameter",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name bound in a scope: the declaring identifier and the form that
/// introduced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub ident: NodeId,
    pub kind: DeclarationKind,
}

impl Declaration {
    pub fn new(ident: NodeId, kind: DeclarationKind) -> Self {
        Self { ident, kind }
    }
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The syntax node that opened this scope.
    pub node: NodeId,
    pub loc: SourceLoc,
    /// In discovery order.
    pub declarations: Vec<Declaration>,
    /// Occurrences inside this scope bound by an enclosing scope.
    pub free_variables: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct ScopeTree {
    arena: Arena<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_scope(
        &mut self,
        kind: ScopeKind,
        node: NodeId,
        loc: SourceLoc,
        declarations: Vec<Declaration>,
    ) -> ScopeId {
        self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            node,
            loc,
            declarations,
            free_variables: Vec::new(),
        })
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.arena[id]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.arena.iter().map(|(_, scope)| scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Node, NodeKind, Position, TextRange};

    fn dummy_node(arena: &mut Arena<Node>) -> NodeId {
        arena.alloc(Node {
            kind: NodeKind::Identifier {
                name: "x".to_string(),
                shorthand: false,
            },
            range: TextRange::new(0, 1),
            loc: SourceLoc {
                start: Position::new(1, 0),
                end: Position::new(1, 1),
            },
        })
    }

    #[test]
    fn create_scope_assigns_ids() {
        let mut nodes = Arena::new();
        let node = dummy_node(&mut nodes);
        let mut tree = ScopeTree::new();

        let program = tree.create_scope(ScopeKind::Program, node, SourceLoc::default(), Vec::new());
        let function = tree.create_scope(
            ScopeKind::Function,
            node,
            SourceLoc::default(),
            vec![Declaration::new(node, DeclarationKind::Parameter)],
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(program).id, program);
        assert_eq!(tree.get(function).kind, ScopeKind::Function);
        assert_eq!(tree.get(function).declarations.len(), 1);
        assert!(tree.get(function).free_variables.is_empty());
    }

    #[test]
    fn free_variables_are_mutable() {
        let mut nodes = Arena::new();
        let node = dummy_node(&mut nodes);
        let mut tree = ScopeTree::new();
        let scope = tree.create_scope(ScopeKind::Catch, node, SourceLoc::default(), Vec::new());

        tree.get_mut(scope).free_variables.push(node);

        assert_eq!(tree.get(scope).free_variables, vec![node]);
    }

    #[test]
    fn declaration_kind_labels() {
        assert_eq!(DeclarationKind::CatchParameter.to_string(), "catch-parameter");
        assert_eq!(
            DeclarationKind::FunctionExpressionName.as_str(),
            "function-expression-name"
        );
        assert_eq!(ScopeKind::Parameters.to_string(), "parameters");
    }
}
