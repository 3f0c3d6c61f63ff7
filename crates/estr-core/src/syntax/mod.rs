//! Arena-backed ECMAScript syntax tree
//!
//! The swc AST is lowered into a flat [`SyntaxTree`] whose nodes are addressed
//! by [`NodeId`]. Every node kind exposes a fixed set of child slots, so
//! traversal is a `match` over [`NodeKind`] and analysis results live in side
//! tables keyed by node id instead of on the nodes themselves.

pub mod lower;
pub mod walk;

use std::fmt;
use std::ops::Index;

use id_arena::{Arena, Id};
use serde::Serialize;

pub type NodeId = Id<Node>;

/// Half-open byte range `[start, end)` into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 1-based line, 0-based column (counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line/column span of a node; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceLoc {
    pub start: Position,
    pub end: Position,
}

impl SourceLoc {
    /// Tag-file notation: `line:(column+1)-endLine:endColumn`.
    pub fn to_span_string(&self) -> String {
        format!(
            "{}:{}-{}:{}",
            self.start.line,
            self.start.column + 1,
            self.end.line,
            self.end.column
        )
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn is_lexical(self) -> bool {
        !matches!(self, VariableKind::Var)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },
    FunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        body: NodeId,
    },
    /// Also used for arrows, methods, accessors and class static blocks.
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        arrow: bool,
    },
    ClassDeclaration {
        id: NodeId,
        super_class: Option<NodeId>,
        body: Vec<NodeId>,
    },
    ClassExpression {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: Vec<NodeId>,
    },
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        kind: VariableKind,
        id: NodeId,
        init: Option<NodeId>,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    /// `for-in` and (with `of` set) `for-of`.
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
        of: bool,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    CatchClause {
        param: Option<NodeId>,
        body: NodeId,
    },
    LabeledStatement {
        label: NodeId,
        body: NodeId,
    },
    BreakStatement {
        label: Option<NodeId>,
    },
    ContinueStatement {
        label: Option<NodeId>,
    },
    AssignmentExpression {
        compound: bool,
        left: NodeId,
        right: NodeId,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    /// Object literal, object pattern and class members. A shorthand
    /// property has no key; its value is the shorthand identifier.
    Property {
        key: Option<NodeId>,
        value: Option<NodeId>,
        computed: bool,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    ArrayPattern {
        elements: Vec<NodeId>,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    RestElement {
        argument: NodeId,
    },
    Identifier {
        name: String,
        shorthand: bool,
    },
    StringLiteral {
        value: String,
    },
    /// Any construct without analysis-specific meaning.
    Generic {
        label: &'static str,
        children: Vec<(&'static str, NodeId)>,
    },
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::FunctionExpression { arrow: true, .. } => "ArrowFunctionExpression",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::ClassExpression { .. } => "ClassExpression",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { of: true, .. } => "ForOfStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::Generic { label, .. } => *label,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration { .. } | NodeKind::FunctionExpression { .. }
        )
    }

    /// Statements whose own block level can hold `let`/`const`/`class`.
    pub fn is_lexical_container(&self) -> bool {
        matches!(
            self,
            NodeKind::BlockStatement { .. }
                | NodeKind::ForStatement { .. }
                | NodeKind::ForInStatement { .. }
                | NodeKind::SwitchStatement { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub loc: SourceLoc,
}

impl Node {
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_shorthand(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Identifier {
                shorthand: true,
                ..
            }
        )
    }
}

#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Arena<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    /// Name of an identifier node, `None` for any other kind.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].identifier_name()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// All identifier nodes with the given name, in allocation order.
    pub fn identifiers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.identifier_name() == Some(name))
            .map(|(id, _)| id)
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

/// ECMAScript line terminators as `(start, next_line_start)` byte offsets:
/// LF, CR, LS and PS, with CRLF counted as one.
pub fn line_terminators(source: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut chars = source.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some((i, c)) = chars.next() {
            match c {
                '\r' if chars.peek().is_some_and(|&(_, next)| next == '\n') => {
                    chars.next();
                    return Some((i, i + 2));
                }
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => return Some((i, i + c.len_utf8())),
                _ => {}
            }
        }
        None
    })
}

/// Byte offset to line/column conversion over a source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(line_terminators(source).map(|(_, next)| next))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self
            .source
            .get(line_start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(offset - line_start);
        Position::new(line, column)
    }

    pub fn loc(&self, range: TextRange) -> SourceLoc {
        SourceLoc {
            start: self.position(range.start),
            end: self.position(range.end),
        }
    }
}
