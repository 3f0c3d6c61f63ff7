//! Static scope resolution
//!
//! A single depth-first pass over the syntax tree with an explicit stack of
//! open scopes. Each scope's declarations are collected before anything
//! inside it is resolved. Every identifier in a reference position is then
//! resolved by searching the stack from the innermost scope outwards: the
//! first scope declaring the name binds it, and every scope rejected on the
//! way records the identifier as one of its free variables.
//!
//! Results are kept in side tables keyed by node and scope id.

use std::collections::{HashMap, HashSet};

use crate::syntax::walk::{KeyedChild, KeyedVisitor, binding_identifiers, walk_keyed};
use crate::syntax::{NodeId, NodeKind, Position, SyntaxTree};

use super::Warning;
use super::declarations::{Collected, collect_declarations, collect_lexical_declarations};
use super::scope::{Declaration, DeclarationKind, Scope, ScopeId, ScopeKind, ScopeTree};

/// A name at a source position whose binding scope should be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub position: Position,
}

impl Target {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Same name, same line, and the column falls within the identifier
    /// (both ends inclusive).
    fn matches(&self, tree: &SyntaxTree, ident: NodeId, name: &str) -> bool {
        let loc = tree[ident].loc;
        name == self.name
            && loc.start.line == self.position.line
            && loc.start.column <= self.position.column
            && loc.end.column >= self.position.column
    }
}

#[derive(Debug, Default)]
pub struct ScopeAnalysis {
    scopes: ScopeTree,
    companions: HashMap<ScopeId, ScopeId>,
    bound: HashMap<NodeId, NodeId>,
    occurrences: HashMap<NodeId, Vec<NodeId>>,
    inner_scopes: HashMap<NodeId, Vec<ScopeId>>,
    hoist_conflicts: HashSet<NodeId>,
    binding_scope: Option<ScopeId>,
    warnings: Vec<Warning>,
}

impl ScopeAnalysis {
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.get(id)
    }

    /// The other half of a function whose parameters and body were given
    /// separate scopes. Names declared in either half must stay distinct for
    /// a rename to keep their meaning.
    pub fn companion(&self, scope: ScopeId) -> Option<ScopeId> {
        self.companions.get(&scope).copied()
    }

    /// The program scope.
    pub fn root_scope(&self) -> Option<ScopeId> {
        self.scopes.iter().next().map(|scope| scope.id)
    }

    /// Scope binding the target name, when the target was found.
    pub fn binding_scope(&self) -> Option<ScopeId> {
        self.binding_scope
    }

    /// Declaring identifier an occurrence resolved to. `None` for implicit
    /// globals and for identifiers in non-reference positions.
    pub fn declaration_of(&self, ident: NodeId) -> Option<NodeId> {
        self.bound.get(&ident).copied()
    }

    /// Non-declaring occurrences bound to a declaring identifier, in
    /// resolution order.
    pub fn occurrences(&self, declaration: NodeId) -> &[NodeId] {
        self.occurrences
            .get(&declaration)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Scopes searched and rejected between an occurrence and its binder,
    /// innermost first.
    pub fn inner_scopes(&self, ident: NodeId) -> &[ScopeId] {
        self.inner_scopes
            .get(&ident)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_hoist_conflict(&self, ident: NodeId) -> bool {
        self.hoist_conflicts.contains(&ident)
    }

    /// First declaration of `name` in `scope`, in discovery order.
    pub fn find_declaration(
        &self,
        tree: &SyntaxTree,
        scope: ScopeId,
        name: &str,
    ) -> Option<Declaration> {
        self.scopes
            .get(scope)
            .declarations
            .iter()
            .find(|declaration| tree.name(declaration.ident) == Some(name))
            .copied()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Builds a [`ScopeAnalysis`] for a whole tree.
#[derive(Debug)]
pub struct ScopeResolver<'t> {
    tree: &'t SyntaxTree,
    target: Option<Target>,
}

impl<'t> ScopeResolver<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { tree, target: None }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn resolve(self) -> ScopeAnalysis {
        let mut pass = Pass {
            target: self.target,
            stack: Vec::new(),
            analysis: ScopeAnalysis::default(),
        };
        walk_keyed(self.tree, "root", self.tree.root(), &mut pass);

        tracing::debug!(
            scopes = pass.analysis.scopes.len(),
            resolved = pass.analysis.bound.len(),
            found = pass.analysis.binding_scope.is_some(),
            "scope resolution finished"
        );
        pass.analysis
    }
}

struct Pass {
    target: Option<Target>,
    stack: Vec<ScopeId>,
    analysis: ScopeAnalysis,
}

impl Pass {
    fn open_scope(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        kind: ScopeKind,
        declarations: Vec<Declaration>,
    ) -> ScopeId {
        for declaration in &declarations {
            self.analysis
                .occurrences
                .entry(declaration.ident)
                .or_default();
        }
        tracing::debug!(
            kind = %kind,
            loc = %tree[node].loc,
            declarations = declarations.len(),
            "open scope"
        );
        let id = self
            .analysis
            .scopes
            .create_scope(kind, node, tree[node].loc, declarations);
        self.stack.push(id);
        id
    }

    fn absorb(&mut self, collected: Collected) -> Vec<Declaration> {
        self.analysis
            .hoist_conflicts
            .extend(collected.hoist_conflicts);
        self.analysis.warnings.extend(collected.warnings);
        collected.declarations
    }

    fn parameters(tree: &SyntaxTree, params: &[NodeId]) -> Vec<Declaration> {
        params
            .iter()
            .flat_map(|&param| binding_identifiers(tree, param))
            .map(|ident| Declaration::new(ident, DeclarationKind::Parameter))
            .collect()
    }

    /// Open the scopes of a function and walk it. A parameter list of plain
    /// identifiers shares the body's scope. Any other list gets a scope of
    /// its own, declaring only the parameters and the expression name, so
    /// default values and patterns never see the body's declarations. A body
    /// `var` redeclaring a parameter stays bound to the parameter.
    fn enter_function(
        &mut self,
        tree: &SyntaxTree,
        node: NodeId,
        name: Option<NodeId>,
        params: &[NodeId],
        body: NodeId,
    ) {
        let mut declarations = Self::parameters(tree, params);
        if let Some(name) = name {
            declarations.push(Declaration::new(
                name,
                DeclarationKind::FunctionExpressionName,
            ));
        }
        let body_declarations = self.absorb(collect_declarations(tree, body));

        let simple = params
            .iter()
            .all(|&param| matches!(tree.kind(param), NodeKind::Identifier { .. }));
        if simple {
            declarations.extend(body_declarations);
            self.open_scope(tree, node, ScopeKind::Function, declarations);
            self.walk_head(tree, name, params);
        } else {
            let parameter_names: HashSet<&str> = declarations
                .iter()
                .filter(|declaration| declaration.kind == DeclarationKind::Parameter)
                .filter_map(|declaration| tree.name(declaration.ident))
                .collect();
            let own: Vec<Declaration> = body_declarations
                .into_iter()
                .filter(|declaration| {
                    declaration.kind != DeclarationKind::Var
                        || !tree
                            .name(declaration.ident)
                            .is_some_and(|declared| parameter_names.contains(declared))
                })
                .collect();

            let head = self.open_scope(tree, node, ScopeKind::Parameters, declarations);
            self.walk_head(tree, name, params);
            let inner = self.open_scope(tree, body, ScopeKind::Function, own);
            self.analysis.companions.insert(head, inner);
            self.analysis.companions.insert(inner, head);
        }
        self.walk_body(tree, body);
    }

    fn walk_head(&mut self, tree: &SyntaxTree, name: Option<NodeId>, params: &[NodeId]) {
        if let Some(name) = name {
            walk_keyed(tree, "id", name, self);
        }
        for &param in params {
            walk_keyed(tree, "params", param, self);
        }
    }

    /// Walk a function body without treating its block as a block scope:
    /// lexical declarations at that level belong to the function.
    fn walk_body(&mut self, tree: &SyntaxTree, body: NodeId) {
        match tree.kind(body) {
            NodeKind::BlockStatement { body: statements } => {
                for &statement in statements {
                    walk_keyed(tree, "body", statement, self);
                }
            }
            _ => walk_keyed(tree, "body", body, self),
        }
    }

    fn walk_all(&mut self, tree: &SyntaxTree, children: &[KeyedChild]) {
        for &(key, child) in children {
            walk_keyed(tree, key, child, self);
        }
    }

    fn resolve_identifier(&mut self, tree: &SyntaxTree, ident: NodeId) {
        let Some(name) = tree.name(ident) else {
            return;
        };

        let mut inner = Vec::new();
        for &scope_id in self.stack.iter().rev() {
            let binder = self
                .analysis
                .scopes
                .get(scope_id)
                .declarations
                .iter()
                .find(|declaration| tree.name(declaration.ident) == Some(name))
                .map(|declaration| declaration.ident);

            match binder {
                Some(declaring) => {
                    if declaring != ident {
                        self.analysis
                            .occurrences
                            .entry(declaring)
                            .or_default()
                            .push(ident);
                    }
                    self.analysis.bound.insert(ident, declaring);
                    if self
                        .target
                        .as_ref()
                        .is_some_and(|target| target.matches(tree, ident, name))
                    {
                        tracing::debug!(name, loc = %tree[ident].loc, "found binding scope");
                        self.analysis.binding_scope = Some(scope_id);
                    }
                    tracing::trace!(name, at = %tree[ident].loc.start, "resolved");
                    break;
                }
                None => {
                    self.analysis
                        .scopes
                        .get_mut(scope_id)
                        .free_variables
                        .push(ident);
                    inner.push(scope_id);
                }
            }
        }

        if inner.len() == self.stack.len() {
            tracing::trace!(name, at = %tree[ident].loc.start, "unresolved, implicit global");
        }
        self.analysis.inner_scopes.insert(ident, inner);
    }
}

impl KeyedVisitor for Pass {
    fn visit_keyed(
        &mut self,
        tree: &SyntaxTree,
        _key: &'static str,
        node: NodeId,
        children: &[KeyedChild],
    ) {
        let base = self.stack.len();

        match tree.kind(node) {
            NodeKind::Program { .. } => {
                let declarations = self.absorb(collect_declarations(tree, node));
                self.open_scope(tree, node, ScopeKind::Program, declarations);
                self.walk_all(tree, children);
            }
            NodeKind::FunctionDeclaration { id, params, body } => {
                // the name is bound where the function is declared
                walk_keyed(tree, "id", *id, self);
                self.enter_function(tree, node, None, params, *body);
            }
            NodeKind::FunctionExpression {
                id, params, body, ..
            } => {
                self.enter_function(tree, node, *id, params, *body);
            }
            NodeKind::ClassExpression { id: Some(id), .. } => {
                let declarations = vec![Declaration::new(*id, DeclarationKind::ClassExpressionName)];
                self.open_scope(tree, node, ScopeKind::Class, declarations);
                self.walk_all(tree, children);
            }
            NodeKind::CatchClause { param, .. } => {
                let declarations = param
                    .map(|param| binding_identifiers(tree, param))
                    .unwrap_or_default()
                    .into_iter()
                    .map(|ident| Declaration::new(ident, DeclarationKind::CatchParameter))
                    .collect();
                self.open_scope(tree, node, ScopeKind::Catch, declarations);
                self.walk_all(tree, children);
            }
            NodeKind::Identifier { .. } => self.resolve_identifier(tree, node),
            NodeKind::Property {
                key,
                value,
                computed,
            } => {
                if *computed && let Some(key) = key {
                    walk_keyed(tree, "key", *key, self);
                }
                if let Some(value) = value {
                    walk_keyed(tree, "value", *value, self);
                }
            }
            NodeKind::BreakStatement { .. } | NodeKind::ContinueStatement { .. } => {}
            NodeKind::LabeledStatement { body, .. } => {
                walk_keyed(tree, "body", *body, self);
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                walk_keyed(tree, "object", *object, self);
                if *computed {
                    walk_keyed(tree, "property", *property, self);
                }
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                // evaluated outside the case block
                walk_keyed(tree, "discriminant", *discriminant, self);
                let declarations = collect_lexical_declarations(tree, node);
                if !declarations.is_empty() {
                    self.open_scope(tree, node, ScopeKind::Block, declarations);
                }
                for &case in cases {
                    walk_keyed(tree, "cases", case, self);
                }
            }
            kind if kind.is_lexical_container() => {
                let declarations = collect_lexical_declarations(tree, node);
                if !declarations.is_empty() {
                    self.open_scope(tree, node, ScopeKind::Block, declarations);
                }
                self.walk_all(tree, children);
            }
            _ => self.walk_all(tree, children),
        }

        self.stack.truncate(base);
    }
}
