//! Lowering from the swc AST into the arena [`SyntaxTree`].
//!
//! Constructs with scoping meaning map onto dedicated [`NodeKind`]s; the rest
//! become [`NodeKind::Generic`] nodes that keep their children so no
//! identifier is lost. Arrows, methods, accessors and static blocks all lower
//! to `FunctionExpression`, and class members lower to `Property`.

use id_arena::Arena;
use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    ArrayPat, AssignOp, AssignTarget, AssignTargetPat, BlockStmt, BlockStmtOrExpr, Callee, CatchClause,
    Class, ClassMember, Decl, Expr, ExprOrSpread, ForHead, Function, Ident, IdentName, Key,
    MemberExpr, MemberProp, ObjectPat, ObjectPatProp, OptChainBase, Pat, Prop, PropName, PropOrSpread,
    Script, SimpleAssignTarget, Stmt, SuperProp, SuperPropExpr, SwitchCase, Tpl, VarDecl,
    VarDeclKind, VarDeclOrExpr, VarDeclarator,
};

use super::{LineIndex, Node, NodeId, NodeKind, SyntaxTree, TextRange, VariableKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported syntax: {construct}")]
pub struct LowerError {
    pub construct: &'static str,
    offset: usize,
}

impl LowerError {
    /// Byte offset of the unsupported construct.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Lower a parsed script. `base` is the start position of the source file in
/// its source map; node ranges are made relative to it.
pub fn lower_script(script: &Script, source: &str, base: BytePos) -> Result<SyntaxTree, LowerError> {
    let mut lowering = Lowering {
        nodes: Arena::new(),
        source,
        lines: LineIndex::new(source),
        base: base.0,
        unsupported: None,
    };

    let body = lowering.stmts(&script.body);
    let range = TextRange::new(0, source.len());
    let root = lowering.nodes.alloc(Node {
        kind: NodeKind::Program { body },
        range,
        loc: lowering.lines.loc(range),
    });

    match lowering.unsupported {
        Some(error) => Err(error),
        None => Ok(SyntaxTree::from_parts(lowering.nodes, root)),
    }
}

struct Lowering<'a> {
    nodes: Arena<Node>,
    source: &'a str,
    lines: LineIndex<'a>,
    base: u32,
    unsupported: Option<LowerError>,
}

type Children = Vec<(&'static str, NodeId)>;

impl Lowering<'_> {
    fn range(&self, span: Span) -> TextRange {
        TextRange::new(
            span.lo.0.saturating_sub(self.base) as usize,
            span.hi.0.saturating_sub(self.base) as usize,
        )
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let range = self.range(span);
        let loc = self.lines.loc(range);
        self.nodes.alloc(Node { kind, range, loc })
    }

    fn generic(&mut self, label: &'static str, children: Children, span: Span) -> NodeId {
        self.alloc(NodeKind::Generic { label, children }, span)
    }

    fn leaf(&mut self, label: &'static str, span: Span) -> NodeId {
        self.generic(label, Vec::new(), span)
    }

    fn unsupported(&mut self, construct: &'static str, span: Span) -> NodeId {
        if self.unsupported.is_none() {
            self.unsupported = Some(LowerError {
                construct,
                offset: self.range(span).start,
            });
        }
        self.leaf("Unsupported", span)
    }

    fn ident(&mut self, ident: &Ident, shorthand: bool) -> NodeId {
        let name = ident.sym.to_string();
        self.alloc(NodeKind::Identifier { name, shorthand }, ident.span)
    }

    fn ident_name(&mut self, ident: &IdentName) -> NodeId {
        let name = ident.sym.to_string();
        self.alloc(
            NodeKind::Identifier {
                name,
                shorthand: false,
            },
            ident.span,
        )
    }

    // Statements

    fn stmts(&mut self, stmts: &[Stmt]) -> Vec<NodeId> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn stmt(&mut self, stmt: &Stmt) -> NodeId {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::Empty(empty) => self.leaf("EmptyStatement", empty.span),
            Stmt::Debugger(debugger) => self.leaf("DebuggerStatement", debugger.span),
            Stmt::With(with) => {
                let object = self.expr(&with.obj);
                let body = self.stmt(&with.body);
                self.generic(
                    "WithStatement",
                    vec![("object", object), ("body", body)],
                    with.span,
                )
            }
            Stmt::Return(ret) => {
                let mut children = Vec::new();
                if let Some(arg) = &ret.arg {
                    children.push(("argument", self.expr(arg)));
                }
                self.generic("ReturnStatement", children, ret.span)
            }
            Stmt::Labeled(labeled) => {
                let label = self.ident(&labeled.label, false);
                let body = self.stmt(&labeled.body);
                self.alloc(NodeKind::LabeledStatement { label, body }, labeled.span)
            }
            Stmt::Break(brk) => {
                let label = brk.label.as_ref().map(|label| self.ident(label, false));
                self.alloc(NodeKind::BreakStatement { label }, brk.span)
            }
            Stmt::Continue(cont) => {
                let label = cont.label.as_ref().map(|label| self.ident(label, false));
                self.alloc(NodeKind::ContinueStatement { label }, cont.span)
            }
            Stmt::If(if_stmt) => {
                let mut children = vec![
                    ("test", self.expr(&if_stmt.test)),
                    ("consequent", self.stmt(&if_stmt.cons)),
                ];
                if let Some(alt) = &if_stmt.alt {
                    children.push(("alternate", self.stmt(alt)));
                }
                self.generic("IfStatement", children, if_stmt.span)
            }
            Stmt::Switch(switch) => {
                let discriminant = self.expr(&switch.discriminant);
                let cases = switch.cases.iter().map(|case| self.switch_case(case)).collect();
                self.alloc(
                    NodeKind::SwitchStatement {
                        discriminant,
                        cases,
                    },
                    switch.span,
                )
            }
            Stmt::Throw(throw) => {
                let argument = self.expr(&throw.arg);
                self.generic("ThrowStatement", vec![("argument", argument)], throw.span)
            }
            Stmt::Try(try_stmt) => {
                let mut children = vec![("block", self.block(&try_stmt.block))];
                if let Some(handler) = &try_stmt.handler {
                    children.push(("handler", self.catch_clause(handler)));
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    children.push(("finalizer", self.block(finalizer)));
                }
                self.generic("TryStatement", children, try_stmt.span)
            }
            Stmt::While(while_stmt) => {
                let test = self.expr(&while_stmt.test);
                let body = self.stmt(&while_stmt.body);
                self.generic(
                    "WhileStatement",
                    vec![("test", test), ("body", body)],
                    while_stmt.span,
                )
            }
            Stmt::DoWhile(do_while) => {
                let body = self.stmt(&do_while.body);
                let test = self.expr(&do_while.test);
                self.generic(
                    "DoWhileStatement",
                    vec![("body", body), ("test", test)],
                    do_while.span,
                )
            }
            Stmt::For(for_stmt) => {
                let init = for_stmt.init.as_ref().map(|init| match init {
                    VarDeclOrExpr::VarDecl(var_decl) => self.var_decl(var_decl),
                    VarDeclOrExpr::Expr(expr) => self.expr(expr),
                });
                let test = for_stmt.test.as_ref().map(|test| self.expr(test));
                let update = for_stmt.update.as_ref().map(|update| self.expr(update));
                let body = self.stmt(&for_stmt.body);
                self.alloc(
                    NodeKind::ForStatement {
                        init,
                        test,
                        update,
                        body,
                    },
                    for_stmt.span,
                )
            }
            Stmt::ForIn(for_in) => {
                let left = self.for_head(&for_in.left);
                let right = self.expr(&for_in.right);
                let body = self.stmt(&for_in.body);
                self.alloc(
                    NodeKind::ForInStatement {
                        left,
                        right,
                        body,
                        of: false,
                    },
                    for_in.span,
                )
            }
            Stmt::ForOf(for_of) => {
                let left = self.for_head(&for_of.left);
                let right = self.expr(&for_of.right);
                let body = self.stmt(&for_of.body);
                self.alloc(
                    NodeKind::ForInStatement {
                        left,
                        right,
                        body,
                        of: true,
                    },
                    for_of.span,
                )
            }
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::Expr(expr_stmt) => {
                let expression = self.expr(&expr_stmt.expr);
                self.generic(
                    "ExpressionStatement",
                    vec![("expression", expression)],
                    expr_stmt.span,
                )
            }
        }
    }

    fn block(&mut self, block: &BlockStmt) -> NodeId {
        let body = self.stmts(&block.stmts);
        self.alloc(NodeKind::BlockStatement { body }, block.span)
    }

    fn switch_case(&mut self, case: &SwitchCase) -> NodeId {
        let mut children = Vec::new();
        if let Some(test) = &case.test {
            children.push(("test", self.expr(test)));
        }
        for stmt in &case.cons {
            children.push(("consequent", self.stmt(stmt)));
        }
        self.generic("SwitchCase", children, case.span)
    }

    fn catch_clause(&mut self, catch: &CatchClause) -> NodeId {
        let param = catch.param.as_ref().map(|param| self.pat(param));
        let body = self.block(&catch.body);
        self.alloc(NodeKind::CatchClause { param, body }, catch.span)
    }

    fn for_head(&mut self, head: &ForHead) -> NodeId {
        match head {
            ForHead::VarDecl(var_decl) => self.var_decl(var_decl),
            ForHead::UsingDecl(using) => {
                self.declarators(VariableKind::Const, &using.decls, using.span)
            }
            ForHead::Pat(pat) => self.pat(pat),
        }
    }

    fn decl(&mut self, decl: &Decl) -> NodeId {
        match decl {
            Decl::Var(var_decl) => self.var_decl(var_decl),
            Decl::Using(using) => self.declarators(VariableKind::Const, &using.decls, using.span),
            Decl::Fn(fn_decl) => {
                let id = self.ident(&fn_decl.ident, false);
                let span = fn_decl.function.span;
                let params = self.params(&fn_decl.function);
                let body = self.function_body(fn_decl.function.body.as_ref(), span);
                self.alloc(NodeKind::FunctionDeclaration { id, params, body }, span)
            }
            Decl::Class(class_decl) => {
                let id = self.ident(&class_decl.ident, false);
                let (super_class, body) = self.class(&class_decl.class);
                self.alloc(
                    NodeKind::ClassDeclaration {
                        id,
                        super_class,
                        body,
                    },
                    class_decl.class.span,
                )
            }
            other => self.unsupported("typescript declaration", other.span()),
        }
    }

    fn var_decl(&mut self, var_decl: &VarDecl) -> NodeId {
        let kind = match var_decl.kind {
            VarDeclKind::Var => VariableKind::Var,
            VarDeclKind::Let => VariableKind::Let,
            VarDeclKind::Const => VariableKind::Const,
        };
        self.declarators(kind, &var_decl.decls, var_decl.span)
    }

    fn declarators(&mut self, kind: VariableKind, decls: &[VarDeclarator], span: Span) -> NodeId {
        let declarations = decls
            .iter()
            .map(|declarator| {
                let id = self.pat(&declarator.name);
                let init = declarator.init.as_ref().map(|init| self.expr(init));
                self.alloc(
                    NodeKind::VariableDeclarator { kind, id, init },
                    declarator.span,
                )
            })
            .collect();
        self.alloc(
            NodeKind::VariableDeclaration { kind, declarations },
            span,
        )
    }

    // Functions and classes

    fn params(&mut self, function: &Function) -> Vec<NodeId> {
        function
            .params
            .iter()
            .map(|param| self.pat(&param.pat))
            .collect()
    }

    fn function_body(&mut self, body: Option<&BlockStmt>, span: Span) -> NodeId {
        match body {
            Some(block) => self.block(block),
            None => self.alloc(NodeKind::BlockStatement { body: Vec::new() }, span),
        }
    }

    fn function(&mut self, id: Option<NodeId>, function: &Function) -> NodeId {
        let params = self.params(function);
        let body = self.function_body(function.body.as_ref(), function.span);
        self.alloc(
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                arrow: false,
            },
            function.span,
        )
    }

    fn class(&mut self, class: &Class) -> (Option<NodeId>, Vec<NodeId>) {
        let super_class = class.super_class.as_ref().map(|expr| self.expr(expr));
        let body = class
            .body
            .iter()
            .filter_map(|member| self.class_member(member))
            .collect();
        (super_class, body)
    }

    fn class_member(&mut self, member: &ClassMember) -> Option<NodeId> {
        let (key, computed, value, span) = match member {
            ClassMember::Constructor(ctor) => {
                let (key, computed) = self.prop_name(&ctor.key);
                let mut params = Vec::new();
                for param in &ctor.params {
                    match param {
                        swc_ecma_ast::ParamOrTsParamProp::Param(param) => {
                            params.push(self.pat(&param.pat));
                        }
                        swc_ecma_ast::ParamOrTsParamProp::TsParamProp(prop) => {
                            params.push(self.unsupported("parameter property", prop.span));
                        }
                    }
                }
                let body = self.function_body(ctor.body.as_ref(), ctor.span);
                let value = self.alloc(
                    NodeKind::FunctionExpression {
                        id: None,
                        params,
                        body,
                        arrow: false,
                    },
                    ctor.span,
                );
                (Some(key), computed, Some(value), ctor.span)
            }
            ClassMember::Method(method) => {
                let (key, computed) = self.prop_name(&method.key);
                let value = self.function(None, &method.function);
                (Some(key), computed, Some(value), method.span)
            }
            ClassMember::PrivateMethod(method) => {
                let key = self.leaf("PrivateName", method.key.span());
                let value = self.function(None, &method.function);
                (Some(key), false, Some(value), method.span)
            }
            ClassMember::ClassProp(prop) => {
                let (key, computed) = self.prop_name(&prop.key);
                let value = prop.value.as_ref().map(|value| self.expr(value));
                (Some(key), computed, value, prop.span)
            }
            ClassMember::PrivateProp(prop) => {
                let key = self.leaf("PrivateName", prop.key.span());
                let value = prop.value.as_ref().map(|value| self.expr(value));
                (Some(key), false, value, prop.span)
            }
            ClassMember::AutoAccessor(accessor) => {
                let (key, computed) = match &accessor.key {
                    Key::Private(private) => (self.leaf("PrivateName", private.span()), false),
                    Key::Public(name) => self.prop_name(name),
                };
                let value = accessor.value.as_ref().map(|value| self.expr(value));
                (Some(key), computed, value, accessor.span)
            }
            ClassMember::StaticBlock(block) => {
                let body = self.block(&block.body);
                let value = self.alloc(
                    NodeKind::FunctionExpression {
                        id: None,
                        params: Vec::new(),
                        body,
                        arrow: false,
                    },
                    block.span,
                );
                (None, false, Some(value), block.span)
            }
            _ => return None,
        };

        Some(self.alloc(
            NodeKind::Property {
                key,
                value,
                computed,
            },
            span,
        ))
    }

    /// Lower a property key; the flag reports a computed key.
    fn prop_name(&mut self, name: &PropName) -> (NodeId, bool) {
        match name {
            PropName::Ident(ident) => (self.ident_name(ident), false),
            PropName::Str(string) => {
                let range = self.range(string.span);
                let raw = self.source.get(range.start..range.end).unwrap_or_default();
                let value = raw
                    .get(1..raw.len().saturating_sub(1))
                    .unwrap_or_default()
                    .to_string();
                (
                    self.alloc(NodeKind::StringLiteral { value }, string.span),
                    false,
                )
            }
            PropName::Num(num) => (self.leaf("NumericLiteral", num.span), false),
            PropName::BigInt(big) => (self.leaf("BigIntLiteral", big.span), false),
            PropName::Computed(computed) => (self.expr(&computed.expr), true),
        }
    }

    // Patterns

    fn pat(&mut self, pat: &Pat) -> NodeId {
        match pat {
            Pat::Ident(binding) => self.ident(&binding.id, false),
            Pat::Array(array) => self.array_pat(array),
            Pat::Rest(rest) => {
                let argument = self.pat(&rest.arg);
                self.alloc(NodeKind::RestElement { argument }, rest.span)
            }
            Pat::Object(object) => self.object_pat(object),
            Pat::Assign(assign) => {
                let left = self.pat(&assign.left);
                let right = self.expr(&assign.right);
                self.alloc(NodeKind::AssignmentPattern { left, right }, assign.span)
            }
            Pat::Expr(expr) => self.expr(expr),
            Pat::Invalid(invalid) => self.unsupported("invalid pattern", invalid.span),
        }
    }

    fn array_pat(&mut self, array: &ArrayPat) -> NodeId {
        let elements = array
            .elems
            .iter()
            .flatten()
            .map(|elem| self.pat(elem))
            .collect();
        self.alloc(NodeKind::ArrayPattern { elements }, array.span)
    }

    fn object_pat(&mut self, object: &ObjectPat) -> NodeId {
        let properties = object
            .props
            .iter()
            .map(|prop| self.object_pat_prop(prop))
            .collect();
        self.alloc(NodeKind::ObjectPattern { properties }, object.span)
    }

    fn object_pat_prop(&mut self, prop: &ObjectPatProp) -> NodeId {
        match prop {
            ObjectPatProp::KeyValue(kv) => {
                let span = Span::new(kv.key.span_lo(), kv.value.span_hi());
                let (key, computed) = self.prop_name(&kv.key);
                let value = self.pat(&kv.value);
                self.alloc(
                    NodeKind::Property {
                        key: Some(key),
                        value: Some(value),
                        computed,
                    },
                    span,
                )
            }
            ObjectPatProp::Assign(assign) => {
                let value = self.shorthand(&assign.key.id, assign.value.as_deref(), assign.span);
                self.alloc(
                    NodeKind::Property {
                        key: None,
                        value: Some(value),
                        computed: false,
                    },
                    assign.span,
                )
            }
            ObjectPatProp::Rest(rest) => {
                let argument = self.pat(&rest.arg);
                self.alloc(NodeKind::RestElement { argument }, rest.span)
            }
        }
    }

    /// A shorthand identifier, wrapped in an `AssignmentPattern` when it
    /// carries a default value.
    fn shorthand(&mut self, ident: &Ident, default: Option<&Expr>, span: Span) -> NodeId {
        let left = self.ident(ident, true);
        match default {
            Some(default) => {
                let right = self.expr(default);
                self.alloc(NodeKind::AssignmentPattern { left, right }, span)
            }
            None => left,
        }
    }

    fn assign_target(&mut self, target: &AssignTarget, span: Span) -> NodeId {
        match target {
            AssignTarget::Simple(simple) => match simple {
                SimpleAssignTarget::Ident(binding) => self.ident(&binding.id, false),
                SimpleAssignTarget::Member(member) => self.member(member),
                SimpleAssignTarget::SuperProp(super_prop) => self.super_prop(super_prop),
                SimpleAssignTarget::Paren(paren) => {
                    let expression = self.expr(&paren.expr);
                    self.generic(
                        "ParenthesizedExpression",
                        vec![("expression", expression)],
                        paren.span,
                    )
                }
                SimpleAssignTarget::OptChain(chain) => self.opt_chain(&chain.base, chain.span),
                _ => self.unsupported("assignment target", span),
            },
            AssignTarget::Pat(pat) => match pat {
                AssignTargetPat::Array(array) => self.array_pat(array),
                AssignTargetPat::Object(object) => self.object_pat(object),
                AssignTargetPat::Invalid(invalid) => {
                    self.unsupported("invalid assignment target", invalid.span)
                }
            },
        }
    }

    // Expressions

    fn expr_or_spread(&mut self, arg: &ExprOrSpread) -> NodeId {
        let argument = self.expr(&arg.expr);
        match arg.spread {
            Some(dots) => self.generic(
                "SpreadElement",
                vec![("argument", argument)],
                Span::new(dots.lo, arg.expr.span_hi()),
            ),
            None => argument,
        }
    }

    fn arguments(&mut self, children: &mut Children, args: &[ExprOrSpread]) {
        for arg in args {
            children.push(("arguments", self.expr_or_spread(arg)));
        }
    }

    fn template(&mut self, tpl: &Tpl) -> NodeId {
        let children = tpl
            .exprs
            .iter()
            .map(|expr| ("expressions", self.expr(expr)))
            .collect();
        self.generic("TemplateLiteral", children, tpl.span)
    }

    fn member(&mut self, member: &MemberExpr) -> NodeId {
        let object = self.expr(&member.obj);
        let (property, computed) = match &member.prop {
            MemberProp::Ident(ident) => (self.ident_name(ident), false),
            MemberProp::PrivateName(private) => (self.leaf("PrivateName", private.span()), false),
            MemberProp::Computed(prop) => (self.expr(&prop.expr), true),
        };
        self.alloc(
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            },
            member.span,
        )
    }

    fn super_prop(&mut self, super_prop: &SuperPropExpr) -> NodeId {
        let object = self.leaf("Super", super_prop.obj.span);
        let (property, computed) = match &super_prop.prop {
            SuperProp::Ident(ident) => (self.ident_name(ident), false),
            SuperProp::Computed(prop) => (self.expr(&prop.expr), true),
        };
        self.alloc(
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            },
            super_prop.span,
        )
    }

    fn opt_chain(&mut self, base: &OptChainBase, span: Span) -> NodeId {
        let expression = match base {
            OptChainBase::Member(member) => self.member(member),
            OptChainBase::Call(call) => {
                let mut children = vec![("callee", self.expr(&call.callee))];
                self.arguments(&mut children, &call.args);
                self.generic("CallExpression", children, call.span)
            }
        };
        self.generic("ChainExpression", vec![("expression", expression)], span)
    }

    fn object_prop(&mut self, prop: &PropOrSpread) -> NodeId {
        let prop = match prop {
            PropOrSpread::Spread(spread) => {
                let argument = self.expr(&spread.expr);
                return self.generic(
                    "SpreadElement",
                    vec![("argument", argument)],
                    Span::new(spread.dot3_token.lo, spread.expr.span_hi()),
                );
            }
            PropOrSpread::Prop(prop) => &**prop,
        };

        let (key, computed, value, span) = match prop {
            Prop::Shorthand(ident) => {
                let value = self.ident(ident, true);
                (None, false, value, ident.span)
            }
            Prop::Assign(assign) => {
                let value = self.shorthand(&assign.key, Some(&*assign.value), assign.span);
                (None, false, value, assign.span)
            }
            Prop::KeyValue(kv) => {
                let span = Span::new(kv.key.span_lo(), kv.value.span_hi());
                let (key, computed) = self.prop_name(&kv.key);
                let value = self.expr(&kv.value);
                (Some(key), computed, value, span)
            }
            Prop::Getter(getter) => {
                let (key, computed) = self.prop_name(&getter.key);
                let body = self.function_body(getter.body.as_ref(), getter.span);
                let value = self.alloc(
                    NodeKind::FunctionExpression {
                        id: None,
                        params: Vec::new(),
                        body,
                        arrow: false,
                    },
                    getter.span,
                );
                (Some(key), computed, value, getter.span)
            }
            Prop::Setter(setter) => {
                let (key, computed) = self.prop_name(&setter.key);
                let params = vec![self.pat(&setter.param)];
                let body = self.function_body(setter.body.as_ref(), setter.span);
                let value = self.alloc(
                    NodeKind::FunctionExpression {
                        id: None,
                        params,
                        body,
                        arrow: false,
                    },
                    setter.span,
                );
                (Some(key), computed, value, setter.span)
            }
            Prop::Method(method) => {
                let span = Span::new(method.key.span_lo(), method.function.span.hi);
                let (key, computed) = self.prop_name(&method.key);
                let value = self.function(None, &method.function);
                (Some(key), computed, value, span)
            }
        };

        self.alloc(
            NodeKind::Property {
                key,
                value: Some(value),
                computed,
            },
            span,
        )
    }

    fn expr(&mut self, expr: &Expr) -> NodeId {
        match expr {
            Expr::Ident(ident) => self.ident(ident, false),
            Expr::This(this) => self.leaf("ThisExpression", this.span),
            Expr::Lit(lit) => self.leaf("Literal", lit.span()),
            Expr::Array(array) => {
                let children = array
                    .elems
                    .iter()
                    .flatten()
                    .map(|elem| ("elements", self.expr_or_spread(elem)))
                    .collect();
                self.generic("ArrayExpression", children, array.span)
            }
            Expr::Object(object) => {
                let properties = object
                    .props
                    .iter()
                    .map(|prop| self.object_prop(prop))
                    .collect();
                self.alloc(NodeKind::ObjectExpression { properties }, object.span)
            }
            Expr::Fn(fn_expr) => {
                let id = fn_expr.ident.as_ref().map(|ident| self.ident(ident, false));
                self.function(id, &fn_expr.function)
            }
            Expr::Arrow(arrow) => {
                let params = arrow.params.iter().map(|param| self.pat(param)).collect();
                let body = match &*arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => self.block(block),
                    BlockStmtOrExpr::Expr(expr) => self.expr(expr),
                };
                self.alloc(
                    NodeKind::FunctionExpression {
                        id: None,
                        params,
                        body,
                        arrow: true,
                    },
                    arrow.span,
                )
            }
            Expr::Class(class_expr) => {
                let id = class_expr
                    .ident
                    .as_ref()
                    .map(|ident| self.ident(ident, false));
                let (super_class, body) = self.class(&class_expr.class);
                self.alloc(
                    NodeKind::ClassExpression {
                        id,
                        super_class,
                        body,
                    },
                    class_expr.class.span,
                )
            }
            Expr::Unary(unary) => {
                let argument = self.expr(&unary.arg);
                self.generic("UnaryExpression", vec![("argument", argument)], unary.span)
            }
            Expr::Update(update) => {
                let argument = self.expr(&update.arg);
                self.generic("UpdateExpression", vec![("argument", argument)], update.span)
            }
            Expr::Bin(bin) => {
                let left = self.expr(&bin.left);
                let right = self.expr(&bin.right);
                self.generic(
                    "BinaryExpression",
                    vec![("left", left), ("right", right)],
                    bin.span,
                )
            }
            Expr::Assign(assign) => {
                let left = self.assign_target(&assign.left, assign.span);
                let right = self.expr(&assign.right);
                self.alloc(
                    NodeKind::AssignmentExpression {
                        compound: assign.op != AssignOp::Assign,
                        left,
                        right,
                    },
                    assign.span,
                )
            }
            Expr::Member(member) => self.member(member),
            Expr::SuperProp(super_prop) => self.super_prop(super_prop),
            Expr::Cond(cond) => {
                let test = self.expr(&cond.test);
                let consequent = self.expr(&cond.cons);
                let alternate = self.expr(&cond.alt);
                self.generic(
                    "ConditionalExpression",
                    vec![
                        ("test", test),
                        ("consequent", consequent),
                        ("alternate", alternate),
                    ],
                    cond.span,
                )
            }
            Expr::Call(call) => {
                let callee = match &call.callee {
                    Callee::Expr(callee) => self.expr(callee),
                    Callee::Super(sup) => self.leaf("Super", sup.span),
                    Callee::Import(import) => self.leaf("Import", import.span),
                };
                let mut children = vec![("callee", callee)];
                self.arguments(&mut children, &call.args);
                self.generic("CallExpression", children, call.span)
            }
            Expr::New(new) => {
                let mut children = vec![("callee", self.expr(&new.callee))];
                if let Some(args) = &new.args {
                    self.arguments(&mut children, args);
                }
                self.generic("NewExpression", children, new.span)
            }
            Expr::Seq(seq) => {
                let children = seq
                    .exprs
                    .iter()
                    .map(|expr| ("expressions", self.expr(expr)))
                    .collect();
                self.generic("SequenceExpression", children, seq.span)
            }
            Expr::Tpl(tpl) => self.template(tpl),
            Expr::TaggedTpl(tagged) => {
                let tag = self.expr(&tagged.tag);
                let quasi = self.template(&tagged.tpl);
                self.generic(
                    "TaggedTemplateExpression",
                    vec![("tag", tag), ("quasi", quasi)],
                    tagged.span,
                )
            }
            Expr::Yield(yield_expr) => {
                let mut children = Vec::new();
                if let Some(arg) = &yield_expr.arg {
                    children.push(("argument", self.expr(arg)));
                }
                self.generic("YieldExpression", children, yield_expr.span)
            }
            Expr::Await(await_expr) => {
                let argument = self.expr(&await_expr.arg);
                self.generic(
                    "AwaitExpression",
                    vec![("argument", argument)],
                    await_expr.span,
                )
            }
            Expr::Paren(paren) => {
                let expression = self.expr(&paren.expr);
                self.generic(
                    "ParenthesizedExpression",
                    vec![("expression", expression)],
                    paren.span,
                )
            }
            Expr::MetaProp(meta) => self.leaf("MetaProperty", meta.span),
            Expr::PrivateName(private) => self.leaf("PrivateName", private.span()),
            Expr::OptChain(chain) => self.opt_chain(&chain.base, chain.span),
            Expr::Invalid(invalid) => self.unsupported("invalid expression", invalid.span),
            other => self.unsupported("non-ECMAScript expression", other.span()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::syntax::{NodeKind, SyntaxTree};

    fn lower(code: &str) -> SyntaxTree {
        let (tree, errors) = Parser::new().parse_tree("test.js", code);
        assert!(errors.is_empty(), "{errors:?}");
        tree.unwrap()
    }

    fn labels(tree: &SyntaxTree) -> Vec<&'static str> {
        tree.iter().map(|(_, node)| node.kind.label()).collect()
    }

    #[test]
    fn identifier_ranges_are_byte_offsets() {
        let code = "var abc = 1;";
        let tree = lower(code);
        let id = tree.identifiers_named("abc").next().unwrap();

        assert_eq!(tree[id].range.start, 4);
        assert_eq!(tree[id].range.end, 7);
        assert_eq!(&code[tree[id].range.start..tree[id].range.end], "abc");
        assert_eq!(tree[id].loc.start.column, 4);
        assert_eq!(tree[id].loc.end.column, 7);
    }

    #[test]
    fn program_covers_whole_source() {
        let code = "var a;\n\n";
        let tree = lower(code);
        let root = tree.get(tree.root());

        assert_eq!(root.range.start, 0);
        assert_eq!(root.range.end, code.len());
        assert_eq!(root.kind.label(), "Program");
    }

    #[test]
    fn arrows_methods_and_accessors_become_functions() {
        let tree = lower(
            "var f = (a) => a; var o = { m() {}, get g() { return 1; }, set s(v) {} };\nclass C { constructor(x) {} static { } }",
        );

        let functions = tree
            .iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::FunctionExpression { .. }))
            .count();
        assert_eq!(functions, 6);
        assert!(labels(&tree).contains(&"ArrowFunctionExpression"));
    }

    #[test]
    fn shorthand_properties_are_flagged() {
        let tree = lower("var o = { a }; var { b = 1 } = o;");

        let a = tree.identifiers_named("a").next().unwrap();
        let b = tree.identifiers_named("b").next().unwrap();
        assert!(tree[a].is_shorthand());
        assert!(tree[b].is_shorthand());

        let o = tree.identifiers_named("o").next().unwrap();
        assert!(!tree[o].is_shorthand());
    }

    #[test]
    fn string_keys_keep_their_text() {
        let tree = lower("var o = { 'quoted key': 1 };");

        let value = tree.iter().find_map(|(_, node)| match &node.kind {
            NodeKind::StringLiteral { value } => Some(value.clone()),
            _ => None,
        });
        assert_eq!(value.as_deref(), Some("quoted key"));
    }

    #[test]
    fn member_properties_are_not_computed_unless_bracketed() {
        let tree = lower("a.b; a[c];");

        let computed: Vec<bool> = tree
            .iter()
            .filter_map(|(_, node)| match node.kind {
                NodeKind::MemberExpression { computed, .. } => Some(computed),
                _ => None,
            })
            .collect();
        assert_eq!(computed, vec![false, true]);
    }

    #[test]
    fn compound_assignment_is_flagged() {
        let tree = lower("a = 1; b += 2;");

        let compound: Vec<bool> = tree
            .iter()
            .filter_map(|(_, node)| match node.kind {
                NodeKind::AssignmentExpression { compound, .. } => Some(compound),
                _ => None,
            })
            .collect();
        assert_eq!(compound, vec![false, true]);
    }

    #[test]
    fn identifiers_inside_generic_nodes_survive() {
        let tree = lower("if (a) { while (b) { c(`${d}`, ...e); } } else throw f;");

        for name in ["a", "b", "c", "d", "e", "f"] {
            assert!(
                tree.identifiers_named(name).next().is_some(),
                "missing identifier {name}"
            );
        }
    }

    #[test]
    fn columns_on_later_lines() {
        let tree = lower("var a;\n  a = 2;");

        let second = tree.identifiers_named("a").nth(1).unwrap();
        assert_eq!(tree[second].loc.start.line, 2);
        assert_eq!(tree[second].loc.start.column, 2);
    }
}
