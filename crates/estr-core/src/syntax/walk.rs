//! Schema-aware child enumeration and caller-driven traversal.
//!
//! The walker never recurses on its own: a visitor receives a node together
//! with its children and decides which of them to walk next, and in what
//! order. The keyed variant also reports the slot each child was found in,
//! which lets callers skip non-binding positions such as property keys.

use super::{NodeId, NodeKind, SyntaxTree};

/// A child node together with the name of the slot holding it.
pub type KeyedChild = (&'static str, NodeId);

pub trait Visitor {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId, children: &[NodeId]);
}

pub trait KeyedVisitor {
    fn visit_keyed(
        &mut self,
        tree: &SyntaxTree,
        key: &'static str,
        node: NodeId,
        children: &[KeyedChild],
    );
}

/// Invoke `visitor` once for `node`.
pub fn walk<V: Visitor + ?Sized>(tree: &SyntaxTree, node: NodeId, visitor: &mut V) {
    let children = children(tree, node);
    visitor.visit(tree, node, &children);
}

/// Invoke `visitor` once for `node`, found under slot `key` of its parent.
pub fn walk_keyed<V: KeyedVisitor + ?Sized>(
    tree: &SyntaxTree,
    key: &'static str,
    node: NodeId,
    visitor: &mut V,
) {
    let children = keyed_children(tree, node);
    visitor.visit_keyed(tree, key, node, &children);
}

pub fn children(tree: &SyntaxTree, node: NodeId) -> Vec<NodeId> {
    keyed_children(tree, node)
        .into_iter()
        .map(|(_, child)| child)
        .collect()
}

/// Structurally nested nodes of `node`, in source order.
pub fn keyed_children(tree: &SyntaxTree, node: NodeId) -> Vec<KeyedChild> {
    let mut out = Vec::new();
    match tree.kind(node) {
        NodeKind::Program { body } | NodeKind::BlockStatement { body } => {
            many(&mut out, "body", body);
        }
        NodeKind::FunctionDeclaration { id, params, body } => {
            out.push(("id", *id));
            many(&mut out, "params", params);
            out.push(("body", *body));
        }
        NodeKind::FunctionExpression {
            id, params, body, ..
        } => {
            opt(&mut out, "id", *id);
            many(&mut out, "params", params);
            out.push(("body", *body));
        }
        NodeKind::ClassDeclaration {
            id,
            super_class,
            body,
        } => {
            out.push(("id", *id));
            opt(&mut out, "superClass", *super_class);
            many(&mut out, "body", body);
        }
        NodeKind::ClassExpression {
            id,
            super_class,
            body,
        } => {
            opt(&mut out, "id", *id);
            opt(&mut out, "superClass", *super_class);
            many(&mut out, "body", body);
        }
        NodeKind::VariableDeclaration { declarations, .. } => {
            many(&mut out, "declarations", declarations);
        }
        NodeKind::VariableDeclarator { id, init, .. } => {
            out.push(("id", *id));
            opt(&mut out, "init", *init);
        }
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        } => {
            opt(&mut out, "init", *init);
            opt(&mut out, "test", *test);
            opt(&mut out, "update", *update);
            out.push(("body", *body));
        }
        NodeKind::ForInStatement {
            left, right, body, ..
        } => {
            out.push(("left", *left));
            out.push(("right", *right));
            out.push(("body", *body));
        }
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        } => {
            out.push(("discriminant", *discriminant));
            many(&mut out, "cases", cases);
        }
        NodeKind::CatchClause { param, body } => {
            opt(&mut out, "param", *param);
            out.push(("body", *body));
        }
        NodeKind::LabeledStatement { label, body } => {
            out.push(("label", *label));
            out.push(("body", *body));
        }
        NodeKind::BreakStatement { label } | NodeKind::ContinueStatement { label } => {
            opt(&mut out, "label", *label);
        }
        NodeKind::AssignmentExpression { left, right, .. }
        | NodeKind::AssignmentPattern { left, right } => {
            out.push(("left", *left));
            out.push(("right", *right));
        }
        NodeKind::MemberExpression {
            object, property, ..
        } => {
            out.push(("object", *object));
            out.push(("property", *property));
        }
        NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
            many(&mut out, "properties", properties);
        }
        NodeKind::Property { key, value, .. } => {
            opt(&mut out, "key", *key);
            opt(&mut out, "value", *value);
        }
        NodeKind::ArrayPattern { elements } => {
            many(&mut out, "elements", elements);
        }
        NodeKind::RestElement { argument } => {
            out.push(("argument", *argument));
        }
        NodeKind::Identifier { .. } | NodeKind::StringLiteral { .. } => {}
        NodeKind::Generic { children, .. } => {
            out.extend(children.iter().copied());
        }
    }
    out
}

fn many(out: &mut Vec<KeyedChild>, key: &'static str, nodes: &[NodeId]) {
    out.extend(nodes.iter().map(|&node| (key, node)));
}

fn opt(out: &mut Vec<KeyedChild>, key: &'static str, node: Option<NodeId>) {
    if let Some(node) = node {
        out.push((key, node));
    }
}

/// Identifiers bound by a binding pattern (parameter, declarator id, catch
/// parameter). Property keys and default values are not binding positions.
pub fn binding_identifiers(tree: &SyntaxTree, pattern: NodeId) -> Vec<NodeId> {
    struct Binders(Vec<NodeId>);

    impl KeyedVisitor for Binders {
        fn visit_keyed(
            &mut self,
            tree: &SyntaxTree,
            _key: &'static str,
            node: NodeId,
            children: &[KeyedChild],
        ) {
            match tree.kind(node) {
                NodeKind::Identifier { .. } => self.0.push(node),
                NodeKind::ObjectPattern { .. }
                | NodeKind::ArrayPattern { .. }
                | NodeKind::RestElement { .. } => {
                    for &(key, child) in children {
                        walk_keyed(tree, key, child, self);
                    }
                }
                NodeKind::Property { .. } => {
                    for &(key, child) in children {
                        if key == "value" {
                            walk_keyed(tree, key, child, self);
                        }
                    }
                }
                NodeKind::AssignmentPattern { left, .. } => {
                    walk_keyed(tree, "left", *left, self);
                }
                _ => {}
            }
        }
    }

    let mut binders = Binders(Vec::new());
    walk_keyed(tree, "pattern", pattern, &mut binders);
    binders.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;

    fn parse(code: &str) -> ParsedFile {
        let parsed = ParsedFile::from_source("test.js", code);
        assert!(parsed.tree().is_some(), "parse failed: {:?}", parsed.errors());
        parsed
    }

    struct Labels(Vec<&'static str>);

    impl Visitor for Labels {
        fn visit(&mut self, tree: &SyntaxTree, node: NodeId, children: &[NodeId]) {
            self.0.push(tree.kind(node).label());
            for &child in children {
                walk(tree, child, self);
            }
        }
    }

    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit(&mut self, tree: &SyntaxTree, node: NodeId, children: &[NodeId]) {
            if let Some(name) = tree.name(node) {
                self.0.push(name.to_string());
            }
            for &child in children {
                walk(tree, child, self);
            }
        }
    }

    #[test]
    fn walk_visits_in_source_order() {
        let parsed = parse("function f(a) { var b = a; }");
        let tree = parsed.tree().unwrap();

        let mut names = Names(Vec::new());
        walk(tree, tree.root(), &mut names);

        assert_eq!(names.0, vec!["f", "a", "b", "a"]);
    }

    #[test]
    fn walk_lets_visitor_stop_descent() {
        struct Shallow(usize);
        impl Visitor for Shallow {
            fn visit(&mut self, _tree: &SyntaxTree, _node: NodeId, _children: &[NodeId]) {
                self.0 += 1;
            }
        }

        let parsed = parse("var a = 1; var b = 2;");
        let tree = parsed.tree().unwrap();
        let mut shallow = Shallow(0);
        walk(tree, tree.root(), &mut shallow);

        assert_eq!(shallow.0, 1);
    }

    #[test]
    fn walk_reaches_nested_kinds() {
        let parsed = parse("try { x(); } catch (e) { label: for (;;) { break label; } }");
        let tree = parsed.tree().unwrap();
        let mut labels = Labels(Vec::new());
        walk(tree, tree.root(), &mut labels);

        assert!(labels.0.contains(&"CatchClause"));
        assert!(labels.0.contains(&"LabeledStatement"));
        assert!(labels.0.contains(&"BreakStatement"));
        assert!(labels.0.contains(&"ForStatement"));
    }

    #[test]
    fn keyed_children_name_member_slots() {
        let parsed = parse("a.b;");
        let tree = parsed.tree().unwrap();
        let member = tree
            .iter()
            .find(|(_, node)| matches!(node.kind, NodeKind::MemberExpression { .. }))
            .map(|(id, _)| id)
            .unwrap();

        let keys: Vec<&str> = keyed_children(tree, member)
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        assert_eq!(keys, vec!["object", "property"]);
    }

    #[test]
    fn binding_identifiers_skip_keys_and_defaults() {
        let parsed = parse("var { a: b, c = d, ...e } = obj, [f, , [g = h], ...i] = arr;");
        let tree = parsed.tree().unwrap();

        let names: Vec<&str> = tree
            .iter()
            .filter_map(|(_, node)| match node.kind {
                NodeKind::VariableDeclarator { id, .. } => Some(id),
                _ => None,
            })
            .flat_map(|id| binding_identifiers(tree, id))
            .filter_map(|id| tree.name(id))
            .collect();

        assert_eq!(names, vec!["b", "c", "e", "f", "g", "i"]);
    }
}
