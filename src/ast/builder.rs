//! Tree builders.
//!
//! Shorthand constructors for every node layout the compiler understands. Front ends
//! that build trees in Rust and the test suites both go through these, so the child
//! layouts documented in [`crate::ast`] live in exactly one place.
//!
//! ```rust
//! use scssc::ast::builder::*;
//! let tree = stylesheet(vec![
//!     set("gap", lit("4px")),
//!     rule(&["a"], vec![decl("margin", infix("$gap * 2"))]),
//! ]);
//! assert_eq!(tree.children.len(), 2);
//! ```

use super::{Node, NodeKind};

const OPERATORS: &[&str] = &[
    "*", "/", "+", "-", "and", "or", "not", "==", "<=", ">=", "<", ">", "(", ")",
];

fn dollar(name: &str) -> String {
    if name.starts_with('$') {
        name.to_string()
    } else {
        format!("${name}")
    }
}

fn block(body: Vec<Node>) -> Node {
    Node::branch(NodeKind::Block, body)
}

pub fn stylesheet(statements: Vec<Node>) -> Node {
    Node::branch(NodeKind::Stylesheet, statements)
}

pub fn ident(name: &str) -> Node {
    Node::leaf(NodeKind::Identifier, name)
}

pub fn lit(text: &str) -> Node {
    Node::leaf(NodeKind::Literal, text)
}

/// A `$name` reference; the leading `$` is optional.
pub fn var(name: &str) -> Node {
    Node::leaf(NodeKind::Variable, dollar(name))
}

pub fn op(token: &str) -> Node {
    Node::leaf(NodeKind::Operator, token)
}

pub fn keyword(word: &str) -> Node {
    Node::leaf(NodeKind::Keyword, word)
}

/// A rule block; `selectors` form the comma separated selector group.
pub fn rule(selectors: &[&str], body: Vec<Node>) -> Node {
    let group = Node::branch(
        NodeKind::SelectorGroup,
        selectors
            .iter()
            .map(|s| Node::leaf(NodeKind::Selector, *s))
            .collect(),
    )
    .with_text(selectors.join(", "));
    Node::branch(NodeKind::Ruleset, vec![group, block(body)])
}

pub fn decl(name: &str, value: Node) -> Node {
    Node::branch(NodeKind::PropertyDeclaration, vec![ident(name), value])
}

/// A property value made of comma separated elements, each a run of space separated values.
pub fn values(elements: Vec<Vec<Node>>) -> Node {
    let elements: Vec<Node> = elements
        .into_iter()
        .map(|vals| Node::branch(NodeKind::ListElement, vals))
        .collect();
    let text = elements
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Node::branch(NodeKind::PropertyValue, elements).with_text(text)
}

pub fn expr(parts: Vec<Node>) -> Node {
    Node::branch(NodeKind::Expression, parts)
}

/// Splits whitespace separated tokens into an expression: operator tokens become
/// `Operator` leaves, `$names` become references, everything else is a literal.
pub fn infix(source: &str) -> Node {
    let parts = source
        .split_whitespace()
        .map(|token| {
            if OPERATORS.contains(&token) {
                op(token)
            } else if token.starts_with('$') {
                var(token)
            } else {
                lit(token)
            }
        })
        .collect();
    expr(parts)
}

pub fn call(name: &str, args: Vec<Node>) -> Node {
    let arguments = Node::branch(NodeKind::Arguments, args);
    let text = format!(
        "{name}({})",
        arguments
            .children
            .iter()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Node::branch(NodeKind::FunctionCall, vec![ident(name), arguments]).with_text(text)
}

/// `$name: value;`
pub fn set(name: &str, value: Node) -> Node {
    Node::branch(NodeKind::VariableDeclaration, vec![var(name), value])
}

pub fn list(items: Vec<Node>) -> Node {
    Node::branch(NodeKind::ListDeclaration, items)
}

pub fn map(entries: Vec<(&str, Node)>) -> Node {
    Node::branch(
        NodeKind::MapDeclaration,
        entries
            .into_iter()
            .map(|(key, value)| Node::branch(NodeKind::MapEntry, vec![lit(key), value]))
            .collect(),
    )
}

pub fn param(name: &str) -> Node {
    Node::branch(NodeKind::Parameter, vec![var(name)])
}

pub fn param_default(name: &str, default: Node) -> Node {
    Node::branch(NodeKind::Parameter, vec![var(name), default])
}

pub fn rest_param(name: &str) -> Node {
    Node::branch(NodeKind::RestParameter, vec![var(name)])
}

pub fn mixin(name: &str, params: Vec<Node>, body: Vec<Node>) -> Node {
    let mut children = vec![ident(name)];
    if !params.is_empty() {
        children.push(Node::branch(NodeKind::Parameters, params));
    }
    children.push(block(body));
    Node::branch(NodeKind::MixinDeclaration, children)
}

pub fn include(name: &str, args: Vec<Node>) -> Node {
    let mut children = vec![ident(name)];
    if !args.is_empty() {
        children.push(Node::branch(NodeKind::Arguments, args));
    }
    Node::branch(NodeKind::IncludeDeclaration, children)
}

/// `@for $name from <from> through|to <bound> { body }`
pub fn for_loop(name: &str, from: Node, bound_keyword: &str, bound: Node, body: Vec<Node>) -> Node {
    Node::branch(
        NodeKind::ForDeclaration,
        vec![var(name), from, keyword(bound_keyword), bound, block(body)],
    )
}

/// `@each $a[, $b] in <source> { body }`
pub fn each(names: &[&str], source: Node, body: Vec<Node>) -> Node {
    let mut children: Vec<Node> = names.iter().map(|n| var(n)).collect();
    children.push(source);
    children.push(block(body));
    Node::branch(NodeKind::EachDeclaration, children)
}

/// An `@if` with optional `@else if` branches and `@else`.
pub fn if_chain(
    guard: Node,
    then: Vec<Node>,
    else_ifs: Vec<(Node, Vec<Node>)>,
    otherwise: Option<Vec<Node>>,
) -> Node {
    let mut children = vec![guard, block(then)];
    for (guard, body) in else_ifs {
        children.push(Node::branch(NodeKind::ElseIf, vec![guard, block(body)]));
    }
    if let Some(body) = otherwise {
        children.push(Node::branch(NodeKind::Else, vec![block(body)]));
    }
    Node::branch(NodeKind::IfDeclaration, children)
}
