//! AST module for the stylesheet compiler
//!
//! The compiler core never tokenizes or parses source text. It consumes a tree produced
//! by an external front end, and needs exactly three capabilities from every node:
//! child enumeration, the raw source text the node covers, and a kind discriminator.
//! Those capabilities are the [`SyntaxNode`] trait. [`Node`] is an owned implementation
//! that (de)serializes with serde, so a front end written in any language can hand the
//! tree over as JSON.
//!
//! ## Child layouts
//!
//! | kind | children |
//! |---|---|
//! | `Stylesheet`, `Block` | statements |
//! | `Ruleset` | `SelectorGroup`, `Block` |
//! | `SelectorGroup` | `Selector`* |
//! | `PropertyDeclaration` | `Identifier`, value |
//! | `PropertyValue` | `ListElement`* (comma separated), each holding space separated values |
//! | `VariableDeclaration` | `Variable`, value / `ListDeclaration` / `MapDeclaration` |
//! | `MapDeclaration` | `MapEntry`* (key, value) |
//! | `MixinDeclaration` | `Identifier`, `Parameters`?, `Block` |
//! | `Parameters` | `Parameter` (`Variable`, default?)* or a single `RestParameter` (`Variable`) |
//! | `IncludeDeclaration`, `FunctionCall` | `Identifier`, `Arguments`? |
//! | `ForDeclaration` | `Variable`, from, `Keyword`, bound, `Block` |
//! | `EachDeclaration` | `Variable`, `Variable`?, source, `Block` |
//! | `IfDeclaration` | guard, `Block`, `ElseIf`*, `Else`? |
//! | `Expression` | operands interleaved with `Operator` leaves |

pub mod builder;

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a byte span in the source document.
///
/// ```rust
/// use scssc::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind discriminator for syntax tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Stylesheet,
    Ruleset,
    SelectorGroup,
    Selector,
    Block,
    PropertyDeclaration,
    PropertyValue,
    ListElement,
    Identifier,
    Literal,
    /// A `$name` reference
    Variable,
    Expression,
    Operator,
    FunctionCall,
    Arguments,
    VariableDeclaration,
    ListDeclaration,
    MapDeclaration,
    MapEntry,
    MixinDeclaration,
    Parameters,
    Parameter,
    /// A `$name...` spread parameter
    RestParameter,
    IncludeDeclaration,
    ForDeclaration,
    /// `through` or `to` in a bounded-count loop
    Keyword,
    EachDeclaration,
    IfDeclaration,
    ElseIf,
    Else,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Stylesheet => "stylesheet",
            NodeKind::Ruleset => "ruleset",
            NodeKind::SelectorGroup => "selector group",
            NodeKind::Selector => "selector",
            NodeKind::Block => "block",
            NodeKind::PropertyDeclaration => "property declaration",
            NodeKind::PropertyValue => "property value",
            NodeKind::ListElement => "list element",
            NodeKind::Identifier => "identifier",
            NodeKind::Literal => "literal",
            NodeKind::Variable => "variable",
            NodeKind::Expression => "expression",
            NodeKind::Operator => "operator",
            NodeKind::FunctionCall => "function call",
            NodeKind::Arguments => "arguments",
            NodeKind::VariableDeclaration => "variable declaration",
            NodeKind::ListDeclaration => "list declaration",
            NodeKind::MapDeclaration => "map declaration",
            NodeKind::MapEntry => "map entry",
            NodeKind::MixinDeclaration => "@mixin",
            NodeKind::Parameters => "parameters",
            NodeKind::Parameter => "parameter",
            NodeKind::RestParameter => "rest parameter",
            NodeKind::IncludeDeclaration => "@include",
            NodeKind::ForDeclaration => "@for",
            NodeKind::Keyword => "keyword",
            NodeKind::EachDeclaration => "@each",
            NodeKind::IfDeclaration => "@if",
            NodeKind::ElseIf => "@else if",
            NodeKind::Else => "@else",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// THE NODE CAPABILITY
// ============================================================================

/// What the compiler needs from a front end's tree nodes.
pub trait SyntaxNode: Sized {
    fn kind(&self) -> NodeKind;

    /// Raw source text covered by this node.
    fn text(&self) -> &str;

    fn children(&self) -> &[Self];

    /// Location in the source document; front ends without locations keep the default.
    fn span(&self) -> Span {
        Span::default()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children().get(index)
    }

    /// First direct child of the given kind.
    fn find(&self, kind: NodeKind) -> Option<&Self> {
        self.children().iter().find(|c| c.kind() == kind)
    }

    /// All direct children of the given kind, in order.
    fn filter(&self, kind: NodeKind) -> Vec<&Self> {
        self.children().iter().filter(|c| c.kind() == kind).collect()
    }

    fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }
}

/// Owned syntax tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub span: Span,
}

impl Node {
    /// A node with text and no children.
    pub fn leaf(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    /// A node whose raw text is its children's text joined by single spaces.
    pub fn branch(kind: NodeKind, children: Vec<Node>) -> Self {
        let text = children
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            kind,
            text,
            children,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Parses a tree serialized as JSON by a front end.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl SyntaxNode for Node {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_text_joins_children() {
        let node = Node::branch(
            NodeKind::Expression,
            vec![
                Node::leaf(NodeKind::Literal, "1"),
                Node::leaf(NodeKind::Operator, "+"),
                Node::leaf(NodeKind::Variable, "$x"),
            ],
        );
        assert_eq!(node.text(), "1 + $x");
        assert_eq!(node.filter(NodeKind::Operator).len(), 1);
        assert!(node.find(NodeKind::Variable).is_some());
    }

    #[test]
    fn json_tree_defaults_missing_fields() {
        let json = r#"{"kind":"Stylesheet","children":[{"kind":"Literal","text":"x"}]}"#;
        let node = Node::from_json(json).unwrap();
        assert_eq!(node.kind(), NodeKind::Stylesheet);
        assert_eq!(node.text(), "");
        assert_eq!(node.children()[0].text(), "x");
        assert!(node.span().is_empty());
    }
}
