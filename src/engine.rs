//! # Emission Engine
//!
//! The tree-walking orchestrator. A [`Compiler`] owns one [`CompilationContext`] and
//! walks a syntax tree in document order, producing flat style-sheet text.
//!
//! ## Responsibilities
//!
//! - **`values`**: property values, variable resolution, variable declarations, expressions
//!   and intrinsic calls
//! - **`rules`**: rule blocks, selector composition and deferred emission of nested rules
//! - **`mixins`**: mixin definition capture and `@include` expansion
//! - **`control`**: `@for`, `@each` and `@if`
//!
//! ## Output order
//!
//! A nested rule block cannot be written where it appears. It is composed against its
//! ancestor selectors and queued; the queue drains right after the top-level statement
//! that contains it. The custom-property block for top-level scalar variables goes
//! before everything else.
//!
//! ## Failure
//!
//! Compilation is all or nothing. The first error aborts the walk and no text is
//! returned. The next `compile` call starts from a full reset.

mod control;
mod mixins;
mod rules;
mod values;

use crate::ast::{NodeKind, SyntaxNode};
use crate::diagnostics::{to_error_source, ScssError, ScssResult};
use crate::err_msg;
use crate::options::CompilerOptions;
use crate::runtime::context::CompilationContext;
use crate::runtime::variables::SymbolTable;

/// How a variable reference resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolve {
    /// Output position: scalars become `var(--name)`, unknown names pass through.
    Emit,
    /// Constant-fold position: every reference must resolve to its literal value.
    Fold,
}

/// Compiles syntax trees into style-sheet text.
///
/// ```rust
/// use scssc::ast::builder::*;
/// use scssc::Compiler;
///
/// let tree = stylesheet(vec![
///     set("x", lit("5px")),
///     rule(&["a"], vec![decl("width", infix("$x * 2"))]),
/// ]);
/// let css = Compiler::new().compile(&tree).unwrap();
/// assert!(css.starts_with(":root{"));
/// assert!(css.contains("width: 10px;"));
/// ```
#[derive(Debug, Default)]
pub struct Compiler {
    ctx: CompilationContext,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            ctx: CompilationContext::new(options),
        }
    }

    /// Attaches the document text so errors render with labelled snippets.
    pub fn with_source(mut self, name: &str, text: &str) -> Self {
        self.ctx.source = Some(to_error_source(name, text));
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.ctx.options
    }

    /// Variables left in scope by the last compilation.
    pub fn symbols(&self) -> &SymbolTable {
        &self.ctx.symbols
    }

    /// Drops every piece of document state: variables, mixins, open rules and the
    /// deferred queue.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Compiles one document. The compiler is reset first, so a single instance can be
    /// reused for consecutive documents.
    pub fn compile<N: SyntaxNode>(&mut self, root: &N) -> ScssResult<String> {
        self.reset();
        let result = self.render_stylesheet(root);
        if let Err(err) = &result {
            log::debug!("compilation aborted: {err}");
        }
        result.map_err(|err| match &self.ctx.source {
            Some(source) => err.with_source(source),
            None => err,
        })
    }

    fn render_stylesheet<N: SyntaxNode>(&mut self, root: &N) -> ScssResult<String> {
        if !root.is(NodeKind::Stylesheet) {
            return Err(malformed(root, "expected a stylesheet at the root"));
        }
        let mut css = String::new();
        for statement in root.children() {
            css.push_str(&self.render_statement(statement)?);
            for fragment in self.ctx.flush_deferred() {
                css.push_str(fragment.trim());
                css.push_str("\n\n");
            }
        }
        Ok(self.prepend_root_block(css))
    }

    fn prepend_root_block(&self, css: String) -> String {
        let indent = &self.ctx.options.indent;
        let properties: Vec<String> = self
            .ctx
            .symbols
            .root_properties()
            .map(|(name, value)| format!("--{name}: {value};"))
            .collect();
        if properties.is_empty() {
            return css.trim().to_string();
        }
        format!(
            "{}{{\n{indent}{}\n}}\n\n{}",
            self.ctx.options.root_selector,
            properties.join(&format!("\n{indent}")),
            css
        )
        .trim()
        .to_string()
    }

    /// Renders one statement of a stylesheet or block.
    pub(crate) fn render_statement<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        self.ctx.descend().map_err(|e| e.with_span(node.span()))?;
        let result = match node.kind() {
            NodeKind::Ruleset => self.render_ruleset(node),
            NodeKind::PropertyDeclaration => self.render_declaration(node),
            NodeKind::VariableDeclaration => self.declare_variable(node).map(|_| String::new()),
            NodeKind::MixinDeclaration => self.define_mixin(node).map(|_| String::new()),
            NodeKind::IncludeDeclaration => self.render_include(node),
            NodeKind::ForDeclaration => self.render_for(node),
            NodeKind::EachDeclaration => self.render_each(node),
            NodeKind::IfDeclaration => self.render_if(node),
            other => Err(err_msg!(Semantic, "{} is not allowed in statement position", other)),
        };
        self.ctx.ascend();
        result.map_err(|e| e.with_span(node.span()))
    }

    /// Renders every statement of a block, concatenated.
    pub(crate) fn render_block<N: SyntaxNode>(&mut self, block: &N) -> ScssResult<String> {
        if !block.is(NodeKind::Block) {
            return Err(malformed(block, "expected a block"));
        }
        let mut out = String::new();
        for statement in block.children() {
            out.push_str(&self.render_statement(statement)?);
        }
        Ok(out)
    }
}

/// Compiles a document with a fresh [`Compiler`] and default options.
pub fn compile<N: SyntaxNode>(root: &N) -> ScssResult<String> {
    Compiler::new().compile(root)
}

// ============================================================================
// TREE SHAPE HELPERS
// ============================================================================

pub(crate) fn malformed<N: SyntaxNode>(node: &N, detail: &str) -> ScssError {
    err_msg!(Semantic, "malformed {}: {}", node.kind(), detail).with_span(node.span())
}

/// The child at `index`, which must exist.
pub(crate) fn child<N: SyntaxNode>(node: &N, index: usize) -> ScssResult<&N> {
    node.child(index)
        .ok_or_else(|| malformed(node, &format!("missing child at position {index}")))
}

/// The child at `index`, which must be of `kind`.
pub(crate) fn child_of<N: SyntaxNode>(node: &N, index: usize, kind: NodeKind) -> ScssResult<&N> {
    let found = child(node, index)?;
    if found.kind() != kind {
        return Err(malformed(
            node,
            &format!("expected {} at position {index}, found {}", kind, found.kind()),
        ));
    }
    Ok(found)
}

/// The last child, which must be a block.
pub(crate) fn body_of<N: SyntaxNode>(node: &N) -> ScssResult<&N> {
    match node.children().last() {
        Some(block) if block.is(NodeKind::Block) => Ok(block),
        _ => Err(malformed(node, "missing block")),
    }
}
