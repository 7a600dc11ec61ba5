//! Rule blocks and nested-rule flattening.

use crate::ast::{NodeKind, SyntaxNode};
use crate::diagnostics::ScssResult;
use crate::runtime::context::compose_selector;

use super::{child_of, Compiler};

impl Compiler {
    /// Renders a rule block.
    ///
    /// A rule that closes while another is still open is composed against the open chain
    /// and queued instead of returned, unless it sits directly in a loop body being
    /// unrolled, where the loop needs its text in place.
    pub(crate) fn render_ruleset<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let selector = selector_text(child_of(node, 0, NodeKind::SelectorGroup)?);
        let block = child_of(node, 1, NodeKind::Block)?;

        self.ctx.ancestors.push(selector.clone());
        let body = self.render_block(block);
        self.ctx.ancestors.pop();
        let body = body?;

        let composed = compose_selector(&self.ctx.ancestor_chain(), &selector);
        let text = format!("{composed}{{{body}\n}}\n\n");

        if !self.ctx.is_nested() || self.ctx.is_unrolling_child() {
            return Ok(text);
        }
        self.ctx.enqueue(text);
        Ok(String::new())
    }
}

/// Selector text of a group: its selectors joined by `", "`, or the group's own text when
/// the front end did not split it.
pub(crate) fn selector_text<N: SyntaxNode>(group: &N) -> String {
    let selectors: Vec<&str> = group
        .children()
        .iter()
        .map(|s| s.text().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if selectors.is_empty() {
        group.text().trim().to_string()
    } else {
        selectors.join(", ")
    }
}
