//! The per-document compilation context.
//!
//! Every piece of mutable state the emission engine needs lives here and is threaded
//! through the tree walk explicitly. One context serves one document at a time; `reset`
//! returns it to the state of a fresh instance.

use crate::diagnostics::{ScssResult, SourceArc};
use crate::err_msg;
use crate::macros::MixinTable;
use crate::options::CompilerOptions;
use crate::runtime::variables::SymbolTable;

#[derive(Debug, Default)]
pub struct CompilationContext {
    pub options: CompilerOptions,
    /// Document text for diagnostics, when the caller supplied it.
    pub source: Option<SourceArc>,
    pub symbols: SymbolTable,
    pub mixins: MixinTable,
    /// Selector text of every open rule block, outermost first.
    pub ancestors: Vec<String>,
    /// Composed rule text waiting for the ancestor stack to empty.
    pub deferred: Vec<String>,
    /// Number of loops currently being unrolled.
    pub loop_depth: usize,
    /// Ancestor depth at which each loop body being unrolled started.
    pub unrolling: Vec<usize>,
    /// Names bound by the `@each` loops currently being unrolled.
    pub each_bindings: Vec<String>,
    depth: usize,
}

impl CompilationContext {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Drops all document state; options and the attached source are kept.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.mixins.clear();
        self.ancestors.clear();
        self.deferred.clear();
        self.loop_depth = 0;
        self.unrolling.clear();
        self.each_bindings.clear();
        self.depth = 0;
    }

    pub fn is_nested(&self) -> bool {
        !self.ancestors.is_empty()
    }

    /// Variables declared now are temporary: inside a rule body or a loop.
    pub fn in_temporary_scope(&self) -> bool {
        self.is_nested() || self.loop_depth > 0
    }

    /// True when a rule closing at the current depth sits directly in a loop body.
    pub fn is_unrolling_child(&self) -> bool {
        self.unrolling.last() == Some(&self.ancestors.len())
    }

    /// The open ancestors composed outermost first, each resolving its own `&`.
    pub fn ancestor_chain(&self) -> String {
        self.ancestors
            .iter()
            .fold(String::new(), |chain, selector| compose_selector(&chain, selector))
    }

    pub fn enqueue(&mut self, fragment: String) {
        log::debug!("deferring {} byte fragment", fragment.len());
        self.deferred.push(fragment);
    }

    /// Drains the deferred queue in enqueue order, but only once no rule is open.
    pub fn flush_deferred(&mut self) -> Vec<String> {
        if self.is_nested() || self.deferred.is_empty() {
            return Vec::new();
        }
        log::debug!("flushing {} deferred fragment(s)", self.deferred.len());
        std::mem::take(&mut self.deferred)
    }

    pub fn descend(&mut self) -> ScssResult<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(err_msg!(
                Semantic,
                "document nests deeper than {} levels",
                self.options.max_depth
            ));
        }
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Places `selector` under `chain`: `&` is replaced by the chain, otherwise the chain
/// becomes a descendant prefix.
///
/// ```rust
/// use scssc::runtime::context::compose_selector;
/// assert_eq!(compose_selector(".a .b", "&:hover"), ".a .b:hover");
/// assert_eq!(compose_selector(".a", ".c"), ".a .c");
/// assert_eq!(compose_selector("", ".c"), ".c");
/// ```
pub fn compose_selector(chain: &str, selector: &str) -> String {
    let selector = selector.trim();
    if selector.contains('&') {
        selector.replace('&', chain)
    } else if chain.is_empty() {
        selector.to_string()
    } else {
        format!("{chain} {selector}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_resolves_marker_at_every_depth() {
        let mut ctx = CompilationContext::default();
        ctx.ancestors = vec![".nav".into(), "&-item".into(), "a".into()];
        assert_eq!(ctx.ancestor_chain(), ".nav-item a");
    }

    #[test]
    fn flush_waits_for_empty_stack() {
        let mut ctx = CompilationContext::default();
        ctx.ancestors.push(".a".into());
        ctx.enqueue(".a .b{}".into());
        assert!(ctx.flush_deferred().is_empty());
        ctx.ancestors.pop();
        assert_eq!(ctx.flush_deferred(), vec![".a .b{}".to_string()]);
        assert!(ctx.deferred.is_empty());
    }

    #[test]
    fn depth_limit() {
        let mut ctx = CompilationContext::new(CompilerOptions {
            max_depth: 2,
            ..CompilerOptions::default()
        });
        assert!(ctx.descend().is_ok());
        assert!(ctx.descend().is_ok());
        assert!(ctx.descend().is_err());
    }

    #[test]
    fn reset_clears_document_state() {
        let mut ctx = CompilationContext::default();
        ctx.ancestors.push("a".into());
        ctx.deferred.push("b{}".into());
        ctx.loop_depth = 2;
        ctx.reset();
        assert!(!ctx.in_temporary_scope());
        assert!(ctx.deferred.is_empty());
    }
}
