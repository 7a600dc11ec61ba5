//! `@mixin` capture and `@include` expansion.
//!
//! A mixin body is walked once when it is declared, by a capture walker separate from the
//! emission walk: nothing inside it is resolved, declarations keep their raw value text
//! and nested rules keep their `&` marker. Parameters are substituted into that text when
//! the mixin is included.

use indexmap::IndexMap;

use crate::ast::{NodeKind, SyntaxNode};
use crate::diagnostics::ScssResult;
use crate::err_msg;
use crate::macros::{Expansion, Mixin, MixinBody};
use crate::runtime::context::compose_selector;
use crate::runtime::variables::bare_name;

use super::rules::selector_text;
use super::{body_of, child, child_of, Compiler, Resolve};

impl Compiler {
    pub(crate) fn define_mixin<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<()> {
        let name = child_of(node, 0, NodeKind::Identifier)?.text().trim().to_string();
        let body = self.capture_block(body_of(node)?)?;

        let mixin = match node.find(NodeKind::Parameters) {
            None => Mixin::fixed(Vec::new(), IndexMap::new(), body)?,
            Some(params) => self.build_mixin(&name, params, body)?,
        };
        log::debug!(
            "define mixin `{name}` ({} direct, {} deferred fragment(s){})",
            mixin.body().direct.len(),
            mixin.body().deferred.len(),
            if mixin.is_variadic() { ", variadic" } else { "" }
        );
        self.ctx.mixins.define(name, mixin);
        Ok(())
    }

    fn build_mixin<N: SyntaxNode>(&mut self, name: &str, params: &N, body: MixinBody) -> ScssResult<Mixin> {
        if let Some(rest) = params.find(NodeKind::RestParameter) {
            if params.children().len() != 1 {
                return Err(err_msg!(
                    Semantic,
                    "variadic mixin `{}` must have exactly one parameter",
                    name
                ));
            }
            let param = child_of(rest, 0, NodeKind::Variable)?;
            return Ok(Mixin::variadic(sigil(param.text()), body));
        }

        let mut names = Vec::with_capacity(params.children().len());
        let mut defaults = IndexMap::new();
        for param in params.children() {
            if !param.is(NodeKind::Parameter) {
                return Err(err_msg!(Semantic, "unexpected {} in the parameters of `{}`", param.kind(), name));
            }
            let param_name = sigil(child_of(param, 0, NodeKind::Variable)?.text());
            if let Some(default) = param.child(1) {
                let value = self.render_value(default, Resolve::Fold)?;
                defaults.insert(param_name.clone(), value);
            }
            names.push(param_name);
        }
        Mixin::fixed(names, defaults, body)
    }

    // ------------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------------

    fn capture_block<N: SyntaxNode>(&mut self, block: &N) -> ScssResult<MixinBody> {
        let mut body = MixinBody::default();
        for statement in block.children() {
            match statement.kind() {
                NodeKind::PropertyDeclaration => body.direct.push(raw_declaration(statement)?),
                NodeKind::Ruleset => self.capture_rule(statement, "", &mut body.deferred)?,
                NodeKind::IncludeDeclaration => {
                    let args = raw_arguments(statement);
                    body.extend(self.expand_mixin(statement, &args)?);
                }
                other => {
                    return Err(err_msg!(
                        Semantic,
                        "{} is not allowed inside a mixin body",
                        other
                    )
                    .with_span(statement.span()))
                }
            }
        }
        Ok(body)
    }

    /// Captures a rule inside a mixin body as one or more deferred fragments. Rules nested
    /// further are flattened against `chain`; the outermost selector keeps its `&`.
    fn capture_rule<N: SyntaxNode>(&mut self, node: &N, chain: &str, out: &mut Vec<String>) -> ScssResult<()> {
        let selector = selector_text(child_of(node, 0, NodeKind::SelectorGroup)?);
        let composed = if chain.is_empty() {
            selector
        } else {
            compose_selector(chain, &selector)
        };

        let mut lines = Vec::new();
        let mut nested = Vec::new();
        for statement in child_of(node, 1, NodeKind::Block)?.children() {
            match statement.kind() {
                NodeKind::PropertyDeclaration => lines.push(raw_declaration(statement)?),
                NodeKind::Ruleset => self.capture_rule(statement, &composed, &mut nested)?,
                NodeKind::IncludeDeclaration => {
                    let args = raw_arguments(statement);
                    let expansion = self.expand_mixin(statement, &args)?;
                    lines.extend(expansion.direct);
                    nested.extend(
                        expansion
                            .deferred
                            .iter()
                            .map(|fragment| place_fragment(&composed, fragment)),
                    );
                }
                other => {
                    return Err(err_msg!(
                        Semantic,
                        "{} is not allowed inside a mixin rule",
                        other
                    )
                    .with_span(statement.span()))
                }
            }
        }

        let indent = &self.ctx.options.indent;
        let body: String = lines.iter().map(|line| format!("\n{indent}{line}")).collect();
        out.push(format!("{composed}{{{body}\n}}"));
        out.extend(nested);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Include
    // ------------------------------------------------------------------------

    /// `@include name(args);` Direct fragments are returned for inline placement; the
    /// deferred ones are composed against the open rules and queued.
    pub(crate) fn render_include<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let mut args = Vec::new();
        if let Some(arguments) = node.find(NodeKind::Arguments) {
            for arg in arguments.children() {
                args.push(self.render_value(arg, Resolve::Fold)?);
            }
        }
        let expansion = self.expand_mixin(node, &args)?;

        let chain = self.ctx.ancestor_chain();
        for fragment in &expansion.deferred {
            let placed = place_fragment(&chain, fragment);
            self.ctx.enqueue(format!("{placed}\n\n"));
        }
        Ok(expansion.inline(&self.ctx.options.indent))
    }

    fn expand_mixin<N: SyntaxNode>(&self, node: &N, args: &[String]) -> ScssResult<Expansion> {
        let name = child_of(node, 0, NodeKind::Identifier)?.text().trim();
        let mixin = self
            .ctx
            .mixins
            .get(name)
            .ok_or_else(|| err_msg!(Reference, "mixin `{}` is not declared", name))?;
        log::debug!("include `{name}` with {} argument(s)", args.len());
        mixin.expand(name, args)
    }
}

fn sigil(reference: &str) -> String {
    format!("${}", bare_name(reference))
}

fn raw_declaration<N: SyntaxNode>(node: &N) -> ScssResult<String> {
    let name = child_of(node, 0, NodeKind::Identifier)?.text().trim();
    let value = child(node, 1)?.text().trim();
    Ok(format!("{name}: {value};"))
}

fn raw_arguments<N: SyntaxNode>(node: &N) -> Vec<String> {
    node.find(NodeKind::Arguments)
        .map(|args| args.children().iter().map(|a| a.text().trim().to_string()).collect())
        .unwrap_or_default()
}

/// Composes the selector part of a captured rule fragment (the text before its first
/// `{`) against `chain`.
fn place_fragment(chain: &str, fragment: &str) -> String {
    match fragment.split_once('{') {
        Some((selector, rest)) => format!("{}{{{rest}", compose_selector(chain, selector)),
        None => fragment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::place_fragment;
    use crate::ast::builder::*;
    use crate::diagnostics::ErrorType;
    use crate::engine::compile;

    #[test]
    fn fragment_selector_is_composed() {
        assert_eq!(place_fragment(".btn", "&:hover{\n\tx: 1;\n}"), ".btn:hover{\n\tx: 1;\n}");
        assert_eq!(place_fragment(".btn", "span{\n}"), ".btn span{\n}");
    }

    #[test]
    fn include_places_direct_and_deferred() {
        let tree = stylesheet(vec![
            mixin(
                "hoverable",
                vec![param("c")],
                vec![
                    decl("cursor", lit("pointer")),
                    rule(&["&:hover"], vec![decl("color", var("c"))]),
                ],
            ),
            rule(&[".btn"], vec![include("hoverable", vec![lit("red")])]),
        ]);
        assert_eq!(
            compile(&tree).unwrap(),
            ".btn{\n\tcursor: pointer;\n}\n\n.btn:hover{\n\tcolor: red;\n}"
        );
    }

    #[test]
    fn nested_include_expands_at_definition() {
        let tree = stylesheet(vec![
            mixin("inner", vec![param("v")], vec![decl("width", var("v"))]),
            mixin("outer", vec![param("w")], vec![include("inner", vec![var("w")])]),
            rule(&["a"], vec![include("outer", vec![lit("3px")])]),
        ]);
        assert_eq!(compile(&tree).unwrap(), "a{\n\twidth: 3px;\n}");
    }

    #[test]
    fn include_arguments_fold_variables() {
        let tree = stylesheet(vec![
            set("w", lit("2px")),
            mixin("m", vec![param("v")], vec![decl("width", var("v"))]),
            rule(&["a"], vec![include("m", vec![var("w")])]),
        ]);
        assert!(compile(&tree).unwrap().contains("width: 2px;"));
    }

    #[test]
    fn mixin_errors() {
        let undeclared = stylesheet(vec![rule(&["a"], vec![include("ghost", vec![])])]);
        assert_eq!(compile(&undeclared).unwrap_err().error_type(), ErrorType::Reference);

        let bad_body = stylesheet(vec![mixin("m", vec![], vec![set("x", lit("1"))])]);
        assert_eq!(compile(&bad_body).unwrap_err().error_type(), ErrorType::Semantic);

        let mixed_rest = stylesheet(vec![mixin("m", vec![param("a"), rest_param("b")], vec![])]);
        assert_eq!(compile(&mixed_rest).unwrap_err().error_type(), ErrorType::Semantic);
    }
}
