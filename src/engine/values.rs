//! Values, references, declarations and intrinsic calls.
//!
//! Every value position goes through [`Compiler::render_value`] with a [`Resolve`] mode.
//! Output positions render scalar references as custom-property references; expression
//! operands, intrinsic arguments and mixin arguments fold them to their literal text.

use crate::ast::{NodeKind, SyntaxNode};
use crate::builtins::{self, Builtin};
use crate::diagnostics::ScssResult;
use crate::err_msg;
use crate::runtime::eval::{evaluate_tokens, Token};
use crate::runtime::variables::{bare_name, custom_property_reference, Variable, VariableValue};

use super::{child, child_of, Compiler, Resolve};

impl Compiler {
    /// Renders any value-position node to text.
    pub(crate) fn render_value<N: SyntaxNode>(&mut self, node: &N, mode: Resolve) -> ScssResult<String> {
        match node.kind() {
            NodeKind::Literal
            | NodeKind::Identifier
            | NodeKind::Keyword
            | NodeKind::Operator
            | NodeKind::Selector => Ok(node.text().trim().to_string()),
            NodeKind::Variable => self.resolve_variable(node.text(), mode),
            NodeKind::Expression => self.evaluate_expression(node),
            NodeKind::FunctionCall => self.call_function(node),
            NodeKind::PropertyValue if node.children().is_empty() => {
                Ok(node.text().trim().to_string())
            }
            NodeKind::PropertyValue | NodeKind::ListDeclaration => {
                Ok(self.render_all(node.children(), mode)?.join(", "))
            }
            NodeKind::ListElement => Ok(self.render_all(node.children(), mode)?.join(" ")),
            NodeKind::MapDeclaration => {
                let mut pairs = Vec::new();
                for (key, value) in self.map_entries(node, mode)? {
                    pairs.push(format!("{key}: {value}"));
                }
                Ok(pairs.join(", "))
            }
            other => Err(err_msg!(Semantic, "{} cannot be used as a value", other)),
        }
    }

    fn render_all<N: SyntaxNode>(&mut self, nodes: &[N], mode: Resolve) -> ScssResult<Vec<String>> {
        nodes.iter().map(|n| self.render_value(n, mode)).collect()
    }

    /// Resolves a `$name` reference.
    pub(crate) fn resolve_variable(&self, reference: &str, mode: Resolve) -> ScssResult<String> {
        let name = bare_name(reference);
        if mode == Resolve::Emit && self.ctx.each_bindings.iter().any(|b| b == name) {
            // Left for the iteration's substitution pass.
            return Ok(format!("${name}"));
        }
        match (self.ctx.symbols.get(name), mode) {
            (Some(variable), Resolve::Fold) => Ok(variable.value()),
            (Some(variable), Resolve::Emit) => Ok(match &variable.value {
                VariableValue::Scalar(_) => custom_property_reference(name),
                _ => variable.value(),
            }),
            (None, Resolve::Emit) => Ok(reference.trim().to_string()),
            (None, Resolve::Fold) => Err(err_msg!(Reference, "undeclared variable ${}", name)),
        }
    }

    /// Folds an `Expression` node: operands in constant-fold context, operators as written.
    pub(crate) fn evaluate_expression<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        self.ctx.descend()?;
        let result = self.expression_tokens(node).and_then(|tokens| evaluate_tokens(&tokens));
        self.ctx.ascend();
        result.map_err(|e| e.with_span(node.span()))
    }

    fn expression_tokens<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(node.children().len());
        for part in node.children() {
            if part.is(NodeKind::Operator) {
                tokens.push(Token::operator(part.text().trim()));
            } else {
                tokens.push(Token::operand(self.render_value(part, Resolve::Fold)?));
            }
        }
        if tokens.is_empty() {
            return Err(err_msg!(Semantic, "empty expression"));
        }
        Ok(tokens)
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// `$name: value;` Lists and maps are snapshots of their resolved elements; `$a: $b`
    /// copies `$b` whole, so a list stays a list.
    pub(crate) fn declare_variable<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<()> {
        let name = bare_name(child_of(node, 0, NodeKind::Variable)?.text()).to_string();
        let value = child(node, 1)?;
        let temporary = self.ctx.in_temporary_scope();

        let variable = match value.kind() {
            NodeKind::ListDeclaration => {
                let mut items = Vec::with_capacity(value.children().len());
                for item in value.children() {
                    items.push(self.snapshot(item)?);
                }
                Variable::list(items, temporary)
            }
            NodeKind::MapDeclaration => Variable::map(self.map_entries(value, Resolve::Emit)?, temporary),
            // A bare reference copies the referenced variable along with its kind.
            NodeKind::Variable => match self.ctx.symbols.get(value.text()) {
                Some(source) => Variable { value: source.value.clone(), temporary },
                None => Variable::scalar(value.text().trim(), temporary),
            },
            _ => Variable::scalar(self.snapshot(value)?, temporary),
        };
        log::debug!(
            "declare ${name} ({}{}) = {}",
            variable.kind(),
            if temporary { ", temporary" } else { "" },
            variable.value()
        );
        self.ctx.symbols.declare(name, variable);
        Ok(())
    }

    /// The declaration-time value of a node. A bare reference copies the referenced
    /// variable's literal value, or keeps its own text when the name is unknown.
    fn snapshot<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        if node.is(NodeKind::Variable) {
            return Ok(match self.ctx.symbols.get(node.text()) {
                Some(variable) => variable.value(),
                None => node.text().trim().to_string(),
            });
        }
        self.render_value(node, Resolve::Emit)
    }

    fn map_entries<N: SyntaxNode>(&mut self, node: &N, mode: Resolve) -> ScssResult<Vec<(String, String)>> {
        let mut entries = Vec::with_capacity(node.children().len());
        for entry in node.children() {
            if !entry.is(NodeKind::MapEntry) {
                return Err(err_msg!(Semantic, "map entries must be MapEntry nodes, found {}", entry.kind()));
            }
            let key = child(entry, 0)?.text().trim().to_string();
            let value = child(entry, 1)?;
            let value = match mode {
                Resolve::Emit => self.snapshot(value)?,
                Resolve::Fold => self.render_value(value, Resolve::Fold)?,
            };
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// `name: value;` inside a rule block.
    pub(crate) fn render_declaration<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let name = child_of(node, 0, NodeKind::Identifier)?.text().trim().to_string();
        let value = self.render_value(child(node, 1)?, Resolve::Emit)?;
        Ok(format!("\n{}{name}: {value};", self.ctx.options.indent))
    }

    // ------------------------------------------------------------------------
    // Function calls
    // ------------------------------------------------------------------------

    pub(crate) fn call_function<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let name = child_of(node, 0, NodeKind::Identifier)?.text().trim().to_string();
        let args: &[N] = match node.find(NodeKind::Arguments) {
            Some(arguments) => arguments.children(),
            None => &[],
        };

        let Some(builtin) = Builtin::lookup(&name) else {
            let rendered = self.render_all(args, Resolve::Emit)?;
            return Ok(builtins::pass_through(&name, &rendered));
        };
        if args.len() < builtin.arity() {
            return Err(err_msg!(
                Argument,
                "`{}` expects {} argument(s) but was called with {}",
                builtin.name(),
                builtin.arity(),
                args.len()
            ));
        }

        match builtin {
            Builtin::Length => {
                let (list, variable) = self.list_argument(builtin, &args[0])?;
                builtins::length(list, variable)
            }
            Builtin::Nth => {
                let index = self.render_value(&args[1], Resolve::Fold)?;
                let (list, variable) = self.list_argument(builtin, &args[0])?;
                builtins::nth(list, variable, &index)
            }
            Builtin::Darken | Builtin::Lighten => {
                let color = self.render_value(&args[0], Resolve::Fold)?;
                let amount = self.render_value(&args[1], Resolve::Fold)?;
                Ok(if builtin == Builtin::Darken {
                    builtins::darken(&color, &amount)
                } else {
                    builtins::lighten(&color, &amount)
                })
            }
            Builtin::LinearGradient => {
                let rendered = self.render_all(args, Resolve::Fold)?;
                Ok(builtins::linear_gradient(&rendered))
            }
        }
    }

    /// The declared variable a list intrinsic reads from.
    fn list_argument<'a, N: SyntaxNode>(
        &'a self,
        builtin: Builtin,
        arg: &'a N,
    ) -> ScssResult<(&'a str, &'a Variable)> {
        if !arg.is(NodeKind::Variable) {
            return Err(err_msg!(
                Semantic,
                "`{}` expects a list variable, found `{}`",
                builtin.name(),
                arg.text().trim()
            ));
        }
        let name = bare_name(arg.text());
        let variable = self
            .ctx
            .symbols
            .get(name)
            .ok_or_else(|| err_msg!(Reference, "undeclared variable ${}", name))?;
        Ok((name, variable))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::builder::*;
    use crate::diagnostics::ErrorType;
    use crate::engine::{Compiler, Resolve};

    fn compiled(statements: Vec<crate::ast::Node>) -> Compiler {
        let mut compiler = Compiler::new();
        compiler.compile(&stylesheet(statements)).unwrap();
        compiler
    }

    #[test]
    fn reference_modes() {
        let compiler = compiled(vec![
            set("gap", lit("4px")),
            set("sizes", list(vec![lit("1px"), lit("2px")])),
        ]);
        assert_eq!(compiler.resolve_variable("$gap", Resolve::Emit).unwrap(), "var(--gap)");
        assert_eq!(compiler.resolve_variable("$gap", Resolve::Fold).unwrap(), "4px");
        assert_eq!(compiler.resolve_variable("$sizes", Resolve::Emit).unwrap(), "1px, 2px");
        assert_eq!(compiler.resolve_variable("$nope", Resolve::Emit).unwrap(), "$nope");
        let err = compiler.resolve_variable("$nope", Resolve::Fold).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Reference);
    }

    #[test]
    fn declarations_snapshot_references() {
        let compiler = compiled(vec![
            set("a", lit("1px")),
            set("b", var("a")),
            set("l", list(vec![var("a"), lit("2px"), var("missing")])),
            set("m", map(vec![("k", var("a"))])),
            set("a", lit("9px")),
        ]);
        let symbols = compiler.symbols();
        assert_eq!(symbols.get("b").unwrap().value(), "1px");
        assert_eq!(symbols.get("l").unwrap().value(), "1px, 2px, $missing");
        assert_eq!(symbols.get("m").unwrap().value(), "k: 1px");
        assert_eq!(symbols.get("a").unwrap().value(), "9px");
    }

    #[test]
    fn aliasing_a_list_keeps_it_a_list() {
        let mut compiler = Compiler::new();
        let tree = stylesheet(vec![
            set("sizes", list(vec![lit("1px"), lit("2px"), lit("3px")])),
            set("copy", var("sizes")),
            rule(&["a"], vec![decl("n", call("length", vec![var("copy")]))]),
        ]);
        let css = compiler.compile(&tree).unwrap();
        assert_eq!(compiler.symbols().get("copy").unwrap().as_list().unwrap().len(), 3);
        assert!(css.contains("n: 3;"));
        assert!(!css.contains("--copy"));
    }

    #[test]
    fn declarations_inside_rules_are_temporary() {
        let compiler = compiled(vec![rule(&["a"], vec![set("t", lit("1"))])]);
        assert!(compiler.symbols().get("t").unwrap().is_temporary());
    }

    #[test]
    fn builtin_argument_count() {
        let mut compiler = Compiler::new();
        let tree = stylesheet(vec![rule(&["a"], vec![decl("x", call("nth", vec![var("l")]))])]);
        let err = compiler.compile(&tree).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Argument);
    }

    #[test]
    fn list_builtins_need_a_variable() {
        let mut compiler = Compiler::new();
        let tree = stylesheet(vec![rule(&["a"], vec![decl("x", call("length", vec![lit("a")]))])]);
        let err = compiler.compile(&tree).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Semantic);

        let tree = stylesheet(vec![rule(&["a"], vec![decl("x", call("length", vec![var("gone")]))])]);
        let err = compiler.compile(&tree).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Reference);
    }
}
