//! Loop unrolling and conditionals.
//!
//! A loop renders its body once per iteration with the loop variables bound, rewrites
//! the placeholders in the rendered text, and queues all iterations as one fragment. The
//! loop statement itself renders to nothing in place.

use crate::ast::{NodeKind, SyntaxNode};
use crate::diagnostics::ScssResult;
use crate::err_msg;
use crate::macros::utils;
use crate::runtime::variables::{bare_name, Variable};

use super::{body_of, child, child_of, malformed, Compiler, Resolve};

/// How a loop variable's value is placed into each rendered iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// `#{$name}` placeholders only; bare references render as custom properties.
    Interpolated,
    /// Placeholders first, then bare `$name` tokens.
    Substituted,
}

impl Placement {
    fn apply(self, text: &str, name: &str, value: &str) -> String {
        match self {
            Placement::Interpolated => utils::interpolate(text, name, value),
            Placement::Substituted => utils::substitute(text, name, value),
        }
    }
}

impl Compiler {
    // ------------------------------------------------------------------------
    // @for
    // ------------------------------------------------------------------------

    pub(crate) fn render_for<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let name = sigil_name(child_of(node, 0, NodeKind::Variable)?);
        let from = self.integer_bound(child(node, 1)?)?;
        let keyword = child_of(node, 2, NodeKind::Keyword)?.text().trim();
        let bound = self.integer_bound(child(node, 3)?)?;
        let body = child_of(node, 4, NodeKind::Block)?;

        let end = match keyword {
            "through" => bound,
            "to" => bound
                .checked_sub(1)
                .ok_or_else(|| err_msg!(Semantic, "`@for` bound `{}` is out of range for `to`", bound))?,
            other => {
                return Err(err_msg!(
                    Semantic,
                    "unknown `@for` bound keyword `{}`, expected `through` or `to`",
                    other
                ))
            }
        };
        log::debug!("unrolling @for {name} from {from} {keyword} {bound}");

        let rows = (from..=end).map(|i| vec![i.to_string()]);
        self.unroll_loop(body, &[name], rows, Placement::Interpolated)?;
        Ok(String::new())
    }

    fn integer_bound<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<i64> {
        let text = self.render_value(node, Resolve::Fold)?;
        text.trim()
            .parse()
            .map_err(|_| err_msg!(Semantic, "`@for` bound `{}` is not an integer", text.trim()))
    }

    // ------------------------------------------------------------------------
    // @each
    // ------------------------------------------------------------------------

    pub(crate) fn render_each<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let body = body_of(node)?;
        match node.children().len() {
            4 => {
                let key = sigil_name(child_of(node, 0, NodeKind::Variable)?);
                let value = sigil_name(child_of(node, 1, NodeKind::Variable)?);
                let rows = self.map_rows(child(node, 2)?)?;
                log::debug!("unrolling @each {key}, {value} over {} entries", rows.len());
                self.unroll_loop(body, &[key, value], rows.into_iter(), Placement::Substituted)?;
            }
            3 => {
                let name = sigil_name(child_of(node, 0, NodeKind::Variable)?);
                let items = self.list_items(child(node, 1)?)?;
                log::debug!("unrolling @each {name} over {} items", items.len());
                let rows = items.into_iter().map(|item| vec![item]);
                self.unroll_loop(body, &[name], rows, Placement::Substituted)?;
            }
            _ => return Err(malformed(node, "expected one or two loop variables")),
        }
        Ok(String::new())
    }

    /// Key/value rows of the map a destructuring loop walks.
    fn map_rows<N: SyntaxNode>(&self, source: &N) -> ScssResult<Vec<Vec<String>>> {
        if !source.is(NodeKind::Variable) {
            return Err(err_msg!(
                Semantic,
                "destructuring `@each` needs a map variable, found `{}`",
                source.text().trim()
            ));
        }
        let name = bare_name(source.text());
        let variable = self
            .ctx
            .symbols
            .get(name)
            .ok_or_else(|| err_msg!(Reference, "undeclared variable ${}", name))?;
        let entries = variable
            .as_map()
            .ok_or_else(|| err_msg!(Semantic, "${} is a {}, not a map", name, variable.kind()))?;
        Ok(entries
            .iter()
            .map(|(k, v)| vec![k.clone(), v.clone()])
            .collect())
    }

    /// Items of a single-variable loop: a declared list, an inline list declaration, or
    /// the source text split on commas.
    fn list_items<N: SyntaxNode>(&mut self, source: &N) -> ScssResult<Vec<String>> {
        if source.is(NodeKind::Variable) {
            if let Some(items) = self.ctx.symbols.get(source.text()).and_then(Variable::as_list) {
                return Ok(items.to_vec());
            }
        }
        if source.is(NodeKind::ListDeclaration) {
            let mut items = Vec::with_capacity(source.children().len());
            for item in source.children() {
                items.push(self.render_value(item, Resolve::Fold)?);
            }
            return Ok(items);
        }
        Ok(source
            .text()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }

    // ------------------------------------------------------------------------
    // Unrolling
    // ------------------------------------------------------------------------

    /// Renders `body` once per row with `names` bound to the row's values and queues the
    /// joined iterations as a single fragment.
    fn unroll_loop<N, I>(&mut self, body: &N, names: &[String], rows: I, placement: Placement) -> ScssResult<()>
    where
        N: SyntaxNode,
        I: Iterator<Item = Vec<String>>,
    {
        let bindings_mark = self.ctx.each_bindings.len();
        if placement == Placement::Substituted {
            self.ctx
                .each_bindings
                .extend(names.iter().map(|n| bare_name(n).to_string()));
        }
        self.ctx.loop_depth += 1;

        let mut iterations = Vec::new();
        let mut result = Ok(());
        for row in rows {
            for (name, value) in names.iter().zip(&row) {
                self.ctx
                    .symbols
                    .declare(bare_name(name), Variable::scalar(value.clone(), true));
            }
            match self.unroll_body(body, names, &row, placement) {
                Ok(text) => iterations.push(text),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        self.ctx.loop_depth -= 1;
        self.ctx.each_bindings.truncate(bindings_mark);
        for name in names {
            self.ctx.symbols.remove(name);
        }
        result?;

        let fragment = iterations.join("\n");
        if !fragment.is_empty() {
            self.ctx.enqueue(fragment);
        }
        Ok(())
    }

    /// One iteration. Rules queued while the body renders belong to this iteration and
    /// are pulled back into its text before the placeholders are rewritten.
    fn unroll_body<N: SyntaxNode>(
        &mut self,
        body: &N,
        names: &[String],
        values: &[String],
        placement: Placement,
    ) -> ScssResult<String> {
        let mark = self.ctx.deferred.len();
        self.ctx.unrolling.push(self.ctx.ancestors.len());
        let rendered = self.render_block(body);
        self.ctx.unrolling.pop();

        let mut text = rendered?;
        for fragment in self.ctx.deferred.drain(mark..) {
            text.push('\n');
            text.push_str(fragment.trim());
        }
        let text = names
            .iter()
            .zip(values)
            .fold(text, |text, (name, value)| placement.apply(&text, name, value));
        Ok(text.trim().to_string())
    }

    // ------------------------------------------------------------------------
    // @if
    // ------------------------------------------------------------------------

    /// Renders the first matching branch. An `@else if` whose guard holds but whose body
    /// renders empty does not match.
    pub(crate) fn render_if<N: SyntaxNode>(&mut self, node: &N) -> ScssResult<String> {
        let guard = child(node, 0)?;
        let then = child_of(node, 1, NodeKind::Block)?;
        if self.guard_holds(guard)? {
            return self.render_block(then);
        }

        for branch in node.filter(NodeKind::ElseIf) {
            if self.guard_holds(child(branch, 0)?)? {
                let text = self.render_block(child_of(branch, 1, NodeKind::Block)?)?;
                if !text.is_empty() {
                    return Ok(text);
                }
            }
        }

        match node.find(NodeKind::Else) {
            Some(otherwise) => self.render_block(child_of(otherwise, 0, NodeKind::Block)?),
            None => Ok(String::new()),
        }
    }

    fn guard_holds<N: SyntaxNode>(&mut self, guard: &N) -> ScssResult<bool> {
        Ok(self.render_value(guard, Resolve::Fold)?.trim() == "true")
    }
}

fn sigil_name<N: SyntaxNode>(node: &N) -> String {
    format!("${}", bare_name(node.text()))
}
