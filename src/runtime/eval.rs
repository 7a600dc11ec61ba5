//! # Expression Evaluator
//!
//! Turns a flat infix token stream into one literal: a number with an inferred unit
//! suffix, or `true`/`false`. The evaluator is stateless; variable references have
//! already been replaced by their literal values before tokens reach it.
//!
//! ## Evaluation order
//!
//! 1. Parenthesised spans are evaluated first, innermost structure recursively.
//! 2. Unary `not` negates the reduced result of the span it sits in (the whole
//!    expression, or its enclosing parentheses), once per occurrence.
//! 3. Binary operators fold in a FIXED pass order, one operator kind at a time:
//!    `*`, `/`, `+`, `-`, `and`, `or`, `==`, `<=`, `>=`, `<`, `>`.
//!
//! The pass order is not mathematical precedence: `8 - 2 + 1` folds `+` first and
//! yields `5`. Stylesheets written against this compiler depend on that order.
//!
//! ## Unit inference
//!
//! The unit only decides the suffix of a numeric result. It is inferred from the whole
//! operand list, and a pixel, hex colour or percentage operand overwrites whatever was
//! inferred before it, including boolean.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::ScssResult;
use crate::err_msg;

// ============================================================================
// TOKENS
// ============================================================================

/// One raw token of an expression, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Operand text, already resolved to a literal.
    Operand(String),
    /// Operator or parenthesis text.
    Operator(String),
}

impl Token {
    pub fn operand(text: impl Into<String>) -> Self {
        Token::Operand(text.into())
    }

    pub fn operator(text: impl Into<String>) -> Self {
        Token::Operator(text.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Mul,
    Div,
    Add,
    Sub,
    And,
    Or,
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
    Not,
}

const PASS_ORDER: [Operator; 11] = [
    Operator::Mul,
    Operator::Div,
    Operator::Add,
    Operator::Sub,
    Operator::And,
    Operator::Or,
    Operator::Eq,
    Operator::Le,
    Operator::Ge,
    Operator::Lt,
    Operator::Gt,
];

impl Operator {
    fn as_str(&self) -> &'static str {
        match self {
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Eq => "==",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Not => "not",
        }
    }

    fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }

    fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Le | Operator::Ge | Operator::Lt | Operator::Gt
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Working form of a token once operator text has been recognised.
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Value(Scalar),
    Op(Operator),
    Open,
    Close,
}

fn classify(token: &str) -> ScssResult<Item> {
    let item = match token.trim() {
        "(" => Item::Open,
        ")" => Item::Close,
        "*" => Item::Op(Operator::Mul),
        "/" => Item::Op(Operator::Div),
        "+" => Item::Op(Operator::Add),
        "-" => Item::Op(Operator::Sub),
        "and" => Item::Op(Operator::And),
        "or" => Item::Op(Operator::Or),
        "==" => Item::Op(Operator::Eq),
        "<=" => Item::Op(Operator::Le),
        ">=" => Item::Op(Operator::Ge),
        "<" => Item::Op(Operator::Lt),
        ">" => Item::Op(Operator::Gt),
        "not" => Item::Op(Operator::Not),
        other => return Err(err_msg!(Semantic, "operator `{}` is not permitted", other)),
    };
    Ok(item)
}

// ============================================================================
// SCALAR VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Number(f64),
    Bool(bool),
    /// Anything that is neither numeric nor boolean, e.g. `red`.
    Text(String),
}

impl Scalar {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "true" => return Scalar::Bool(true),
            "false" => return Scalar::Bool(false),
            _ => {}
        }
        if let Some(hex) = text.strip_prefix('#') {
            if HEX.is_match(text) {
                if let Ok(n) = i64::from_str_radix(hex, 16) {
                    return Scalar::Number(n as f64);
                }
            }
            return Scalar::Text(text.to_string());
        }
        let magnitude = text
            .strip_suffix('%')
            .or_else(|| text.strip_suffix("px"))
            .unwrap_or(text);
        match magnitude.parse::<f64>() {
            Ok(n) if n.is_finite() && NUMBER.is_match(magnitude) => Scalar::Number(n),
            _ => Scalar::Text(text.to_string()),
        }
    }

    fn is_bool(&self) -> bool {
        matches!(self, Scalar::Bool(_))
    }

    fn number(&self, op: Operator) -> ScssResult<f64> {
        match self {
            Scalar::Number(n) => Ok(*n),
            Scalar::Bool(_) => Err(err_msg!(
                Semantic,
                "operator `{}` cannot be used with boolean values",
                op
            )),
            Scalar::Text(t) => Err(err_msg!(
                Semantic,
                "operand `{}` of `{}` is not a numeric value",
                t,
                op
            )),
        }
    }

    fn boolean(&self, op: Operator) -> ScssResult<bool> {
        match self {
            Scalar::Bool(b) => Ok(*b),
            _ => Err(err_msg!(
                Semantic,
                "operator `{}` cannot be used with arithmetic values",
                op
            )),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Text(t) => f.write_str(t),
        }
    }
}

/// Integral numbers print without a fraction; others with at most six decimals.
fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ============================================================================
// UNIT INFERENCE
// ============================================================================

static PIXEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?px$").unwrap());
static HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{3,6}$").unwrap());
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?%$").unwrap());
static REAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

/// Suffix policy for a numeric result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Integer,
    Real,
    Pixel,
    Hex,
    Percent,
    Boolean,
}

/// Infers the unit of an expression from all of its raw tokens.
pub fn infer_unit(tokens: &[Token]) -> Unit {
    let mut detected: Option<Unit> = None;

    for token in tokens {
        if let Token::Operator(text) = token {
            if let Ok(Item::Op(op)) = classify(text) {
                if op.is_logical() || op.is_comparison() {
                    detected = Some(Unit::Boolean);
                }
            }
        }
    }

    for token in tokens {
        let Token::Operand(text) = token else {
            continue;
        };
        let part = text.trim().to_lowercase();
        if part == "true" || part == "false" {
            detected = Some(Unit::Boolean);
        }
        // Pixel, hex and percentage overwrite anything detected so far, boolean included.
        if PIXEL.is_match(&part) {
            detected = Some(Unit::Pixel);
        } else if HEX.is_match(&part) {
            detected = Some(Unit::Hex);
        } else if PERCENT.is_match(&part) {
            detected = Some(Unit::Percent);
        } else if REAL.is_match(&part) {
            if matches!(detected, None | Some(Unit::Integer)) {
                detected = Some(Unit::Real);
            }
        } else if INTEGER.is_match(&part) && detected.is_none() {
            detected = Some(Unit::Integer);
        }
    }

    detected.unwrap_or(Unit::Integer)
}

fn format_result(value: Scalar, unit: Unit) -> ScssResult<String> {
    let Scalar::Number(n) = value else {
        // Booleans and plain text come back exactly as computed.
        return Ok(value.to_string());
    };
    let text = match unit {
        Unit::Pixel => format!("{}px", format_number(n)),
        Unit::Percent => format!("{}%", format_number(n)),
        Unit::Hex => {
            let magnitude = n.round();
            if !magnitude.is_finite() || magnitude < 0.0 {
                return Err(err_msg!(
                    Semantic,
                    "`{}` cannot be rendered as a hex colour",
                    format_number(n)
                ));
            }
            format!("#{:x}", magnitude as u64)
        }
        Unit::Integer | Unit::Real | Unit::Boolean => format_number(n),
    };
    Ok(text)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Evaluates an operand list and an operator list whose `(`, `)` and `not` tokens sit
/// positionally among the binary operators.
///
/// The two lists are merged by alternation: where an operand is expected, pending `(` and
/// `not` tokens are taken first; where an operator is expected, pending `)` tokens are.
///
/// ```rust
/// use scssc::runtime::evaluate;
/// let operands = vec!["5px".to_string(), "10px".to_string()];
/// let operators = vec!["+".to_string()];
/// assert_eq!(evaluate(&operands, &operators).unwrap(), "15px");
/// ```
pub fn evaluate(operands: &[String], operators: &[String]) -> ScssResult<String> {
    let mut ops = operators.iter().map(|o| o.trim()).peekable();
    let mut vals = operands.iter();
    let mut tokens = Vec::with_capacity(operands.len() + operators.len());

    loop {
        while let Some(op) = ops.next_if(|o| *o == "(" || *o == "not") {
            tokens.push(Token::operator(op));
        }
        match vals.next() {
            Some(v) => tokens.push(Token::operand(v.as_str())),
            None => break,
        }
        while let Some(op) = ops.next_if(|o| *o == ")") {
            tokens.push(Token::operator(op));
        }
        match ops.next() {
            Some(op) => tokens.push(Token::operator(op)),
            None => break,
        }
    }
    // Whatever could not be placed is reported by the evaluation itself.
    tokens.extend(ops.map(Token::operator));
    tokens.extend(vals.map(|v| Token::operand(v.as_str())));

    evaluate_tokens(&tokens)
}

/// Evaluates an infix token stream in source order. A lone operand is returned verbatim.
///
/// ```rust
/// use scssc::runtime::{evaluate_tokens, Token};
/// let tokens = vec![
///     Token::operand("2"),
///     Token::operator("<"),
///     Token::operand("3"),
/// ];
/// assert_eq!(evaluate_tokens(&tokens).unwrap(), "true");
/// ```
pub fn evaluate_tokens(tokens: &[Token]) -> ScssResult<String> {
    if let [Token::Operand(text)] = tokens {
        return Ok(text.trim().to_string());
    }
    let unit = infer_unit(tokens);
    let items = tokens
        .iter()
        .map(|t| match t {
            Token::Operand(text) => Ok(Item::Value(Scalar::parse(text))),
            Token::Operator(text) => classify(text),
        })
        .collect::<ScssResult<Vec<_>>>()?;
    let value = reduce(items)?;
    format_result(value, unit)
}

// ============================================================================
// REDUCTION
// ============================================================================

fn reduce(mut items: Vec<Item>) -> ScssResult<Scalar> {
    while let Some(open) = items.iter().position(|i| *i == Item::Open) {
        let mut depth = 0usize;
        let mut close = None;
        for (idx, item) in items.iter().enumerate().skip(open) {
            match item {
                Item::Open => depth += 1,
                Item::Close => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(idx);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| err_msg!(Semantic, "unmatched parenthesis `(`"))?;
        let inner: Vec<Item> = items.drain(open..=close).collect();
        let value = reduce(inner[1..inner.len() - 1].to_vec())?;
        items.insert(open, Item::Value(value));
    }
    if items.contains(&Item::Close) {
        return Err(err_msg!(Semantic, "unmatched parenthesis `)`"));
    }

    // `not` negates the whole span it appears in, once per occurrence.
    let negations = items.iter().filter(|i| **i == Item::Op(Operator::Not)).count();
    items.retain(|i| *i != Item::Op(Operator::Not));
    if negations > 0 && items.is_empty() {
        return Err(err_msg!(Semantic, "operator `not` is missing its operand"));
    }

    for op in PASS_ORDER {
        while let Some(idx) = items.iter().position(|i| *i == Item::Op(op)) {
            let (lhs, rhs) = match (idx.checked_sub(1).and_then(|l| items.get(l)), items.get(idx + 1)) {
                (Some(Item::Value(l)), Some(Item::Value(r))) => (l, r),
                _ => return Err(err_msg!(Semantic, "operator `{}` is missing an operand", op)),
            };
            let result = apply(op, lhs, rhs)?;
            log::trace!("folded {lhs} {op} {rhs} = {result}");
            items.splice(idx - 1..=idx + 1, [Item::Value(result)]);
        }
    }

    match items.as_slice() {
        [Item::Value(v)] if negations % 2 == 1 => Ok(Scalar::Bool(!v.boolean(Operator::Not)?)),
        [Item::Value(v)] if negations > 0 => v.boolean(Operator::Not).map(Scalar::Bool),
        [Item::Value(v)] => Ok(v.clone()),
        [] => Err(err_msg!(Semantic, "empty expression")),
        rest => match rest.iter().find(|i| !matches!(i, Item::Value(_))) {
            Some(Item::Op(op)) => Err(err_msg!(Semantic, "operator `{}` is not permitted here", op)),
            _ => Err(err_msg!(
                Semantic,
                "expression has {} operands but no operator between them",
                rest.len()
            )),
        },
    }
}

fn apply(op: Operator, lhs: &Scalar, rhs: &Scalar) -> ScssResult<Scalar> {
    if lhs.is_bool() != rhs.is_bool() {
        return Err(err_msg!(
            Semantic,
            "boolean and arithmetic values cannot be mixed (`{} {} {}`)",
            lhs,
            op,
            rhs
        ));
    }

    let result = match op {
        Operator::And => Scalar::Bool(lhs.boolean(op)? && rhs.boolean(op)?),
        Operator::Or => Scalar::Bool(lhs.boolean(op)? || rhs.boolean(op)?),
        Operator::Eq => match (lhs, rhs) {
            (Scalar::Number(l), Scalar::Number(r)) => Scalar::Bool(l == r),
            _ => Scalar::Bool(lhs.to_string() == rhs.to_string()),
        },
        Operator::Mul => Scalar::Number(lhs.number(op)? * rhs.number(op)?),
        Operator::Div => {
            let divisor = rhs.number(op)?;
            if divisor == 0.0 {
                return Err(err_msg!(Semantic, "division by zero"));
            }
            Scalar::Number(lhs.number(op)? / divisor)
        }
        Operator::Add => Scalar::Number(lhs.number(op)? + rhs.number(op)?),
        Operator::Sub => Scalar::Number(lhs.number(op)? - rhs.number(op)?),
        Operator::Le => Scalar::Bool(lhs.number(op)? <= rhs.number(op)?),
        Operator::Ge => Scalar::Bool(lhs.number(op)? >= rhs.number(op)?),
        Operator::Lt => Scalar::Bool(lhs.number(op)? < rhs.number(op)?),
        Operator::Gt => Scalar::Bool(lhs.number(op)? > rhs.number(op)?),
        Operator::Not => return Err(err_msg!(Semantic, "operator `not` is unary")),
    };
    Ok(result)
}
