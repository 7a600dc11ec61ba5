//! # Built-in Functions
//!
//! The fixed set of intrinsics the compiler evaluates itself. Anything else in function
//! position is passed through to the output untouched.
//!
//! ## Functions Provided
//!
//! - **Lists**: `length`, `nth`
//! - **Colours**: `darken`, `lighten` (a `color-mix` blend, not an exact lightness shift)
//! - **Gradients**: `linear-gradient` (direction keyword and comma spacing normalised)
//!
//! The functions here are pure. The engine resolves their arguments first; list
//! arguments arrive as the declared [`Variable`] they name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::ScssResult;
use crate::err_msg;
use crate::runtime::variables::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Length,
    Nth,
    Darken,
    Lighten,
    LinearGradient,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        let builtin = match name.trim() {
            "length" => Builtin::Length,
            "nth" => Builtin::Nth,
            "darken" => Builtin::Darken,
            "lighten" => Builtin::Lighten,
            "linear-gradient" => Builtin::LinearGradient,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Length => "length",
            Builtin::Nth => "nth",
            Builtin::Darken => "darken",
            Builtin::Lighten => "lighten",
            Builtin::LinearGradient => "linear-gradient",
        }
    }

    /// Number of arguments the intrinsic reads.
    pub fn arity(&self) -> usize {
        match self {
            Builtin::Length => 1,
            Builtin::Nth | Builtin::Darken | Builtin::Lighten => 2,
            Builtin::LinearGradient => 0,
        }
    }
}

fn expect_list<'a>(name: &str, variable: &'a Variable) -> ScssResult<&'a [String]> {
    variable.as_list().ok_or_else(|| {
        err_msg!(
            Semantic,
            "${} is a {}, not a list",
            name,
            variable.kind()
        )
    })
}

/// Element count of a list variable.
///
/// ```rust
/// use scssc::builtins::length;
/// use scssc::runtime::Variable;
/// let sizes = Variable::list(vec!["1px".into(), "2px".into()], false);
/// assert_eq!(length("sizes", &sizes).unwrap(), "2");
/// ```
pub fn length(name: &str, variable: &Variable) -> ScssResult<String> {
    Ok(expect_list(name, variable)?.len().to_string())
}

/// 1-based element lookup.
pub fn nth(name: &str, variable: &Variable, index: &str) -> ScssResult<String> {
    let items = expect_list(name, variable)?;
    let position: i64 = index
        .trim()
        .parse()
        .map_err(|_| err_msg!(Semantic, "list index `{}` is not an integer", index.trim()))?;
    if position < 1 || position as usize > items.len() {
        return Err(err_msg!(
            Semantic,
            "index {} is out of range for ${} (length {})",
            position,
            name,
            items.len()
        ));
    }
    Ok(items[position as usize - 1].clone())
}

/// `darken(color, amount)`: blend towards black.
pub fn darken(color: &str, amount: &str) -> String {
    mix_with("black", color, amount)
}

/// `lighten(color, amount)`: blend towards white.
pub fn lighten(color: &str, amount: &str) -> String {
    mix_with("white", color, amount)
}

fn mix_with(base: &str, color: &str, amount: &str) -> String {
    format!("color-mix(in srgb, {base} {}, {})", amount.trim(), color.trim())
}

static TO_DIRECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^to\s*(top|bottom|left|right)").unwrap());

/// Normalises `linear-gradient` arguments: `to` gets its trailing space, commas get
/// exactly one space after them.
///
/// ```rust
/// use scssc::builtins::linear_gradient;
/// assert_eq!(
///     linear_gradient(&["toright,red".to_string(), "blue".to_string()]),
///     "linear-gradient(to right, red, blue)"
/// );
/// ```
pub fn linear_gradient(args: &[String]) -> String {
    let joined = args.join(",");
    let parts: Vec<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| TO_DIRECTION.replace(p, "to ${1}").into_owned())
        .collect();
    format!("linear-gradient({})", parts.join(", "))
}

/// Rendering for functions the compiler does not know.
pub fn pass_through(name: &str, args: &[String]) -> String {
    format!("{}({})", name.trim(), args.join(", "))
}
