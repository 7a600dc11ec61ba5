//! # Mixin (Macro) Model
//!
//! A mixin is a named, parameterised template of rule-text fragments. Its body is
//! captured once, at definition time, as two ordered fragment lists:
//!
//! - **direct** fragments are declarations placed inline where the mixin is included;
//! - **deferred** fragments are whole rule blocks whose selector still carries the `&`
//!   marker. The caller composes them against its ancestor chain and enqueues them.
//!
//! Expansion binds call arguments to parameters positionally and substitutes them into
//! every fragment as text (see [`utils`] for the boundary rule). Nothing here evaluates
//! expressions; arguments arrive already resolved to literals.
//!
//! ```rust
//! use scssc::macros::{Mixin, MixinBody};
//! let body = MixinBody {
//!     direct: vec!["padding: $p;".into()],
//!     deferred: vec![],
//! };
//! let mixin = Mixin::fixed(vec!["$p".into()], Default::default(), body).unwrap();
//! let expansion = mixin.expand("pad", &["4px".to_string()]).unwrap();
//! assert_eq!(expansion.direct, vec!["padding: 4px;"]);
//! ```

pub mod utils;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::diagnostics::ScssResult;
use crate::err_msg;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The captured body of a mixin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixinBody {
    pub direct: Vec<String>,
    pub deferred: Vec<String>,
}

impl MixinBody {
    pub fn extend(&mut self, other: Expansion) {
        self.direct.extend(other.direct);
        self.deferred.extend(other.deferred);
    }
}

/// A mixin definition. Both variants share one `expand` contract and differ only in how
/// call arguments bind to parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Mixin {
    /// Positional parameters, some of which may carry defaults.
    Fixed {
        params: Vec<String>,
        defaults: IndexMap<String, String>,
        body: MixinBody,
    },
    /// A single spread parameter bound to every call argument.
    Variadic { param: String, body: MixinBody },
}

/// The result of expanding a mixin call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub direct: Vec<String>,
    pub deferred: Vec<String>,
}

impl Expansion {
    /// Direct fragments joined for inline placement, one level deep.
    pub fn inline(&self, indent: &str) -> String {
        self.direct
            .iter()
            .map(|fragment| format!("\n{indent}{fragment}"))
            .collect()
    }
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Mixin {
    /// Builds a fixed-arity mixin. Every default must belong to a declared parameter.
    pub fn fixed(
        params: Vec<String>,
        defaults: IndexMap<String, String>,
        body: MixinBody,
    ) -> ScssResult<Self> {
        if let Some(stray) = defaults.keys().find(|k| !params.contains(k)) {
            return Err(err_msg!(
                Semantic,
                "default value given for undeclared parameter {}",
                stray
            ));
        }
        Ok(Mixin::Fixed {
            params,
            defaults,
            body,
        })
    }

    pub fn variadic(param: String, body: MixinBody) -> Self {
        Mixin::Variadic { param, body }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Mixin::Variadic { .. })
    }

    pub fn body(&self) -> &MixinBody {
        match self {
            Mixin::Fixed { body, .. } | Mixin::Variadic { body, .. } => body,
        }
    }

    /// Number of arguments a call must supply.
    pub fn required_arity(&self) -> usize {
        match self {
            Mixin::Fixed {
                params, defaults, ..
            } => params.len().saturating_sub(defaults.len()),
            Mixin::Variadic { .. } => 0,
        }
    }

    /// Binds `args` and substitutes them into both fragment lists.
    ///
    /// Arguments beyond the declared parameters are ignored.
    pub fn expand(&self, name: &str, args: &[String]) -> ScssResult<Expansion> {
        let bindings = self.bind(name, args)?;
        let body = self.body();
        let apply = |fragment: &String| {
            bindings
                .iter()
                .fold(fragment.clone(), |text, (param, value)| {
                    utils::substitute(&text, param, value)
                })
        };
        Ok(Expansion {
            direct: body.direct.iter().map(apply).collect(),
            deferred: body.deferred.iter().map(apply).collect(),
        })
    }

    fn bind(&self, name: &str, args: &[String]) -> ScssResult<Vec<(String, String)>> {
        match self {
            Mixin::Variadic { param, .. } => Ok(vec![(param.clone(), args.join(", "))]),
            Mixin::Fixed {
                params, defaults, ..
            } => {
                let required = self.required_arity();
                if args.len() < required {
                    return Err(err_msg!(
                        Argument,
                        "mixin `{}` expects at least {} argument(s) but was called with {}",
                        name,
                        required,
                        args.len()
                    ));
                }
                if args.len() > params.len() {
                    log::debug!(
                        "mixin `{name}` ignores {} extra argument(s)",
                        args.len() - params.len()
                    );
                }
                params
                    .iter()
                    .enumerate()
                    .map(|(i, param)| {
                        let value = args
                            .get(i)
                            .or_else(|| defaults.get(param))
                            .ok_or_else(|| {
                                err_msg!(
                                    Argument,
                                    "missing value for parameter {} of mixin `{}`",
                                    param,
                                    name
                                )
                            })?;
                        Ok((param.clone(), value.clone()))
                    })
                    .collect()
            }
        }
    }
}

/// Mixins declared so far in the document.
#[derive(Debug, Clone, Default)]
pub struct MixinTable {
    mixins: HashMap<String, Mixin>,
}

impl MixinTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mixin; a later definition with the same name replaces the earlier one.
    pub fn define(&mut self, name: impl Into<String>, mixin: Mixin) {
        self.mixins.insert(name.into(), mixin);
    }

    pub fn get(&self, name: &str) -> Option<&Mixin> {
        self.mixins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mixins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }

    pub fn clear(&mut self) {
        self.mixins.clear();
    }
}
