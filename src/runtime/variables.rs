//! # Variable Model
//!
//! Variables are a closed set of variants sharing one capability: a composed textual
//! value, a temporariness flag and a kind tag. List and Map values are snapshots taken at
//! declaration time; nothing in this module resolves references lazily.
//!
//! The symbol table is one flat namespace for the whole document. It remembers the order
//! in which names were first declared, which is the order of the synthesized
//! custom-property block.

use indexmap::IndexMap;
use serde::Serialize;

/// Kind tag for a [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    Scalar,
    List,
    Map,
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VariableKind::Scalar => "scalar",
            VariableKind::List => "list",
            VariableKind::Map => "map",
        })
    }
}

/// Resolved payload of a variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VariableValue {
    Scalar(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub value: VariableValue,
    /// Declared inside a rule body or an active loop; never exported to the root block.
    pub temporary: bool,
}

impl Variable {
    pub fn scalar(value: impl Into<String>, temporary: bool) -> Self {
        Self {
            value: VariableValue::Scalar(value.into()),
            temporary,
        }
    }

    pub fn list(values: Vec<String>, temporary: bool) -> Self {
        Self {
            value: VariableValue::List(values),
            temporary,
        }
    }

    /// Builds a map from entries in source order; a repeated key keeps its first value.
    pub fn map<I>(entries: I, temporary: bool) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = IndexMap::new();
        for (key, value) in entries {
            map.entry(key).or_insert(value);
        }
        Self {
            value: VariableValue::Map(map),
            temporary,
        }
    }

    /// The composed literal value.
    ///
    /// ```rust
    /// use scssc::runtime::Variable;
    /// let list = Variable::list(vec!["a".into(), "b".into()], false);
    /// assert_eq!(list.value(), "a, b");
    /// ```
    pub fn value(&self) -> String {
        match &self.value {
            VariableValue::Scalar(v) => v.clone(),
            VariableValue::List(items) => items.join(", "),
            VariableValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn kind(&self) -> VariableKind {
        match self.value {
            VariableValue::Scalar(_) => VariableKind::Scalar,
            VariableValue::List(_) => VariableKind::List,
            VariableValue::Map(_) => VariableKind::Map,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match &self.value {
            VariableValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match &self.value {
            VariableValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

/// `var(--name)`
pub fn custom_property_reference(name: &str) -> String {
    format!("var(--{name})")
}

/// Strips the `$` sigil from a reference.
pub fn bare_name(reference: &str) -> &str {
    reference.trim().trim_start_matches('$')
}

/// The document-wide symbol table. Names are stored without the `$` sigil.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    vars: IndexMap<String, Variable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares or redeclares `name`. A redeclared name keeps its original position.
    pub fn declare(&mut self, name: impl Into<String>, variable: Variable) {
        self.vars.insert(name.into(), variable);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(bare_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(bare_name(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.vars.shift_remove(bare_name(name))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    /// Non-temporary scalars, in declaration order: the custom-property block.
    pub fn root_properties(&self) -> impl Iterator<Item = (&str, String)> {
        self.vars
            .iter()
            .filter(|(_, v)| !v.is_temporary() && v.kind() == VariableKind::Scalar)
            .map(|(name, v)| (name.as_str(), v.value()))
    }
}
