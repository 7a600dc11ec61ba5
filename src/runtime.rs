//! Runtime module for the stylesheet compiler
//!
//! The value-level building blocks the emission engine drives:
//!
//! - **`variables`**: the Scalar/List/Map variable model and the flat symbol table
//! - **`eval`**: the stateless expression evaluator with unit inference
//! - **`context`**: the per-document compilation context threaded through the tree walk

pub mod context;
pub mod eval;
pub mod variables;

pub use context::CompilationContext;
pub use eval::{evaluate, evaluate_tokens, Token, Unit};
pub use variables::{SymbolTable, Variable, VariableKind, VariableValue};
