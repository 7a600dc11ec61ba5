pub use crate::diagnostics::{to_error_source, ErrorContext, ErrorType, ScssError, ScssResult};
pub use crate::ast::{Node, NodeKind, Span, SyntaxNode};
pub use crate::engine::{compile, Compiler};
pub use crate::options::CompilerOptions;

pub mod ast;
pub mod builtins;
pub mod diagnostics;
pub mod engine;
pub mod macros;
pub mod options;
pub mod runtime;
