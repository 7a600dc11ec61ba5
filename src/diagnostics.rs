//! # Compiler Diagnostics
//!
//! This module defines the unified, `miette`-based diagnostic system for the compiler
//! core. Every failure the engine can produce is one of three fatal categories:
//!
//! - **Semantic**: type mismatches between boolean and arithmetic operands, operators
//!   rejected for their operand type, unknown operators, unmatched parentheses, and
//!   malformed syntax trees.
//! - **Reference**: a mixin or variable used before declaration, or a name that cannot be
//!   resolved where a literal value is required.
//! - **Argument**: a mixin call that cannot bind every parameter.
//!
//! # Error Construction
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Semantic, "operator {} not permitted", op)`
//!
//! - **Attach location with the builder methods, not by hand.**
//!   `with_span` and `with_source` only fill a slot that is still empty, so the innermost
//!   node that saw the failure keeps its label as the error unwinds.
//!
//! No variant is recoverable: the first error aborts the whole document.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

// Type aliases for clarity and brevity
pub type SourceArc = Arc<NamedSource<String>>;

/// Result alias used throughout the crate.
pub type ScssResult<T> = Result<T, ScssError>;

/// Type-safe error classification that corresponds to `ScssError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Type mismatches, rejected operators, malformed expressions or trees
    Semantic,
    /// Use before declaration, unresolved names in constant-fold positions
    Reference,
    /// Mixin calls with too few arguments
    Argument,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Semantic => "Semantic",
            ErrorType::Reference => "Reference",
            ErrorType::Argument => "Argument",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The document the error was raised in (if the caller attached one).
    pub source: Option<SourceArc>,
    /// The span of the offending node (if known).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }
}

/// Unified error type for every compiler failure mode.
#[derive(Debug, Error)]
pub enum ScssError {
    #[error("Semantic error: {message}")]
    Semantic { message: String, ctx: ErrorContext },
    #[error("Reference error: {message}")]
    Reference { message: String, ctx: ErrorContext },
    #[error("Argument error: {message}")]
    Argument { message: String, ctx: ErrorContext },
}

impl ScssError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            ScssError::Semantic { ctx, .. } => ctx,
            ScssError::Reference { ctx, .. } => ctx,
            ScssError::Argument { ctx, .. } => ctx,
        }
    }

    fn get_ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            ScssError::Semantic { ctx, .. } => ctx,
            ScssError::Reference { ctx, .. } => ctx,
            ScssError::Argument { ctx, .. } => ctx,
        }
    }

    /// The bare message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            ScssError::Semantic { message, .. } => message,
            ScssError::Reference { message, .. } => message,
            ScssError::Argument { message, .. } => message,
        }
    }

    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ScssError::Semantic { .. } => ErrorType::Semantic,
            ScssError::Reference { .. } => ErrorType::Reference,
            ScssError::Argument { .. } => ErrorType::Argument,
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }

    /// Records the span of the node being processed, unless a deeper node already did.
    pub fn with_span(mut self, span: Span) -> Self {
        let ctx = self.get_ctx_mut();
        if ctx.span.is_none() && !span.is_empty() {
            ctx.span = Some(span);
        }
        self
    }

    /// Attaches the document source, unless one is already present.
    pub fn with_source(mut self, source: &SourceArc) -> Self {
        let ctx = self.get_ctx_mut();
        if ctx.source.is_none() {
            ctx.source = Some(Arc::clone(source));
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.get_ctx_mut().help = Some(help.into());
        self
    }
}

impl Diagnostic for ScssError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Semantic => "scssc::semantic",
            ErrorType::Reference => "scssc::reference",
            ErrorType::Argument => "scssc::argument",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        // A label without source text has nothing to point into.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(name: &str, source: S) -> SourceArc {
    Arc::new(NamedSource::new(name, source.as_ref().to_string()))
}

/// Constructs a `ScssError` variant with a formatted message and no context.
///
/// ```rust
/// use scssc::err_msg;
/// let err = err_msg!(Reference, "undefined variable ${}", "gap");
/// assert_eq!(err.error_type(), scssc::ErrorType::Reference);
/// assert_eq!(err.message(), "undefined variable $gap");
/// ```
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::ScssError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
        }
    };
}
