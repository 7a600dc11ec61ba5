//! Shared helpers for the integration suites.

#![allow(dead_code)]

use scssc::{compile, Node, ScssError};

/// Collapses every run of whitespace to one space so layouts compare on content.
pub fn normalize(css: &str) -> String {
    css.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compiles `tree`, failing the test with the rendered diagnostic on error.
pub fn compile_ok(tree: &Node) -> String {
    match compile(tree) {
        Ok(css) => css,
        Err(err) => panic!("compilation failed: {:?}", miette::Report::new(err)),
    }
}

pub fn compile_normalized(tree: &Node) -> String {
    normalize(&compile_ok(tree))
}

pub fn compile_err(tree: &Node) -> ScssError {
    match compile(tree) {
        Ok(css) => panic!("expected an error, got:\n{css}"),
        Err(err) => err,
    }
}
