//! Compiler configuration.
//!
//! Options are plain data with serde support so a driver can read them from whatever
//! configuration file it owns. Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// One level of indentation inside rule blocks.
    pub indent: String,
    /// Selector of the synthesized custom-property block.
    pub root_selector: String,
    /// Maximum nesting of statements before compilation aborts.
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            root_selector: ":root".to_string(),
            max_depth: 256,
        }
    }
}

impl CompilerOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = CompilerOptions::from_json(r#"{"indent": "  "}"#).unwrap();
        assert_eq!(options.indent, "  ");
        assert_eq!(options.root_selector, ":root");
        assert_eq!(options.max_depth, 256);
    }
}
