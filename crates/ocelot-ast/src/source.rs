//! Source positions attached to AST nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line/column position in the parsed source.
///
/// Ordering is by line, then column, which is the order diagnostics and
/// cause-site selection use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for SourceLoc {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
