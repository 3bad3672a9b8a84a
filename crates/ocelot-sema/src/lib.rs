//! Semantic analysis middle-end for the Ocelot language.
//!
//! Consumes a parsed program and produces three things:
//! - an **integration surface** summarizing globals, functions, interfaces,
//!   and implementations at declaration level,
//! - a lexicographically sorted **type-metadata handoff** for downstream code
//!   generation,
//! - an ordered stream of single-line diagnostics.
//!
//! Three passes run in fixed order over the shared AST:
//! `Surface` → `Bodies` → `PureContract`. Analyses never abort — every
//! detected condition becomes a diagnostic and traversal continues with
//! `Unknown` types or best-effort surface records.
//!
//! # Module map
//!
//! - [`diagnostics`] — diagnostic records, codes, and the per-pass sink
//! - [`eval`] — constant folding for global initializers
//! - [`static_analysis`] — "always returns" proofs and the overflow-checked
//!   scalar folding that drives them
//! - [`surface`] — pass 1, the integration surface builder
//! - [`bodies`] — pass 2, scoping and type validation of function bodies
//! - [`purity`] — pass 3, interprocedural purity classification
//! - [`summaries`] — atomic memory-order mapping and vector lowering counts
//! - [`handoff`] — the sorted metadata projection and its determinism check
//! - [`pass_manager`] — the fixed-order pipeline

pub mod bodies;
pub mod diagnostics;
pub mod eval;
pub mod handoff;
pub mod pass_manager;
pub mod purity;
pub mod static_analysis;
pub mod summaries;
pub mod surface;
mod types;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod pass_manager_tests;
#[cfg(test)]
mod summaries_tests;

pub use diagnostics::{
    BufferSink, Diagnostic, DiagnosticCode, Diagnostics, DiagnosticsSink, NullSink,
};
pub use pass_manager::{PASS_ORDER, PassId, PassManagerResult, run_passes};
pub use types::SemType;

use ocelot_ast::Program;

/// Tunable validation limits.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Maximum argument count accepted on a message send.
    pub max_message_send_args: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_message_send_args: 4,
        }
    }
}

/// Errors surfaced by the convenience entry points. The analyses themselves
/// never fail; they report diagnostics and continue.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("semantic analysis failed with {} diagnostic(s)", .0.len())]
    AnalysisFailed(Diagnostics),
}

/// Run every pass over `program`; `Ok` only when no diagnostic was produced.
pub fn analyze(program: &Program, options: &ValidationOptions) -> Result<PassManagerResult, Error> {
    let result = run_passes(Some(program), options, &mut NullSink);
    if result.diagnostics.is_empty() {
        Ok(result)
    } else {
        Err(Error::AnalysisFailed(result.diagnostics))
    }
}
