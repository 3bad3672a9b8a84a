//! Diagnostic records, stable codes, and the per-pass publishing sink.
//!
//! Every diagnostic renders as a single line in the exact shape
//! `error:<line>:<col>: <message> [<code>]`. Within a pass, diagnostics
//! accumulate in emission order; the pass manager publishes each pass's batch
//! to a [`DiagnosticsSink`] at the pass boundary.

use std::fmt;

use ocelot_ast::SourceLoc;

/// Stable diagnostic codes emitted by the middle-end. No other codes exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `O3S200` — duplicate global/function/interface/implementation/selector.
    DuplicateSymbol,
    /// `O3S201` — duplicate declaration or parameter within one scope frame.
    DuplicateDeclaration,
    /// `O3S202` — undefined identifier.
    UndefinedIdentifier,
    /// `O3S203` — call to an unknown function.
    UnknownFunction,
    /// `O3S204` — call arity mismatch.
    ArityMismatch,
    /// `O3S205` — missing return path in a non-void function.
    MissingReturn,
    /// `O3S206` — type mismatch.
    TypeMismatch,
    /// `O3S207` — message receiver is not i32-compatible.
    MessageReceiverMismatch,
    /// `O3S208` — message send exceeds the argument limit.
    MessageArityOverflow,
    /// `O3S209` — message argument is not i32-compatible.
    MessageArgumentMismatch,
    /// `O3S210` — global initializer is not a constant expression.
    NonConstantInitializer,
    /// `O3S211` — return statement incompatible with the return type.
    ReturnTypeMismatch,
    /// `O3S212` — `break` outside loop or switch.
    BreakOutsideLoop,
    /// `O3S213` — `continue` outside loop.
    ContinueOutsideLoop,
    /// `O3S214` — assignment to a name that is not a mutable symbol.
    InvalidAssignmentTarget,
    /// `O3S215` — `pure` contract violation.
    PureContractViolation,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateSymbol => "O3S200",
            DiagnosticCode::DuplicateDeclaration => "O3S201",
            DiagnosticCode::UndefinedIdentifier => "O3S202",
            DiagnosticCode::UnknownFunction => "O3S203",
            DiagnosticCode::ArityMismatch => "O3S204",
            DiagnosticCode::MissingReturn => "O3S205",
            DiagnosticCode::TypeMismatch => "O3S206",
            DiagnosticCode::MessageReceiverMismatch => "O3S207",
            DiagnosticCode::MessageArityOverflow => "O3S208",
            DiagnosticCode::MessageArgumentMismatch => "O3S209",
            DiagnosticCode::NonConstantInitializer => "O3S210",
            DiagnosticCode::ReturnTypeMismatch => "O3S211",
            DiagnosticCode::BreakOutsideLoop => "O3S212",
            DiagnosticCode::ContinueOutsideLoop => "O3S213",
            DiagnosticCode::InvalidAssignmentTarget => "O3S214",
            DiagnosticCode::PureContractViolation => "O3S215",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic anchored at its most specific source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub loc: SourceLoc,
    pub code: DiagnosticCode,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error:{}:{}: {} [{}]",
            self.loc.line, self.loc.column, self.message, self.code
        )
    }
}

/// An ordered, append-only batch of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, loc: SourceLoc, code: DiagnosticCode, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            loc,
            code,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Append a copy of every entry in `batch`, preserving order.
    pub fn extend_from(&mut self, batch: &Diagnostics) {
        self.entries.extend(batch.entries.iter().cloned());
    }

    /// Rendered single-line records, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(Diagnostic::to_string).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Receives each pass's diagnostic batch at the pass boundary.
pub trait DiagnosticsSink {
    fn publish_batch(&mut self, batch: &Diagnostics);
}

/// Sink that discards every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn publish_batch(&mut self, _batch: &Diagnostics) {}
}

/// Sink that appends every published batch to an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    diagnostics: Diagnostics,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

impl DiagnosticsSink for BufferSink {
    fn publish_batch(&mut self, batch: &Diagnostics) {
        self.diagnostics.extend_from(batch);
    }
}
