//! The fixed-order pass pipeline.
//!
//! Runs `Surface` → `Bodies` → `PureContract` over one program, appends each
//! pass's batch to the combined diagnostic sequence, publishes the batch to
//! the sink, and records cumulative and per-pass counts. After the final pass
//! it builds the type-metadata handoff and checks its determinism.

use ocelot_ast::Program;

use crate::ValidationOptions;
use crate::bodies::validate_bodies;
use crate::diagnostics::{Diagnostics, DiagnosticsSink};
use crate::handoff::{TypeMetadataHandoff, build_type_metadata_handoff, is_deterministic_handoff};
use crate::purity::validate_pure_contract;
use crate::surface::{IntegrationSurface, build_integration_surface};

/// The user-visible passes, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassId {
    Surface,
    Bodies,
    PureContract,
}

pub const PASS_ORDER: [PassId; 3] = [PassId::Surface, PassId::Bodies, PassId::PureContract];

impl PassId {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Everything the pipeline produced.
#[derive(Debug, Clone, Default)]
pub struct PassManagerResult {
    pub surface: IntegrationSurface,
    /// The combined diagnostic sequence across all passes.
    pub diagnostics: Diagnostics,
    /// Cumulative diagnostic count after each pass; never decreases.
    pub diagnostics_after_pass: [usize; 3],
    pub diagnostics_emitted_by_pass: [usize; 3],
    pub handoff: TypeMetadataHandoff,
    pub deterministic_handoff: bool,
    /// False only when the caller provided no program.
    pub executed: bool,
}

/// The cumulative per-pass counts never decrease.
pub fn diagnostics_after_pass_is_monotonic(counts: &[usize; 3]) -> bool {
    counts.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Run the pipeline. A missing program is a caller bug and yields the empty
/// result with `executed = false`; analysis itself never fails.
pub fn run_passes(
    program: Option<&Program>,
    options: &ValidationOptions,
    sink: &mut dyn DiagnosticsSink,
) -> PassManagerResult {
    let mut result = PassManagerResult::default();
    let Some(program) = program else {
        return result;
    };
    result.executed = true;

    for pass in PASS_ORDER {
        let mut batch = Diagnostics::new();
        match pass {
            PassId::Surface => {
                result.surface = build_integration_surface(program, &mut batch);
            }
            PassId::Bodies => {
                validate_bodies(program, &result.surface, options, &mut batch);
            }
            PassId::PureContract => {
                validate_pure_contract(program, &result.surface.functions, &mut batch);
            }
        }
        result.diagnostics.extend_from(&batch);
        if !batch.is_empty() {
            sink.publish_batch(&batch);
        }
        result.diagnostics_after_pass[pass.index()] = result.diagnostics.len();
        result.diagnostics_emitted_by_pass[pass.index()] = batch.len();
    }

    result.handoff = build_type_metadata_handoff(&result.surface);
    result.deterministic_handoff = is_deterministic_handoff(&result.handoff);
    result
}
