use ocelot_ast::{AssignOp, ValueType};

use crate::pass_manager::{PASS_ORDER, PassId, diagnostics_after_pass_is_monotonic, run_passes};
use crate::test_utils::{
    assign, call, expr_stmt, function, global, ident, num, program_with, pure_function, ret,
};
use crate::{BufferSink, NullSink, ValidationOptions, analyze};

/// One diagnostic from each pass: a duplicate global (surface), an undefined
/// identifier (bodies), and a pure-contract violation.
fn noisy_program() -> ocelot_ast::Program {
    program_with(
        vec![
            global("g", num(1, 1, 5), 1, 1),
            global("g", num(2, 2, 5), 2, 1),
        ],
        vec![
            function(
                "touch",
                vec![],
                ValueType::Void,
                vec![
                    assign("g", AssignOp::Assign, num(3, 4, 7), 4, 3),
                    expr_stmt(ident("missing", 5, 3)),
                ],
                3, 1,
            ),
            pure_function(
                "p",
                vec![],
                ValueType::I32,
                vec![
                    expr_stmt(call("touch", vec![], 7, 3)),
                    ret(num(0, 8, 10), 8, 3),
                ],
                6, 1,
            ),
        ],
    )
}

#[test]
fn passes_run_in_fixed_order() {
    assert_eq!(
        PASS_ORDER,
        [PassId::Surface, PassId::Bodies, PassId::PureContract]
    );
    assert_eq!(PassId::Surface.index(), 0);
    assert_eq!(PassId::PureContract.index(), 2);
}

#[test]
fn counts_accumulate_monotonically() {
    let program = noisy_program();
    let result = run_passes(Some(&program), &ValidationOptions::default(), &mut NullSink);
    assert!(result.executed);
    assert_eq!(result.diagnostics_emitted_by_pass, [1, 1, 1]);
    assert_eq!(result.diagnostics_after_pass, [1, 2, 3]);
    assert!(diagnostics_after_pass_is_monotonic(
        &result.diagnostics_after_pass
    ));
    assert_eq!(result.diagnostics.len(), 3);
}

#[test]
fn combined_sequence_is_ordered_by_pass() {
    let program = noisy_program();
    let result = run_passes(Some(&program), &ValidationOptions::default(), &mut NullSink);
    insta::assert_snapshot!(result.diagnostics.to_string(), @r"
    error:2:1: duplicate global 'g' [O3S200]
    error:5:3: undefined identifier 'missing' [O3S202]
    error:6:1: pure contract violation: function 'p' declared 'pure' has side effects (cause: impure-callee:touch; cause-site:7:3; detail:global-write@4:3) [O3S215]
    ");
}

#[test]
fn reruns_are_bit_identical() {
    let program = noisy_program();
    let options = ValidationOptions::default();
    let first = run_passes(Some(&program), &options, &mut NullSink);
    let second = run_passes(Some(&program), &options, &mut NullSink);
    assert_eq!(first.diagnostics.lines(), second.diagnostics.lines());
    assert_eq!(first.surface, second.surface);
    assert_eq!(first.handoff, second.handoff);
}

#[test]
fn batches_reach_the_sink() {
    let program = noisy_program();
    let mut sink = BufferSink::new();
    let result = run_passes(Some(&program), &ValidationOptions::default(), &mut sink);
    assert_eq!(sink.diagnostics().lines(), result.diagnostics.lines());
}

#[test]
fn missing_program_yields_empty_unexecuted_result() {
    let result = run_passes(None, &ValidationOptions::default(), &mut NullSink);
    assert!(!result.executed);
    assert!(result.diagnostics.is_empty());
    assert!(!result.surface.built);
    assert_eq!(result.diagnostics_after_pass, [0, 0, 0]);
    assert!(!result.deterministic_handoff);
}

#[test]
fn clean_program_has_deterministic_handoff() {
    let program = program_with(
        vec![global("g", num(1, 1, 5), 1, 1)],
        vec![function("f", vec![], ValueType::I32, vec![ret(ident("g", 2, 20), 2, 13)], 2, 1)],
    );
    let result = run_passes(Some(&program), &ValidationOptions::default(), &mut NullSink);
    assert!(result.diagnostics.is_empty());
    assert!(result.surface.built);
    assert!(result.deterministic_handoff);
    assert_eq!(result.handoff.global_names, vec!["g"]);
}

#[test]
fn analyze_facade_splits_on_diagnostics() {
    let clean = program_with(
        vec![],
        vec![function("f", vec![], ValueType::I32, vec![ret(num(0, 1, 20), 1, 13)], 1, 1)],
    );
    assert!(analyze(&clean, &ValidationOptions::default()).is_ok());

    let noisy = noisy_program();
    let err = analyze(&noisy, &ValidationOptions::default()).unwrap_err();
    let crate::Error::AnalysisFailed(diagnostics) = err;
    assert_eq!(diagnostics.len(), 3);
}
