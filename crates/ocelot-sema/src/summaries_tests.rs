use ocelot_ast::{AssignOp, ForStmt, Stmt, ValueType};

use crate::diagnostics::Diagnostics;
use crate::summaries::{
    MemoryOrder, build_memory_order_summary, build_vector_lowering_summary,
    memory_order_for_operator,
};
use crate::surface::{FunctionInfo, IntegrationSurface, ParamInfo, build_integration_surface};
use crate::test_utils::{
    assign, at, for_clause_assign, function, num, program_with, update, vector_param,
};
use crate::types::SemType;

#[test]
fn operator_mapping_is_total() {
    use AssignOp::*;
    let expectations = [
        (Assign, MemoryOrder::Release),
        (BitOrAssign, MemoryOrder::Release),
        (BitXorAssign, MemoryOrder::Release),
        (BitAndAssign, MemoryOrder::Acquire),
        (ShlAssign, MemoryOrder::Acquire),
        (ShrAssign, MemoryOrder::Acquire),
        (AddAssign, MemoryOrder::AcqRel),
        (SubAssign, MemoryOrder::AcqRel),
        (Increment, MemoryOrder::AcqRel),
        (Decrement, MemoryOrder::AcqRel),
        (MulAssign, MemoryOrder::SeqCst),
        (DivAssign, MemoryOrder::SeqCst),
        (RemAssign, MemoryOrder::SeqCst),
        (Other("?=".into()), MemoryOrder::Unsupported),
    ];
    for (op, order) in expectations {
        assert_eq!(memory_order_for_operator(&op), order, "{op}");
    }
}

#[test]
fn order_names() {
    assert_eq!(MemoryOrder::AcqRel.name(), "acq_rel");
    assert_eq!(MemoryOrder::SeqCst.name(), "seq_cst");
    assert_eq!(MemoryOrder::Unsupported.name(), "unsupported");
}

#[test]
fn summary_counts_every_assignment_including_for_clauses() {
    let program = program_with(
        vec![],
        vec![function(
            "f",
            vec![],
            ValueType::Void,
            vec![
                assign("x", AssignOp::Assign, num(1, 2, 7), 2, 3),
                update("x", AssignOp::Increment, 3, 3),
                Stmt::For(Box::new(ForStmt {
                    init: for_clause_assign("x", AssignOp::MulAssign, num(2, 4, 12), 4, 8),
                    condition: None,
                    step: for_clause_assign("x", AssignOp::ShlAssign, num(1, 4, 24), 4, 20),
                    body: vec![assign("x", AssignOp::BitAndAssign, num(3, 5, 10), 5, 5)],
                    loc: at(4, 3),
                })),
            ],
            1, 1,
        )],
    );
    let summary = build_memory_order_summary(&program);
    assert_eq!(summary.release, 1);
    assert_eq!(summary.acq_rel, 1);
    assert_eq!(summary.seq_cst, 1);
    assert_eq!(summary.acquire, 2);
    assert_eq!(summary.relaxed, 0);
    assert_eq!(summary.unsupported, 0);
    assert!(summary.deterministic);
}

#[test]
fn unsupported_operator_clears_determinism() {
    let program = program_with(
        vec![],
        vec![function(
            "f",
            vec![],
            ValueType::Void,
            vec![assign("x", AssignOp::Other("?=".into()), num(1, 2, 8), 2, 3)],
            1, 1,
        )],
    );
    let summary = build_memory_order_summary(&program);
    assert_eq!(summary.unsupported, 1);
    assert!(!summary.deterministic);
}

#[test]
fn vector_annotations_are_bucketed() {
    let mut f = function("f", vec![], ValueType::I32, vec![], 1, 1);
    f.return_annotation = ocelot_ast::TypeAnnotation::vector(ValueType::I32, "i32", 4);
    f.params = vec![
        vector_param("a", ValueType::Bool, "bool", 2, 1, 10),
        vector_param("b", ValueType::I32, "i32", 16, 1, 20),
    ];
    let program = program_with(vec![], vec![f]);
    let mut diagnostics = Diagnostics::new();
    let surface = build_integration_surface(&program, &mut diagnostics);

    let summary = build_vector_lowering_summary(&surface);
    assert_eq!(summary.return_annotations, 1);
    assert_eq!(summary.param_annotations, 2);
    assert_eq!(summary.bool_annotations, 1);
    assert_eq!(summary.i32_annotations, 2);
    assert_eq!(summary.lane2_annotations, 1);
    assert_eq!(summary.lane4_annotations, 1);
    assert_eq!(summary.lane16_annotations, 1);
    assert_eq!(summary.unsupported_annotations, 0);
    assert!(summary.deterministic);
}

#[test]
fn odd_lane_counts_and_bases_are_unsupported() {
    let mut f = function("f", vec![], ValueType::I32, vec![], 1, 1);
    f.params = vec![vector_param("a", ValueType::Void, "void", 3, 1, 10)];
    let program = program_with(vec![], vec![f]);
    let mut diagnostics = Diagnostics::new();
    let surface = build_integration_surface(&program, &mut diagnostics);

    let summary = build_vector_lowering_summary(&surface);
    assert_eq!(summary.param_annotations, 1);
    // Both the base type and the lane count fall in the unsupported bucket.
    assert_eq!(summary.unsupported_annotations, 2);
    assert!(!summary.deterministic);
}

#[test]
fn malformed_function_entries_clear_determinism() {
    let mut surface = IntegrationSurface::default();
    surface.functions.insert(
        "broken".to_string(),
        FunctionInfo {
            arity: 2,
            params: vec![ParamInfo {
                ty: SemType::scalar(ValueType::I32),
                has_invalid_type_suffix: false,
            }],
            return_type: SemType::scalar(ValueType::I32),
            has_definition: true,
            is_pure_annotation: false,
        },
    );
    let summary = build_vector_lowering_summary(&surface);
    assert!(!summary.deterministic);
    assert_eq!(summary.param_annotations, 0);
}
