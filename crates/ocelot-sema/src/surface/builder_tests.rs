use ocelot_ast::{
    BinaryOp, FuncParam, ImplementationDecl, InterfaceDecl, MethodDecl, Program, SuffixToken,
    TypeAnnotation, ValueType,
};

use crate::diagnostics::Diagnostics;
use crate::surface::build_integration_surface;
use crate::test_utils::{
    at, binary, function, global, ident, num, param, program_with, prototype, ret,
};

fn build(program: &Program) -> (crate::surface::IntegrationSurface, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let surface = build_integration_surface(program, &mut diagnostics);
    (surface, diagnostics)
}

fn method(
    selector: &str,
    params: Vec<FuncParam>,
    return_type: ValueType,
    with_body: bool,
    line: u32,
    column: u32,
) -> MethodDecl {
    MethodDecl {
        selector: selector.to_string(),
        params,
        return_annotation: TypeAnnotation::scalar(return_type),
        is_class_method: false,
        body: with_body.then(Vec::new),
        loc: at(line, column),
    }
}

fn interface(name: &str, methods: Vec<MethodDecl>, line: u32) -> InterfaceDecl {
    InterfaceDecl {
        name: name.to_string(),
        super_name: None,
        methods,
        loc: at(line, 1),
    }
}

fn implementation(name: &str, methods: Vec<MethodDecl>, line: u32) -> ImplementationDecl {
    ImplementationDecl {
        name: name.to_string(),
        methods,
        loc: at(line, 1),
    }
}

#[test]
fn duplicate_global_keeps_first_entry() {
    let program = program_with(
        vec![
            global("g", num(1, 1, 9), 1, 1),
            global("g", num(2, 2, 9), 2, 1),
        ],
        vec![],
    );
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:2:1: duplicate global 'g' [O3S200]"]
    );
    assert_eq!(surface.globals.len(), 1);
    assert!(surface.built);
}

#[test]
fn incompatible_signature_is_rejected() {
    let program = program_with(
        vec![],
        vec![
            prototype("f", vec![param("x", ValueType::I32, 1, 7)], ValueType::I32, 1, 1),
            function(
                "f",
                vec![param("x", ValueType::Bool, 2, 7)],
                ValueType::I32,
                vec![ret(num(0, 2, 20), 2, 20)],
                2, 1,
            ),
        ],
    );
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:2:1: type mismatch: incompatible function signature for 'f' [O3S206]"]
    );
    // The incompatible redeclaration leaves the original entry untouched.
    assert!(!surface.functions["f"].has_definition);
}

#[test]
fn duplicate_global_then_incompatible_function() {
    let program = program_with(
        vec![
            global("g", num(1, 1, 5), 1, 5),
            global("g", num(2, 2, 5), 2, 5),
        ],
        vec![
            prototype("f", vec![param("x", ValueType::I32, 3, 7)], ValueType::I32, 3, 1),
            function(
                "f",
                vec![param("x", ValueType::Bool, 4, 7)],
                ValueType::I32,
                vec![ret(num(0, 4, 24), 4, 24)],
                4, 1,
            ),
        ],
    );
    let (_, diagnostics) = build(&program);
    insta::assert_snapshot!(diagnostics.to_string(), @r"
    error:2:5: duplicate global 'g' [O3S200]
    error:4:1: type mismatch: incompatible function signature for 'f' [O3S206]
    ");
}

#[test]
fn compatible_redeclaration_merges_flags() {
    let mut pure_proto = prototype("f", vec![param("x", ValueType::I32, 1, 11)], ValueType::I32, 1, 1);
    pure_proto.is_pure = true;
    let program = program_with(
        vec![],
        vec![
            pure_proto,
            function(
                "f",
                vec![param("x", ValueType::I32, 2, 7)],
                ValueType::I32,
                vec![ret(num(0, 2, 20), 2, 20)],
                2, 1,
            ),
        ],
    );
    let (surface, diagnostics) = build(&program);
    assert!(diagnostics.is_empty());
    let info = &surface.functions["f"];
    assert!(info.has_definition);
    assert!(info.is_pure_annotation);
}

#[test]
fn second_definition_is_a_duplicate() {
    let program = program_with(
        vec![],
        vec![
            function("f", vec![], ValueType::I32, vec![ret(num(0, 1, 14), 1, 14)], 1, 1),
            function("f", vec![], ValueType::I32, vec![ret(num(1, 2, 14), 2, 14)], 2, 1),
        ],
    );
    let (_, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:2:1: duplicate function 'f' [O3S200]"]
    );
}

#[test]
fn function_name_may_not_collide_with_global() {
    let program = program_with(
        vec![global("f", num(1, 1, 9), 1, 1)],
        vec![function("f", vec![], ValueType::I32, vec![ret(num(0, 2, 14), 2, 14)], 2, 1)],
    );
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:2:1: duplicate function 'f' [O3S200]"]
    );
    assert!(!surface.functions.contains_key("f"));
}

#[test]
fn non_constant_initializer_is_reported() {
    let program = program_with(
        vec![
            global("a", ident("missing", 1, 9), 1, 1),
            global("b", binary(BinaryOp::Div, num(1, 2, 9), num(0, 2, 13), 2, 11), 2, 1),
        ],
        vec![],
    );
    let (_, diagnostics) = build(&program);
    insta::assert_snapshot!(diagnostics.to_string(), @r"
    error:1:1: global initializer must be constant expression [O3S210]
    error:2:1: global initializer must be constant expression [O3S210]
    ");
}

#[test]
fn later_globals_fold_against_earlier_ones() {
    let program = program_with(
        vec![
            global("a", num(3, 1, 9), 1, 1),
            global("b", binary(BinaryOp::Mul, ident("a", 2, 9), num(2, 2, 13), 2, 11), 2, 1),
        ],
        vec![],
    );
    let (_, diagnostics) = build(&program);
    assert!(diagnostics.is_empty());
}

#[test]
fn interface_method_must_not_define_a_body() {
    let program = Program {
        interfaces: vec![interface("Widget", vec![method("draw", vec![], ValueType::Void, true, 2, 3)], 1)],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:2:3: type mismatch: interface selector 'draw' in 'Widget' must not define a body [O3S206]"]
    );
    // The method still lands in the surface.
    assert!(surface.interfaces["Widget"].methods.contains_key("draw"));
}

#[test]
fn implementation_requires_an_interface() {
    let program = Program {
        implementations: vec![implementation(
            "Widget",
            vec![method("draw", vec![], ValueType::Void, true, 2, 3)],
            1,
        )],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:1:1: type mismatch: missing interface declaration for implementation 'Widget' [O3S206]"]
    );
    assert!(!surface.implementations["Widget"].has_matching_interface);
    assert_eq!(surface.linkage_summary.linked_implementation_symbols, 0);
}

#[test]
fn implementation_method_must_define_a_body() {
    let program = Program {
        interfaces: vec![interface("Widget", vec![method("draw", vec![], ValueType::Void, false, 2, 3)], 1)],
        implementations: vec![implementation(
            "Widget",
            vec![method("draw", vec![], ValueType::Void, false, 5, 3)],
            4,
        )],
        ..Program::default()
    };
    let (_, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:5:3: type mismatch: implementation selector 'draw' in 'Widget' must define a body [O3S206]"]
    );
}

#[test]
fn selector_missing_from_interface_is_rejected() {
    let program = Program {
        interfaces: vec![interface("Widget", vec![method("draw", vec![], ValueType::Void, false, 2, 3)], 1)],
        implementations: vec![implementation(
            "Widget",
            vec![method("render", vec![], ValueType::Void, true, 5, 3)],
            4,
        )],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:5:3: type mismatch: implementation selector 'render' in 'Widget' is not declared in interface [O3S206]"]
    );
    assert_eq!(surface.linkage_summary.linked_implementation_symbols, 0);
}

#[test]
fn incompatible_method_signature_is_rejected() {
    let program = Program {
        interfaces: vec![interface(
            "Widget",
            vec![method("scale", vec![param("factor", ValueType::I32, 2, 12)], ValueType::Void, false, 2, 3)],
            1,
        )],
        implementations: vec![implementation(
            "Widget",
            vec![method("scale", vec![param("factor", ValueType::Bool, 5, 12)], ValueType::Void, true, 5, 3)],
            4,
        )],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:5:3: type mismatch: incompatible method signature for selector 'scale' in implementation 'Widget' [O3S206]"]
    );
    assert_eq!(surface.linkage_summary.linked_implementation_symbols, 0);
}

#[test]
fn duplicate_selector_within_interface() {
    let program = Program {
        interfaces: vec![interface(
            "Widget",
            vec![
                method("draw", vec![], ValueType::Void, false, 2, 3),
                method("draw", vec![], ValueType::Void, false, 3, 3),
            ],
            1,
        )],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert_eq!(
        diagnostics.lines(),
        vec!["error:3:3: duplicate interface selector 'draw' in interface 'Widget' [O3S200]"]
    );
    assert_eq!(surface.linkage_summary.interface_method_symbols, 1);
}

#[test]
fn linkage_summary_counts_linked_methods() {
    let program = Program {
        interfaces: vec![interface(
            "Widget",
            vec![
                method("draw", vec![], ValueType::Void, false, 2, 3),
                method("size", vec![], ValueType::I32, false, 3, 3),
            ],
            1,
        )],
        implementations: vec![implementation(
            "Widget",
            vec![
                method("draw", vec![], ValueType::Void, true, 6, 3),
                method("size", vec![], ValueType::I32, true, 7, 3),
            ],
            5,
        )],
        ..Program::default()
    };
    let (surface, diagnostics) = build(&program);
    assert!(diagnostics.is_empty());
    let summary = surface.linkage_summary;
    assert_eq!(summary.declared_interfaces, 1);
    assert_eq!(summary.declared_implementations, 1);
    assert_eq!(summary.resolved_interfaces, 1);
    assert_eq!(summary.resolved_implementations, 1);
    assert_eq!(summary.interface_method_symbols, 2);
    assert_eq!(summary.implementation_method_symbols, 2);
    assert_eq!(summary.linked_implementation_symbols, 2);
    assert!(summary.deterministic);
}

#[test]
fn invalid_suffix_bits_merge_across_declarations() {
    let first = prototype("f", vec![param("x", ValueType::I32, 1, 7)], ValueType::I32, 1, 1);
    let mut second = prototype("f", vec![param("x", ValueType::I32, 2, 7)], ValueType::I32, 2, 1);
    second.params[0].annotation.suffixes.pointer_declarators.push(SuffixToken {
        text: "*".to_string(),
        loc: at(2, 11),
    });
    let program = program_with(vec![], vec![first, second]);
    let (surface, diagnostics) = build(&program);
    // Suffix diagnostics are the body pass's job; the surface only records the bit.
    assert!(diagnostics.is_empty());
    assert!(surface.functions["f"].params[0].has_invalid_type_suffix);
}
