//! Integration surface construction.

use indexmap::map::Entry;
use ocelot_ast::{FunctionDecl, MethodDecl, Program, ValueType};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::eval::{GlobalValues, eval_const_expr};
use crate::types::SemType;

use super::suffixes::{
    MethodOwner, annotation_has_invalid_suffix, method_selector_name,
    validate_method_param_suffixes, validate_method_return_suffixes,
};
use super::{
    FunctionInfo, ImplementationInfo, IntegrationSurface, InterfaceInfo, LinkageSummary,
    MethodInfo, ParamInfo,
};

fn function_info_from_decl(function: &FunctionDecl) -> FunctionInfo {
    FunctionInfo {
        arity: function.params.len(),
        params: function
            .params
            .iter()
            .map(|param| ParamInfo {
                ty: SemType::from_annotation(&param.annotation),
                has_invalid_type_suffix: annotation_has_invalid_suffix(&param.annotation),
            })
            .collect(),
        return_type: SemType::from_annotation(&function.return_annotation),
        has_definition: !function.is_prototype,
        is_pure_annotation: function.is_pure,
    }
}

fn method_info_from_decl(method: &MethodDecl) -> MethodInfo {
    MethodInfo {
        arity: method.params.len(),
        params: method
            .params
            .iter()
            .map(|param| ParamInfo {
                ty: SemType::from_annotation(&param.annotation),
                has_invalid_type_suffix: annotation_has_invalid_suffix(&param.annotation),
            })
            .collect(),
        return_type: SemType::from_annotation(&method.return_annotation),
        is_class_method: method.is_class_method,
        has_definition: method.has_body(),
    }
}

/// Redeclaration compatibility: arity, return type, and every parameter type
/// (including vector shape) agree with the entry already in the surface.
fn signatures_compatible(existing: &FunctionInfo, function: &FunctionDecl) -> bool {
    if existing.arity != function.params.len()
        || existing.return_type != SemType::from_annotation(&function.return_annotation)
    {
        return false;
    }
    function.params.iter().enumerate().all(|(i, param)| {
        existing
            .params
            .get(i)
            .is_some_and(|entry| entry.ty == SemType::from_annotation(&param.annotation))
    })
}

/// Build the surface from `program`, in source order: globals, then
/// functions, then interfaces, then implementations.
pub fn build_integration_surface(
    program: &Program,
    diagnostics: &mut Diagnostics,
) -> IntegrationSurface {
    let mut surface = IntegrationSurface::default();
    let mut summary = LinkageSummary {
        declared_interfaces: program.interfaces.len(),
        declared_implementations: program.implementations.len(),
        ..LinkageSummary::default()
    };
    let mut resolved_globals = GlobalValues::new();

    for global in &program.globals {
        let duplicate = surface.globals.contains_key(&global.name);
        if duplicate {
            diagnostics.report(
                global.loc,
                DiagnosticCode::DuplicateSymbol,
                format!("duplicate global '{}'", global.name),
            );
        } else {
            surface.globals.insert(global.name.clone(), ValueType::I32);
        }
        match eval_const_expr(&global.value, Some(&resolved_globals)) {
            None => diagnostics.report(
                global.loc,
                DiagnosticCode::NonConstantInitializer,
                "global initializer must be constant expression",
            ),
            Some(value) if !duplicate => {
                resolved_globals.insert(global.name.clone(), value);
            }
            Some(_) => {}
        }
    }

    for function in &program.functions {
        if surface.globals.contains_key(&function.name) {
            diagnostics.report(
                function.loc,
                DiagnosticCode::DuplicateSymbol,
                format!("duplicate function '{}'", function.name),
            );
            continue;
        }

        let existing = match surface.functions.entry(function.name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(function_info_from_decl(function));
                continue;
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        if !signatures_compatible(existing, function) {
            diagnostics.report(
                function.loc,
                DiagnosticCode::TypeMismatch,
                format!(
                    "type mismatch: incompatible function signature for '{}'",
                    function.name
                ),
            );
            continue;
        }

        for (info, param) in existing.params.iter_mut().zip(&function.params) {
            info.has_invalid_type_suffix |= annotation_has_invalid_suffix(&param.annotation);
        }
        existing.is_pure_annotation |= function.is_pure;

        if !function.is_prototype {
            if existing.has_definition {
                diagnostics.report(
                    function.loc,
                    DiagnosticCode::DuplicateSymbol,
                    format!("duplicate function '{}'", function.name),
                );
            } else {
                existing.has_definition = true;
            }
        }
    }

    for interface in &program.interfaces {
        if surface.interfaces.contains_key(&interface.name) {
            diagnostics.report(
                interface.loc,
                DiagnosticCode::DuplicateSymbol,
                format!("duplicate interface '{}'", interface.name),
            );
            continue;
        }

        let mut info = InterfaceInfo {
            super_name: interface.super_name.clone(),
            methods: Default::default(),
        };
        for method in &interface.methods {
            let owner = MethodOwner::Interface(&interface.name);
            validate_method_return_suffixes(method, owner, diagnostics);
            validate_method_param_suffixes(method, owner, diagnostics);

            let selector = method_selector_name(method);
            if method.has_body() {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "type mismatch: interface selector '{selector}' in '{}' must not define a body",
                        interface.name
                    ),
                );
            }
            if info.methods.contains_key(selector) {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::DuplicateSymbol,
                    format!(
                        "duplicate interface selector '{selector}' in interface '{}'",
                        interface.name
                    ),
                );
                continue;
            }
            info.methods
                .insert(selector.to_string(), method_info_from_decl(method));
            summary.interface_method_symbols += 1;
        }
        surface.interfaces.insert(interface.name.clone(), info);
    }

    for implementation in &program.implementations {
        if surface.implementations.contains_key(&implementation.name) {
            diagnostics.report(
                implementation.loc,
                DiagnosticCode::DuplicateSymbol,
                format!("duplicate implementation '{}'", implementation.name),
            );
            continue;
        }

        let matching_interface = surface.interfaces.get(&implementation.name);
        if matching_interface.is_none() {
            diagnostics.report(
                implementation.loc,
                DiagnosticCode::TypeMismatch,
                format!(
                    "type mismatch: missing interface declaration for implementation '{}'",
                    implementation.name
                ),
            );
        }

        let mut info = ImplementationInfo {
            has_matching_interface: matching_interface.is_some(),
            methods: Default::default(),
        };
        for method in &implementation.methods {
            let owner = MethodOwner::Implementation(&implementation.name);
            validate_method_return_suffixes(method, owner, diagnostics);
            validate_method_param_suffixes(method, owner, diagnostics);

            let selector = method_selector_name(method);
            if !method.has_body() {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "type mismatch: implementation selector '{selector}' in '{}' must define a body",
                        implementation.name
                    ),
                );
            }
            if info.methods.contains_key(selector) {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::DuplicateSymbol,
                    format!(
                        "duplicate implementation selector '{selector}' in implementation '{}'",
                        implementation.name
                    ),
                );
                continue;
            }
            let method_info = method_info_from_decl(method);
            summary.implementation_method_symbols += 1;

            let Some(interface) = matching_interface else {
                info.methods.insert(selector.to_string(), method_info);
                continue;
            };
            let Some(interface_method) = interface.methods.get(selector) else {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "type mismatch: implementation selector '{selector}' in '{}' is not declared in interface",
                        implementation.name
                    ),
                );
                info.methods.insert(selector.to_string(), method_info);
                continue;
            };
            if !interface_method.signature_matches(&method_info) {
                diagnostics.report(
                    method.loc,
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "type mismatch: incompatible method signature for selector '{selector}' in implementation '{}'",
                        implementation.name
                    ),
                );
                info.methods.insert(selector.to_string(), method_info);
                continue;
            }
            info.methods.insert(selector.to_string(), method_info);
            summary.linked_implementation_symbols += 1;
        }
        surface
            .implementations
            .insert(implementation.name.clone(), info);
    }

    summary.resolved_interfaces = surface.interfaces.len();
    summary.resolved_implementations = surface.implementations.len();
    summary.deterministic = summary.linked_implementation_symbols
        <= summary.implementation_method_symbols
        && summary.linked_implementation_symbols <= summary.interface_method_symbols;
    surface.linkage_summary = summary;
    surface.built = true;
    surface
}
