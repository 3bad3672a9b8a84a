//! Pass 2: lexical scoping and type validation of function bodies.
//!
//! For every function declaration this pass validates type-suffix
//! annotations and parameter uniqueness; for every definition it then walks
//! the body with a scope stack, types each expression and statement, and
//! finally proves that a non-void function returns on every path.

mod bindings;
mod validator;


use ocelot_ast::{Program, ValueType};

use crate::ValidationOptions;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::static_analysis::block_always_returns;
use crate::surface::{
    IntegrationSurface, validate_function_param_suffixes, validate_function_return_suffixes,
};
use crate::types::SemType;

use validator::{BodyValidator, Scope};

/// Validate every function body against the surface.
pub fn validate_bodies(
    program: &Program,
    surface: &IntegrationSurface,
    options: &ValidationOptions,
    diagnostics: &mut Diagnostics,
) {
    let global_bindings = bindings::collect_global_static_bindings(program);

    for function in &program.functions {
        validate_function_return_suffixes(function, diagnostics);
        validate_function_param_suffixes(function, diagnostics);

        let mut param_scope = Scope::new();
        for param in &function.params {
            if param_scope.contains_key(&param.name) {
                diagnostics.report(
                    param.loc,
                    DiagnosticCode::DuplicateDeclaration,
                    format!("duplicate parameter '{}'", param.name),
                );
            } else {
                param_scope.insert(
                    param.name.clone(),
                    SemType::from_annotation(&param.annotation),
                );
            }
        }

        if function.is_prototype {
            continue;
        }

        let expected_return = SemType::from_annotation(&function.return_annotation);
        let mut validator = BodyValidator::new(
            surface,
            options.max_message_send_args,
            &expected_return,
            &function.name,
            param_scope,
            diagnostics,
        );
        validator.validate_block(&function.body);

        if expected_return == SemType::scalar(ValueType::Void) {
            continue;
        }
        let static_bindings = bindings::collect_function_static_bindings(function, &global_bindings);
        if !block_always_returns(&function.body, &static_bindings) {
            diagnostics.report(
                function.loc,
                DiagnosticCode::MissingReturn,
                format!("missing return path in function '{}'", function.name),
            );
        }
    }
}
