//! Unsupported type-suffix detection and reporting.
//!
//! Generic suffixes (`<...>`), pointer declarators, and nullability tokens
//! are legal only on `id`/`Class`/`instancetype` annotations. Violations are
//! reported individually at each token's own location.

use std::fmt;

use ocelot_ast::{FuncParam, FunctionDecl, MethodDecl, SuffixToken, TypeAnnotation};

use crate::diagnostics::{DiagnosticCode, Diagnostics};

/// Whether the annotation carries any suffix it does not support.
pub(crate) fn annotation_has_invalid_suffix(annotation: &TypeAnnotation) -> bool {
    if annotation.object_spelling.is_some() {
        return false;
    }
    annotation.suffixes.generic.is_some()
        || !annotation.suffixes.pointer_declarators.is_empty()
        || !annotation.suffixes.nullability.is_empty()
}

/// Selector for reporting, `<unknown>` when the parser recovered none.
pub(crate) fn method_selector_name(method: &MethodDecl) -> &str {
    if method.selector.is_empty() {
        "<unknown>"
    } else {
        &method.selector
    }
}

fn generic_suffix_text(token: &SuffixToken) -> &str {
    if token.text.is_empty() { "<...>" } else { &token.text }
}

pub(crate) fn validate_function_param_suffixes(
    function: &FunctionDecl,
    diagnostics: &mut Diagnostics,
) {
    for param in &function.params {
        validate_param_suffixes(param, diagnostics, |what, token_text| {
            format!(
                "type mismatch: {what} '{token_text}' is unsupported for \
                 non-id/Class/instancetype parameter annotation '{}'",
                param.name
            )
        });
    }
}

pub(crate) fn validate_function_return_suffixes(
    function: &FunctionDecl,
    diagnostics: &mut Diagnostics,
) {
    validate_return_suffixes(&function.return_annotation, diagnostics, |what, token_text| {
        format!(
            "type mismatch: unsupported function return type {what} '{token_text}' for \
             non-id/Class/instancetype return annotation in function '{}'",
            function.name
        )
    });
}

/// Interfaces and implementations share the method suffix rules; the owner
/// kind only changes the report text.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MethodOwner<'a> {
    Interface(&'a str),
    Implementation(&'a str),
}

impl MethodOwner<'_> {
    fn kind(&self) -> &'static str {
        match self {
            MethodOwner::Interface(_) => "interface",
            MethodOwner::Implementation(_) => "implementation",
        }
    }

    fn name(&self) -> &str {
        match self {
            MethodOwner::Interface(name) | MethodOwner::Implementation(name) => name,
        }
    }
}

impl fmt::Display for MethodOwner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())
    }
}

pub(crate) fn validate_method_param_suffixes(
    method: &MethodDecl,
    owner: MethodOwner<'_>,
    diagnostics: &mut Diagnostics,
) {
    let selector = method_selector_name(method);
    for param in &method.params {
        validate_param_suffixes(param, diagnostics, |what, token_text| {
            format!(
                "type mismatch: {what} '{token_text}' is unsupported for \
                 selector '{selector}' parameter '{}' in {owner}",
                param.name
            )
        });
    }
}

pub(crate) fn validate_method_return_suffixes(
    method: &MethodDecl,
    owner: MethodOwner<'_>,
    diagnostics: &mut Diagnostics,
) {
    let selector = method_selector_name(method);
    validate_return_suffixes(&method.return_annotation, diagnostics, |what, token_text| {
        format!("type mismatch: unsupported method return type {what} '{token_text}' for selector '{selector}' in {owner}")
    });
}

fn validate_param_suffixes(
    param: &FuncParam,
    diagnostics: &mut Diagnostics,
    message: impl Fn(&str, &str) -> String,
) {
    let annotation = &param.annotation;
    if annotation.object_spelling.is_some() {
        return;
    }
    if let Some(token) = &annotation.suffixes.generic {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("generic parameter type suffix", generic_suffix_text(token)),
        );
    }
    for token in &annotation.suffixes.pointer_declarators {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("pointer parameter type declarator", &token.text),
        );
    }
    for token in &annotation.suffixes.nullability {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("nullability parameter type suffix", &token.text),
        );
    }
}

fn validate_return_suffixes(
    annotation: &TypeAnnotation,
    diagnostics: &mut Diagnostics,
    message: impl Fn(&str, &str) -> String,
) {
    if annotation.object_spelling.is_some() {
        return;
    }
    if let Some(token) = &annotation.suffixes.generic {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("suffix", generic_suffix_text(token)),
        );
    }
    for token in &annotation.suffixes.pointer_declarators {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("declarator", &token.text),
        );
    }
    for token in &annotation.suffixes.nullability {
        diagnostics.report(
            token.loc,
            DiagnosticCode::TypeMismatch,
            message("suffix", &token.text),
        );
    }
}
