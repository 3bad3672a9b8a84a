//! The sorted, self-contained type-metadata projection of the surface.
//!
//! Downstream consumers read the handoff instead of the surface: every map is
//! flattened into a vector sorted lexicographically by name (methods by
//! selector), and the linkage summary is recomputed from the sorted data so
//! the handoff stands alone. [`is_deterministic_handoff`] re-checks all of
//! that structure after the fact.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::surface::{FunctionInfo, IntegrationSurface, LinkageSummary, MethodInfo};

/// One function entry, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    pub name: String,
    pub info: FunctionInfo,
}

/// One method entry, sorted by selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub selector: String,
    pub info: MethodInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMetadata {
    pub name: String,
    pub super_name: Option<String>,
    pub methods: Vec<MethodMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationMetadata {
    pub name: String,
    pub has_matching_interface: bool,
    pub methods: Vec<MethodMetadata>,
}

/// The complete handoff. Purely data; holds no references to the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadataHandoff {
    pub global_names: Vec<String>,
    pub functions: Vec<FunctionMetadata>,
    pub interfaces: Vec<InterfaceMetadata>,
    pub implementations: Vec<ImplementationMetadata>,
    pub linkage_summary: LinkageSummary,
}

fn sorted_methods(methods: &IndexMap<String, MethodInfo>) -> Vec<MethodMetadata> {
    let mut sorted: Vec<MethodMetadata> = methods
        .iter()
        .map(|(selector, info)| MethodMetadata {
            selector: selector.clone(),
            info: info.clone(),
        })
        .collect();
    sorted.sort_by(|a, b| a.selector.cmp(&b.selector));
    sorted
}

/// Project `surface` into the sorted handoff.
pub fn build_type_metadata_handoff(surface: &IntegrationSurface) -> TypeMetadataHandoff {
    let mut global_names: Vec<String> = surface.globals.keys().cloned().collect();
    global_names.sort();

    let mut functions: Vec<FunctionMetadata> = surface
        .functions
        .iter()
        .map(|(name, info)| FunctionMetadata {
            name: name.clone(),
            info: info.clone(),
        })
        .collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));

    let mut interfaces: Vec<InterfaceMetadata> = surface
        .interfaces
        .iter()
        .map(|(name, info)| InterfaceMetadata {
            name: name.clone(),
            super_name: info.super_name.clone(),
            methods: sorted_methods(&info.methods),
        })
        .collect();
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));

    let mut implementations: Vec<ImplementationMetadata> = surface
        .implementations
        .iter()
        .map(|(name, info)| ImplementationMetadata {
            name: name.clone(),
            has_matching_interface: info.has_matching_interface,
            methods: sorted_methods(&info.methods),
        })
        .collect();
    implementations.sort_by(|a, b| a.name.cmp(&b.name));

    // Recompute the summary from the sorted projection so the handoff is
    // self-consistent even if the surface summary was stale.
    let mut summary = surface.linkage_summary;
    summary.resolved_interfaces = interfaces.len();
    summary.resolved_implementations = implementations.len();
    summary.interface_method_symbols = interfaces
        .iter()
        .map(|interface| interface.methods.len())
        .sum();
    summary.implementation_method_symbols = implementations
        .iter()
        .map(|implementation| implementation.methods.len())
        .sum();

    summary.linked_implementation_symbols = 0;
    let interfaces_by_name: HashMap<&str, &InterfaceMetadata> = interfaces
        .iter()
        .map(|interface| (interface.name.as_str(), interface))
        .collect();
    for implementation in &implementations {
        if !implementation.has_matching_interface {
            continue;
        }
        let Some(interface) = interfaces_by_name.get(implementation.name.as_str()) else {
            continue;
        };
        for method in &implementation.methods {
            let Some(interface_method) = interface
                .methods
                .iter()
                .find(|candidate| candidate.selector == method.selector)
            else {
                continue;
            };
            if interface_method.info.signature_matches(&method.info) {
                summary.linked_implementation_symbols += 1;
            }
        }
    }
    summary.deterministic = summary.deterministic
        && summary.linked_implementation_symbols <= summary.implementation_method_symbols
        && summary.linked_implementation_symbols <= summary.interface_method_symbols;

    TypeMetadataHandoff {
        global_names,
        functions,
        interfaces,
        implementations,
        linkage_summary: summary,
    }
}

fn methods_deterministic(methods: &[MethodMetadata]) -> bool {
    methods.is_sorted_by(|a, b| a.selector <= b.selector)
        && methods.iter().all(|method| method.info.is_well_formed())
}

/// Check every structural invariant of the handoff: sorted keys, parameter
/// vectors covering arities, and a linkage summary that matches the data.
pub fn is_deterministic_handoff(handoff: &TypeMetadataHandoff) -> bool {
    if !handoff.global_names.is_sorted() {
        return false;
    }
    if !handoff.functions.is_sorted_by(|a, b| a.name <= b.name) {
        return false;
    }
    if !handoff.interfaces.is_sorted_by(|a, b| a.name <= b.name) {
        return false;
    }
    if !handoff.implementations.is_sorted_by(|a, b| a.name <= b.name) {
        return false;
    }

    let functions_ok = handoff
        .functions
        .iter()
        .all(|function| function.info.is_well_formed());
    let interfaces_ok = handoff
        .interfaces
        .iter()
        .all(|interface| methods_deterministic(&interface.methods));
    let implementations_ok = handoff
        .implementations
        .iter()
        .all(|implementation| methods_deterministic(&implementation.methods));
    if !functions_ok || !interfaces_ok || !implementations_ok {
        return false;
    }

    let interface_method_symbols: usize = handoff
        .interfaces
        .iter()
        .map(|interface| interface.methods.len())
        .sum();
    let implementation_method_symbols: usize = handoff
        .implementations
        .iter()
        .map(|implementation| implementation.methods.len())
        .sum();

    let summary = &handoff.linkage_summary;
    summary.deterministic
        && summary.resolved_interfaces == handoff.interfaces.len()
        && summary.resolved_implementations == handoff.implementations.len()
        && summary.interface_method_symbols == interface_method_symbols
        && summary.implementation_method_symbols == implementation_method_symbols
        && summary.linked_implementation_symbols <= summary.implementation_method_symbols
        && summary.linked_implementation_symbols <= summary.interface_method_symbols
}
