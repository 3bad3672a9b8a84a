//! Pass 1: the declaration-level integration surface.
//!
//! Collects globals, functions, interfaces, and implementations in source
//! order, resolves duplicate/redeclaration/compatibility rules, folds global
//! initializers, and links implementation methods to their interface
//! declarations. The surface is built once and read-only for later passes.

mod builder;
mod suffixes;

#[cfg(test)]
mod builder_tests;

pub use builder::build_integration_surface;
pub(crate) use suffixes::{validate_function_param_suffixes, validate_function_return_suffixes};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use ocelot_ast::ValueType;

use crate::types::SemType;

/// Parameter shape recorded in the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub ty: SemType,
    /// True when any declaration carried an unsupported type suffix at this
    /// position. The body validator skips argument checks against it.
    pub has_invalid_type_suffix: bool,
}

/// Declaration-level summary of one function name, merged across all of its
/// declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub arity: usize,
    pub params: Vec<ParamInfo>,
    pub return_type: SemType,
    /// True once a non-prototype declaration was seen.
    pub has_definition: bool,
    /// OR across all declarations of the name.
    pub is_pure_annotation: bool,
}

impl FunctionInfo {
    /// The parameter vector covers the declared arity.
    pub fn is_well_formed(&self) -> bool {
        self.params.len() == self.arity
    }
}

/// Summary of one method selector within an interface or implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub arity: usize,
    pub params: Vec<ParamInfo>,
    pub return_type: SemType,
    pub is_class_method: bool,
    /// The declaration carried a body.
    pub has_definition: bool,
}

impl MethodInfo {
    pub fn is_well_formed(&self) -> bool {
        self.params.len() == self.arity
    }

    /// Signature compatibility between an interface method and its
    /// implementation: arity, return type, per-parameter types (including
    /// vector shape), and class-method-ness all agree.
    pub fn signature_matches(&self, other: &MethodInfo) -> bool {
        if self.arity != other.arity
            || self.return_type != other.return_type
            || self.is_class_method != other.is_class_method
        {
            return false;
        }
        if self.params.len() < self.arity || other.params.len() < other.arity {
            return false;
        }
        (0..self.arity).all(|i| self.params[i].ty == other.params[i].ty)
    }
}

/// One interface entry: optional super name plus methods keyed by selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub super_name: Option<String>,
    pub methods: IndexMap<String, MethodInfo>,
}

/// One implementation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationInfo {
    /// An interface of the same name exists.
    pub has_matching_interface: bool,
    pub methods: IndexMap<String, MethodInfo>,
}

/// Structural summary of interface ↔ implementation linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageSummary {
    pub declared_interfaces: usize,
    pub declared_implementations: usize,
    pub resolved_interfaces: usize,
    pub resolved_implementations: usize,
    pub interface_method_symbols: usize,
    pub implementation_method_symbols: usize,
    /// Implementation methods that matched a compatible interface method.
    pub linked_implementation_symbols: usize,
    pub deterministic: bool,
}

impl Default for LinkageSummary {
    fn default() -> Self {
        Self {
            declared_interfaces: 0,
            declared_implementations: 0,
            resolved_interfaces: 0,
            resolved_implementations: 0,
            interface_method_symbols: 0,
            implementation_method_symbols: 0,
            linked_implementation_symbols: 0,
            deterministic: true,
        }
    }
}

/// The integration surface: the program's declarations resolved into maps in
/// source order, plus the linkage summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSurface {
    /// Every global is typed `I32`.
    pub globals: IndexMap<String, ValueType>,
    pub functions: IndexMap<String, FunctionInfo>,
    pub interfaces: IndexMap<String, InterfaceInfo>,
    pub implementations: IndexMap<String, ImplementationInfo>,
    pub linkage_summary: LinkageSummary,
    /// True after successful construction.
    pub built: bool,
}
