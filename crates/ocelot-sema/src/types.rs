//! The semantic type model shared by the analyses.

use std::fmt;

use serde::{Deserialize, Serialize};

use ocelot_ast::{TypeAnnotation, ValueType, VectorShape};

/// A resolved semantic type: base value type plus optional vector shape.
///
/// Derived equality implements the type-equality rule: base types must match,
/// and when both sides are vectors the base spelling and lane count must match
/// as well. `Unknown` compares equal to itself structurally, but analyses must
/// treat it as incomparable — diagnostics fire only when both operands are
/// known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemType {
    pub base: ValueType,
    pub vector: Option<VectorShape>,
}

impl SemType {
    pub fn scalar(base: ValueType) -> Self {
        Self { base, vector: None }
    }

    pub fn unknown() -> Self {
        Self::scalar(ValueType::Unknown)
    }

    pub fn from_annotation(annotation: &TypeAnnotation) -> Self {
        Self {
            base: annotation.ty,
            vector: annotation.vector.clone(),
        }
    }

    pub fn is_vector(&self) -> bool {
        self.vector.is_some()
    }

    /// Scalar `Unknown`; a vector with an unknown base is not "unknown".
    pub fn is_unknown(&self) -> bool {
        self.vector.is_none() && self.base == ValueType::Unknown
    }

    /// Scalar `Bool` or `I32` — valid in condition position.
    pub fn is_bool_compatible(&self) -> bool {
        self.vector.is_none() && matches!(self.base, ValueType::Bool | ValueType::I32)
    }

    /// Scalar `I32` or `Bool` — valid as message receiver or argument.
    pub fn is_i32_compatible(&self) -> bool {
        self.vector.is_none() && matches!(self.base, ValueType::I32 | ValueType::Bool)
    }

    /// Scalar of known numeric/boolean base, the shapes assignment coercions
    /// apply to.
    pub fn is_known_scalar(&self) -> bool {
        self.vector.is_none() && matches!(self.base, ValueType::I32 | ValueType::Bool)
    }

    /// Scalar of exactly `base`.
    pub fn is_scalar_base(&self, base: ValueType) -> bool {
        self.vector.is_none() && self.base == base
    }
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vector {
            None => f.write_str(self.base.name()),
            Some(shape) => {
                let base = if shape.base_spelling.is_empty() {
                    self.base.name()
                } else {
                    shape.base_spelling.as_str()
                };
                write!(f, "{}x{}", base, shape.lanes)
            }
        }
    }
}
