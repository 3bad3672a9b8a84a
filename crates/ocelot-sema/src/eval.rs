//! Constant folding for global initializers.
//!
//! The folder operates on wrapping 32-bit integers: overflow truncates rather
//! than failing, matching the lowering of file-scope initializers. Failure
//! (`None`) means the expression is not a constant expression — division by
//! zero, an out-of-range shift, an unresolved identifier, or a construct with
//! runtime behavior.
//!
//! The overflow-checked variant used for return-path proofs lives in
//! [`crate::static_analysis`].

use std::collections::HashMap;

use ocelot_ast::{BinaryOp, Expr, GlobalDecl};

/// Folded values of already-processed globals, by name.
pub type GlobalValues = HashMap<String, i32>;

/// Fold `expr` to a 32-bit value, resolving identifiers against `globals`.
pub fn eval_const_expr(expr: &Expr, globals: Option<&GlobalValues>) -> Option<i32> {
    match expr {
        Expr::Number { value, .. } => Some(*value),
        Expr::Nil { .. } => Some(0),
        Expr::Bool { value, .. } => Some(*value as i32),
        Expr::Identifier { name, .. } => globals?.get(name).copied(),
        Expr::Conditional {
            condition,
            then_value,
            else_value,
            ..
        } => {
            let selected = if eval_const_expr(condition, globals)? != 0 {
                then_value
            } else {
                else_value
            };
            eval_const_expr(selected, globals)
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let lhs = eval_const_expr(lhs, globals)?;
            let rhs = eval_const_expr(rhs, globals)?;
            eval_binary(*op, lhs, rhs)
        }
        Expr::Call { .. } | Expr::MessageSend { .. } => None,
    }
}

fn eval_binary(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    match op {
        BinaryOp::Add => Some(lhs.wrapping_add(rhs)),
        BinaryOp::Sub => Some(lhs.wrapping_sub(rhs)),
        BinaryOp::Mul => Some(lhs.wrapping_mul(rhs)),
        BinaryOp::Div => (rhs != 0).then(|| lhs.wrapping_div(rhs)),
        BinaryOp::Rem => (rhs != 0).then(|| lhs.wrapping_rem(rhs)),
        BinaryOp::BitAnd => Some(lhs & rhs),
        BinaryOp::BitOr => Some(lhs | rhs),
        BinaryOp::BitXor => Some(lhs ^ rhs),
        BinaryOp::Shl => (0..=31).contains(&rhs).then(|| lhs.wrapping_shl(rhs as u32)),
        BinaryOp::Shr => (0..=31).contains(&rhs).then(|| lhs.wrapping_shr(rhs as u32)),
        BinaryOp::Eq => Some((lhs == rhs) as i32),
        BinaryOp::Ne => Some((lhs != rhs) as i32),
        BinaryOp::Lt => Some((lhs < rhs) as i32),
        BinaryOp::Le => Some((lhs <= rhs) as i32),
        BinaryOp::Gt => Some((lhs > rhs) as i32),
        BinaryOp::Ge => Some((lhs >= rhs) as i32),
        BinaryOp::And => Some((lhs != 0 && rhs != 0) as i32),
        BinaryOp::Or => Some((lhs != 0 || rhs != 0) as i32),
    }
}

/// Fold every global initializer in declaration order. Each initializer may
/// reference earlier globals; any failure makes the whole program's global
/// values unavailable.
pub fn resolve_global_initializer_values(globals: &[GlobalDecl]) -> Option<Vec<i32>> {
    let mut values = Vec::with_capacity(globals.len());
    let mut resolved = GlobalValues::new();
    for global in globals {
        let value = eval_const_expr(&global.value, Some(&resolved))?;
        values.push(value);
        resolved.insert(global.name.clone(), value);
    }
    Some(values)
}
