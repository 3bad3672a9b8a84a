//! Static control-flow facts about statements and blocks.
//!
//! Answers one question for the body validator: does every execution path
//! through a block reach a `return`? Conditions are resolved where possible
//! with an overflow-checked scalar folder over the caller-supplied bindings;
//! anything the folder cannot prove is treated conservatively.
//!
//! Unlike the global-initializer folder in [`crate::eval`], this folder fails
//! on 32-bit overflow, on shifts outside `0..=31` or with a negative left
//! operand, and on `i32::MIN / -1`; `&&`/`||` short-circuit so the right
//! operand need not be evaluable when the left decides the result.

use std::collections::HashMap;

use ocelot_ast::{BinaryOp, CaseLabel, Expr, IfStmt, Stmt, SwitchStmt};

/// Definitely-constant scalar bindings in scope for a proof.
pub type StaticScalarBindings = HashMap<String, i32>;

/// Integer literal `0` or `1`, or `nil`.
pub fn is_bool_like_i32_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Nil { .. } => true,
        Expr::Number { value, .. } => *value == 0 || *value == 1,
        _ => false,
    }
}

fn eval_arithmetic(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) {
        if rhs == 0 || (lhs == i32::MIN && rhs == -1) {
            return None;
        }
        return Some(if op == BinaryOp::Div { lhs / rhs } else { lhs % rhs });
    }
    let wide = match op {
        BinaryOp::Add => lhs as i64 + rhs as i64,
        BinaryOp::Sub => lhs as i64 - rhs as i64,
        BinaryOp::Mul => lhs as i64 * rhs as i64,
        _ => return None,
    };
    if wide < i32::MIN as i64 || wide > i32::MAX as i64 {
        return None;
    }
    Some(wide as i32)
}

fn eval_bitwise(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    match op {
        BinaryOp::BitAnd => Some(lhs & rhs),
        BinaryOp::BitOr => Some(lhs | rhs),
        BinaryOp::BitXor => Some(lhs ^ rhs),
        BinaryOp::Shl | BinaryOp::Shr => {
            if rhs < 0 || rhs > 31 || lhs < 0 {
                return None;
            }
            if op == BinaryOp::Shl {
                let shifted = (lhs as u64) << rhs;
                if shifted > i32::MAX as u64 {
                    return None;
                }
                return Some(shifted as i32);
            }
            Some(lhs >> rhs)
        }
        _ => None,
    }
}

fn eval_comparison(op: BinaryOp, lhs: i32, rhs: i32) -> bool {
    match op {
        BinaryOp::Eq => lhs == rhs,
        BinaryOp::Ne => lhs != rhs,
        BinaryOp::Lt => lhs < rhs,
        BinaryOp::Le => lhs <= rhs,
        BinaryOp::Gt => lhs > rhs,
        BinaryOp::Ge => lhs >= rhs,
        _ => false,
    }
}

/// Fold `expr` to a scalar under `bindings`, failing on anything with
/// runtime-dependent or overflowing behavior.
pub fn try_eval_static_scalar(expr: &Expr, bindings: &StaticScalarBindings) -> Option<i32> {
    match expr {
        Expr::Bool { value, .. } => Some(*value as i32),
        Expr::Nil { .. } => Some(0),
        Expr::Number { value, .. } => Some(*value),
        Expr::Identifier { name, .. } => bindings.get(name).copied(),
        Expr::Conditional {
            condition,
            then_value,
            else_value,
            ..
        } => {
            let selected = if try_eval_static_truthiness(condition, bindings)? {
                then_value
            } else {
                else_value
            };
            try_eval_static_scalar(selected, bindings)
        }
        Expr::Binary { op, lhs, rhs, .. } => match op {
            BinaryOp::And => {
                if !try_eval_static_truthiness(lhs, bindings)? {
                    return Some(0);
                }
                try_eval_static_truthiness(rhs, bindings).map(|truthy| truthy as i32)
            }
            BinaryOp::Or => {
                if try_eval_static_truthiness(lhs, bindings)? {
                    return Some(1);
                }
                try_eval_static_truthiness(rhs, bindings).map(|truthy| truthy as i32)
            }
            _ => {
                let lhs = try_eval_static_scalar(lhs, bindings)?;
                let rhs = try_eval_static_scalar(rhs, bindings)?;
                if op.is_arithmetic() {
                    eval_arithmetic(*op, lhs, rhs)
                } else if op.is_bitwise() {
                    eval_bitwise(*op, lhs, rhs)
                } else if op.is_equality() || op.is_relational() {
                    Some(eval_comparison(*op, lhs, rhs) as i32)
                } else {
                    None
                }
            }
        },
        Expr::Call { .. } | Expr::MessageSend { .. } => None,
    }
}

fn try_eval_static_truthiness(expr: &Expr, bindings: &StaticScalarBindings) -> Option<bool> {
    try_eval_static_scalar(expr, bindings).map(|value| value != 0)
}

pub fn expr_is_statically_true(expr: &Expr, bindings: &StaticScalarBindings) -> bool {
    try_eval_static_truthiness(expr, bindings) == Some(true)
}

pub fn expr_is_statically_false(expr: &Expr, bindings: &StaticScalarBindings) -> bool {
    try_eval_static_truthiness(expr, bindings) == Some(false)
}

/// Whether a case body either reaches a `return` or runs off its end into the
/// next case arm. `break`, `continue`, and loops that may execute disqualify
/// the chain.
fn block_falls_through_to_next_case(statements: &[Stmt], bindings: &StaticScalarBindings) -> bool {
    for stmt in statements {
        if stmt_always_returns(stmt, bindings) {
            return true;
        }
        if !stmt_falls_through_to_next_case(stmt, bindings) {
            return false;
        }
    }
    true
}

fn stmt_falls_through_to_next_case(stmt: &Stmt, bindings: &StaticScalarBindings) -> bool {
    match stmt {
        Stmt::Let(_) | Stmt::Assign(_) | Stmt::Expr(_) | Stmt::Empty => true,
        Stmt::Block(body) => block_falls_through_to_next_case(body, bindings),
        Stmt::If(if_stmt) => {
            let then_ok = block_falls_through_to_next_case(&if_stmt.then_body, bindings);
            let else_ok = if_stmt.else_body.is_empty()
                || block_falls_through_to_next_case(&if_stmt.else_body, bindings);
            if expr_is_statically_true(&if_stmt.condition, bindings) {
                then_ok
            } else if expr_is_statically_false(&if_stmt.condition, bindings) {
                else_ok
            } else {
                then_ok && else_ok
            }
        }
        // A nested switch that does not already guarantee return may still
        // complete and continue into the subsequent outer case-body statements.
        Stmt::Switch(_) => true,
        Stmt::Return(_) | Stmt::Break { .. } | Stmt::Continue { .. } => false,
        Stmt::DoWhile(do_while) => {
            expr_is_statically_false(&do_while.condition, bindings)
                && block_falls_through_to_next_case(&do_while.body, bindings)
        }
        Stmt::For(for_stmt) => for_stmt
            .condition
            .as_ref()
            .is_some_and(|condition| expr_is_statically_false(condition, bindings)),
        Stmt::While(while_stmt) => expr_is_statically_false(&while_stmt.condition, bindings),
    }
}

fn switch_always_returns(switch: &SwitchStmt, bindings: &StaticScalarBindings) -> bool {
    if switch.cases.is_empty() {
        return false;
    }

    let mut has_default = false;
    let mut arm_guarantees = vec![false; switch.cases.len()];
    let mut next_arm_guarantees = false;
    for (i, case) in switch.cases.iter().enumerate().rev() {
        has_default = has_default || matches!(case.label, CaseLabel::Default);
        arm_guarantees[i] = if block_always_returns(&case.body, bindings) {
            true
        } else if block_falls_through_to_next_case(&case.body, bindings) {
            // Bodies that return or fall through chain deterministically to
            // the next arm's guarantee.
            next_arm_guarantees
        } else {
            false
        };
        next_arm_guarantees = arm_guarantees[i];
    }

    if let Some(selector) = try_eval_static_scalar(&switch.condition, bindings) {
        let selected = switch
            .cases
            .iter()
            .position(|case| matches!(case.label, CaseLabel::Value { value, .. } if value == selector))
            .or_else(|| {
                switch
                    .cases
                    .iter()
                    .position(|case| matches!(case.label, CaseLabel::Default))
            });
        return match selected {
            Some(index) => arm_guarantees[index],
            None => false,
        };
    }

    has_default && arm_guarantees.into_iter().all(|guarantees| guarantees)
}

fn if_always_returns(if_stmt: &IfStmt, bindings: &StaticScalarBindings) -> bool {
    if expr_is_statically_true(&if_stmt.condition, bindings) {
        return !if_stmt.then_body.is_empty() && block_always_returns(&if_stmt.then_body, bindings);
    }
    if expr_is_statically_false(&if_stmt.condition, bindings) {
        return !if_stmt.else_body.is_empty() && block_always_returns(&if_stmt.else_body, bindings);
    }
    if if_stmt.then_body.is_empty() || if_stmt.else_body.is_empty() {
        return false;
    }
    block_always_returns(&if_stmt.then_body, bindings)
        && block_always_returns(&if_stmt.else_body, bindings)
}

/// Whether every execution path through `stmt` reaches a `return`.
pub fn stmt_always_returns(stmt: &Stmt, bindings: &StaticScalarBindings) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(body) => block_always_returns(body, bindings),
        Stmt::If(if_stmt) => if_always_returns(if_stmt, bindings),
        Stmt::While(while_stmt) => {
            expr_is_statically_true(&while_stmt.condition, bindings)
                && block_always_returns(&while_stmt.body, bindings)
        }
        Stmt::For(for_stmt) => {
            let guaranteed_entry = for_stmt
                .condition
                .as_ref()
                .is_none_or(|condition| expr_is_statically_true(condition, bindings));
            guaranteed_entry && block_always_returns(&for_stmt.body, bindings)
        }
        Stmt::DoWhile(do_while) => block_always_returns(&do_while.body, bindings),
        Stmt::Switch(switch) => switch_always_returns(switch, bindings),
        Stmt::Let(_)
        | Stmt::Assign(_)
        | Stmt::Expr(_)
        | Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Empty => false,
    }
}

/// Whether some statement in the block always returns.
pub fn block_always_returns(statements: &[Stmt], bindings: &StaticScalarBindings) -> bool {
    statements
        .iter()
        .any(|stmt| stmt_always_returns(stmt, bindings))
}
