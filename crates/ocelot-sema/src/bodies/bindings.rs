//! Collection of definitely-constant scalar bindings for return-path proofs.
//!
//! A name participates in a proof only when nothing in the body can change
//! it: it is never assigned anywhere, never re-declared by a nested `let`,
//! and never dispatched on by a nested `switch`. Globals join under the same
//! exclusions, and only when every global initializer folds.

use std::collections::HashSet;

use ocelot_ast::{Expr, ForClause, FunctionDecl, Program, Stmt};

use crate::eval::resolve_global_initializer_values;
use crate::static_analysis::{StaticScalarBindings, try_eval_static_scalar};

/// Globals usable as static scalar bindings in any function: every
/// initializer folded and the name is never assigned in the whole program.
pub(super) fn collect_global_static_bindings(program: &Program) -> StaticScalarBindings {
    let mut assigned = HashSet::new();
    for function in &program.functions {
        collect_assigned_names(&function.body, &mut assigned);
    }

    let mut bindings = StaticScalarBindings::new();
    if let Some(values) = resolve_global_initializer_values(&program.globals) {
        for (global, value) in program.globals.iter().zip(values) {
            if assigned.contains(&global.name) {
                continue;
            }
            bindings.insert(global.name.clone(), value);
        }
    }
    bindings
}

/// Static scalar bindings for one function: eligible globals, then top-level
/// `let`s folded in order with the earlier bindings in context.
pub(super) fn collect_function_static_bindings(
    function: &FunctionDecl,
    global_bindings: &StaticScalarBindings,
) -> StaticScalarBindings {
    let mut assigned = HashSet::new();
    collect_assigned_names(&function.body, &mut assigned);
    let mut nested_lets = HashSet::new();
    collect_nested_let_names(&function.body, true, &mut nested_lets);
    let mut switch_conditions = HashSet::new();
    collect_switch_condition_names(&function.body, &mut switch_conditions);

    let excluded = |name: &String| {
        assigned.contains(name) || nested_lets.contains(name) || switch_conditions.contains(name)
    };

    let mut bindings = StaticScalarBindings::new();
    for (name, value) in global_bindings {
        if excluded(name) {
            continue;
        }
        bindings.insert(name.clone(), *value);
    }
    for stmt in &function.body {
        let Stmt::Let(let_stmt) = stmt else { continue };
        if excluded(&let_stmt.name) {
            continue;
        }
        if let Some(value) = try_eval_static_scalar(&let_stmt.value, &bindings) {
            bindings.insert(let_stmt.name.clone(), value);
        }
    }
    bindings
}

fn collect_assigned_names(statements: &[Stmt], assigned: &mut HashSet<String>) {
    for stmt in statements {
        collect_assigned_names_in_stmt(stmt, assigned);
    }
}

fn collect_assigned_names_in_stmt(stmt: &Stmt, assigned: &mut HashSet<String>) {
    match stmt {
        Stmt::Assign(assign) => {
            assigned.insert(assign.target.clone());
        }
        Stmt::Block(body) => collect_assigned_names(body, assigned),
        Stmt::If(if_stmt) => {
            collect_assigned_names(&if_stmt.then_body, assigned);
            collect_assigned_names(&if_stmt.else_body, assigned);
        }
        Stmt::DoWhile(do_while) => collect_assigned_names(&do_while.body, assigned),
        Stmt::For(for_stmt) => {
            if let ForClause::Assign(assign) = &for_stmt.init {
                assigned.insert(assign.target.clone());
            }
            if let ForClause::Assign(assign) = &for_stmt.step {
                assigned.insert(assign.target.clone());
            }
            collect_assigned_names(&for_stmt.body, assigned);
        }
        Stmt::Switch(switch) => {
            for case in &switch.cases {
                collect_assigned_names(&case.body, assigned);
            }
        }
        Stmt::While(while_stmt) => collect_assigned_names(&while_stmt.body, assigned),
        Stmt::Let(_) | Stmt::Return(_) | Stmt::Expr(_) | Stmt::Break { .. }
        | Stmt::Continue { .. } | Stmt::Empty => {}
    }
}

fn collect_nested_let_names(statements: &[Stmt], is_top_level: bool, names: &mut HashSet<String>) {
    for stmt in statements {
        collect_nested_let_names_in_stmt(stmt, is_top_level, names);
    }
}

fn collect_nested_let_names_in_stmt(stmt: &Stmt, is_top_level: bool, names: &mut HashSet<String>) {
    match stmt {
        Stmt::Let(let_stmt) => {
            if !is_top_level {
                names.insert(let_stmt.name.clone());
            }
        }
        Stmt::Block(body) => collect_nested_let_names(body, false, names),
        Stmt::If(if_stmt) => {
            collect_nested_let_names(&if_stmt.then_body, false, names);
            collect_nested_let_names(&if_stmt.else_body, false, names);
        }
        Stmt::DoWhile(do_while) => collect_nested_let_names(&do_while.body, false, names),
        Stmt::For(for_stmt) => {
            if let ForClause::Let(let_stmt) = &for_stmt.init {
                names.insert(let_stmt.name.clone());
            }
            collect_nested_let_names(&for_stmt.body, false, names);
        }
        Stmt::Switch(switch) => {
            for case in &switch.cases {
                collect_nested_let_names(&case.body, false, names);
            }
        }
        Stmt::While(while_stmt) => collect_nested_let_names(&while_stmt.body, false, names),
        Stmt::Assign(_) | Stmt::Return(_) | Stmt::Expr(_) | Stmt::Break { .. }
        | Stmt::Continue { .. } | Stmt::Empty => {}
    }
}

fn collect_switch_condition_names(statements: &[Stmt], names: &mut HashSet<String>) {
    for stmt in statements {
        collect_switch_condition_names_in_stmt(stmt, names);
    }
}

fn collect_switch_condition_names_in_stmt(stmt: &Stmt, names: &mut HashSet<String>) {
    match stmt {
        Stmt::Switch(switch) => {
            if let Expr::Identifier { name, .. } = &switch.condition
                && !name.is_empty()
            {
                names.insert(name.clone());
            }
            for case in &switch.cases {
                collect_switch_condition_names(&case.body, names);
            }
        }
        Stmt::Block(body) => collect_switch_condition_names(body, names),
        Stmt::If(if_stmt) => {
            collect_switch_condition_names(&if_stmt.then_body, names);
            collect_switch_condition_names(&if_stmt.else_body, names);
        }
        Stmt::DoWhile(do_while) => collect_switch_condition_names(&do_while.body, names),
        Stmt::For(for_stmt) => collect_switch_condition_names(&for_stmt.body, names),
        Stmt::While(while_stmt) => collect_switch_condition_names(&while_stmt.body, names),
        Stmt::Let(_) | Stmt::Assign(_) | Stmt::Return(_) | Stmt::Expr(_) | Stmt::Break { .. }
        | Stmt::Continue { .. } | Stmt::Empty => {}
    }
}
