//! Statement and expression validation against the scope stack.

use std::collections::{HashMap, HashSet};

use ocelot_ast::{
    AssignOp, AssignStmt, BinaryOp, CaseLabel, Expr, ForClause, LetStmt, ReturnStmt, SourceLoc,
    Stmt, ValueType,
};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::static_analysis::is_bool_like_i32_literal;
use crate::summaries::memory_order_hint;
use crate::surface::IntegrationSurface;
use crate::types::SemType;

pub(super) type Scope = HashMap<String, SemType>;

/// Walks one function body. Every compound construct pushes and pops exactly
/// one scope frame; `if` pushes one frame per branch.
pub(super) struct BodyValidator<'a> {
    surface: &'a IntegrationSurface,
    max_message_send_args: usize,
    expected_return: &'a SemType,
    function_name: &'a str,
    scopes: Vec<Scope>,
    loop_depth: u32,
    switch_depth: u32,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> BodyValidator<'a> {
    pub(super) fn new(
        surface: &'a IntegrationSurface,
        max_message_send_args: usize,
        expected_return: &'a SemType,
        function_name: &'a str,
        param_scope: Scope,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            surface,
            max_message_send_args,
            expected_return,
            function_name,
            scopes: vec![param_scope],
            loop_depth: 0,
            switch_depth: 0,
            diagnostics,
        }
    }

    fn report(&mut self, loc: SourceLoc, code: DiagnosticCode, message: String) {
        self.diagnostics.report(loc, code, message);
    }

    fn scope_lookup(&self, name: &str) -> SemType {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(name) {
                return ty.clone();
            }
        }
        SemType::unknown()
    }

    fn with_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(Scope::new());
        f(self);
        self.scopes.pop();
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn validate_expr(&mut self, expr: &Expr) -> SemType {
        match expr {
            Expr::Number { .. } | Expr::Nil { .. } => SemType::scalar(ValueType::I32),
            Expr::Bool { .. } => SemType::scalar(ValueType::Bool),
            Expr::Identifier { name, loc } => self.validate_identifier(name, *loc),
            Expr::Binary { op, lhs, rhs, loc } => self.validate_binary(*op, lhs, rhs, *loc),
            Expr::Conditional {
                condition,
                then_value,
                else_value,
                loc,
            } => self.validate_conditional(condition, then_value, else_value, *loc),
            Expr::Call { callee, args, loc } => self.validate_call(callee, args, *loc),
            Expr::MessageSend {
                receiver,
                selector,
                args,
                loc,
            } => self.validate_message_send(receiver.as_deref(), selector, args, *loc),
        }
    }

    fn validate_identifier(&mut self, name: &str, loc: SourceLoc) -> SemType {
        let local = self.scope_lookup(name);
        if !local.is_unknown() {
            return local;
        }
        if let Some(ty) = self.surface.globals.get(name) {
            return SemType::scalar(*ty);
        }
        if self.surface.functions.contains_key(name) {
            self.report(
                loc,
                DiagnosticCode::TypeMismatch,
                format!("type mismatch: function '{name}' cannot be used as a value"),
            );
            return SemType::scalar(ValueType::Function);
        }
        self.report(
            loc,
            DiagnosticCode::UndefinedIdentifier,
            format!("undefined identifier '{name}'"),
        );
        SemType::unknown()
    }

    fn require_scalar_i32(&mut self, ty: &SemType, what: &str, side: &str, loc: SourceLoc) {
        if !ty.is_unknown() && (ty.is_vector() || ty.base != ValueType::I32) {
            self.report(
                loc,
                DiagnosticCode::TypeMismatch,
                format!("type mismatch: expected i32 for {what} {side}, got '{ty}'"),
            );
        }
    }

    fn validate_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, loc: SourceLoc) -> SemType {
        let lhs_ty = self.validate_expr(lhs);
        let rhs_ty = self.validate_expr(rhs);

        if op.is_arithmetic() {
            self.require_scalar_i32(&lhs_ty, "arithmetic", "lhs", loc);
            self.require_scalar_i32(&rhs_ty, "arithmetic", "rhs", loc);
            return SemType::scalar(ValueType::I32);
        }
        if op.is_bitwise() {
            self.require_scalar_i32(&lhs_ty, "bitwise", "lhs", loc);
            self.require_scalar_i32(&rhs_ty, "bitwise", "rhs", loc);
            return SemType::scalar(ValueType::I32);
        }
        if op.is_equality() {
            if lhs_ty.is_vector() || rhs_ty.is_vector() {
                if !lhs_ty.is_unknown() && !rhs_ty.is_unknown() && lhs_ty != rhs_ty {
                    self.report(
                        loc,
                        DiagnosticCode::TypeMismatch,
                        format!("type mismatch: equality compares '{lhs_ty}' with '{rhs_ty}'"),
                    );
                }
                return SemType::scalar(ValueType::Bool);
            }
            // Bool vs. i32 is tolerated only against a bool-like literal.
            let bool_to_i32_literal = (lhs_ty.base == ValueType::Bool
                && rhs_ty.base == ValueType::I32
                && is_bool_like_i32_literal(rhs))
                || (rhs_ty.base == ValueType::Bool
                    && lhs_ty.base == ValueType::I32
                    && is_bool_like_i32_literal(lhs));
            if !lhs_ty.is_unknown()
                && !rhs_ty.is_unknown()
                && lhs_ty.base != rhs_ty.base
                && !bool_to_i32_literal
            {
                self.report(
                    loc,
                    DiagnosticCode::TypeMismatch,
                    format!("type mismatch: equality compares '{lhs_ty}' with '{rhs_ty}'"),
                );
            }
            return SemType::scalar(ValueType::Bool);
        }
        if op.is_relational() {
            self.require_scalar_i32(&lhs_ty, "relational", "lhs", loc);
            self.require_scalar_i32(&rhs_ty, "relational", "rhs", loc);
            return SemType::scalar(ValueType::Bool);
        }
        if op.is_logical() {
            for (side, ty) in [("lhs", &lhs_ty), ("rhs", &rhs_ty)] {
                if !ty.is_unknown() && !ty.is_bool_compatible() {
                    self.report(
                        loc,
                        DiagnosticCode::TypeMismatch,
                        format!("type mismatch: expected bool for logical {side}, got '{ty}'"),
                    );
                }
            }
            return SemType::scalar(ValueType::Bool);
        }
        SemType::unknown()
    }

    fn validate_conditional(
        &mut self,
        condition: &Expr,
        then_value: &Expr,
        else_value: &Expr,
        loc: SourceLoc,
    ) -> SemType {
        let condition_ty = self.validate_expr(condition);
        if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
            self.report(
                loc,
                DiagnosticCode::TypeMismatch,
                "type mismatch: conditional condition must be bool-compatible".to_string(),
            );
        }

        let then_ty = self.validate_expr(then_value);
        let else_ty = self.validate_expr(else_value);
        if then_ty.is_unknown() {
            return else_ty;
        }
        if else_ty.is_unknown() {
            return then_ty;
        }
        if then_ty.is_known_scalar() && else_ty.is_known_scalar() {
            if then_ty.base == else_ty.base {
                return then_ty;
            }
            return SemType::scalar(ValueType::I32);
        }
        if then_ty != else_ty {
            self.report(
                loc,
                DiagnosticCode::TypeMismatch,
                "type mismatch: conditional branches must be type-compatible".to_string(),
            );
            return SemType::unknown();
        }
        then_ty
    }

    fn validate_call(&mut self, callee: &str, args: &[Expr], loc: SourceLoc) -> SemType {
        let surface = self.surface;
        let info = surface.functions.get(callee);
        match info {
            None => self.report(
                loc,
                DiagnosticCode::UnknownFunction,
                format!("unknown function '{callee}'"),
            ),
            Some(info) if info.arity != args.len() => self.report(
                loc,
                DiagnosticCode::ArityMismatch,
                format!("arity mismatch for function '{callee}'"),
            ),
            Some(_) => {}
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.validate_expr(arg);
            let Some(param) = info.and_then(|info| info.params.get(i)) else {
                continue;
            };
            // Suffix violations were already reported against the declaration.
            if param.has_invalid_type_suffix {
                continue;
            }
            let expected = &param.ty;
            let bool_coercion = !expected.is_vector()
                && expected.base == ValueType::Bool
                && !arg_ty.is_vector()
                && arg_ty.base == ValueType::I32;
            if !arg_ty.is_unknown() && !expected.is_unknown() && arg_ty != *expected && !bool_coercion
            {
                self.report(
                    arg.loc(),
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "type mismatch: expected '{expected}' argument for parameter {i} of '{callee}', got '{arg_ty}'"
                    ),
                );
            }
        }

        match info {
            Some(info) => info.return_type.clone(),
            None => SemType::unknown(),
        }
    }

    fn validate_message_send(
        &mut self,
        receiver: Option<&Expr>,
        selector: &str,
        args: &[Expr],
        loc: SourceLoc,
    ) -> SemType {
        let receiver_ty = match receiver {
            Some(receiver) => self.validate_expr(receiver),
            None => SemType::unknown(),
        };
        let selector = if selector.is_empty() { "<unknown>" } else { selector };
        if !receiver_ty.is_unknown() && !receiver_ty.is_i32_compatible() {
            let diag_loc = receiver.map_or(loc, Expr::loc);
            self.report(
                diag_loc,
                DiagnosticCode::MessageReceiverMismatch,
                format!(
                    "type mismatch: message receiver for selector '{selector}' must be i32-compatible, got '{receiver_ty}'"
                ),
            );
        }

        if args.len() > self.max_message_send_args {
            self.report(
                loc,
                DiagnosticCode::MessageArityOverflow,
                format!(
                    "arity mismatch: message '{selector}' has {} argument(s); native frontend supports at most {}",
                    args.len(),
                    self.max_message_send_args
                ),
            );
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.validate_expr(arg);
            if !arg_ty.is_unknown() && !arg_ty.is_i32_compatible() {
                self.report(
                    arg.loc(),
                    DiagnosticCode::MessageArgumentMismatch,
                    format!(
                        "type mismatch: message argument {i} for selector '{selector}' must be i32-compatible, got '{arg_ty}'"
                    ),
                );
            }
        }
        SemType::scalar(ValueType::I32)
    }

    // ── Statements ──────────────────────────────────────────────────────

    pub(super) fn validate_block(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.validate_stmt(stmt);
        }
    }

    fn validate_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => self.validate_let(let_stmt),
            Stmt::Assign(assign) => self.validate_assign(assign),
            Stmt::Return(ret) => self.validate_return(ret),
            Stmt::Expr(value) => {
                self.validate_expr(value);
            }
            Stmt::If(if_stmt) => {
                let condition_ty = self.validate_expr(&if_stmt.condition);
                if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
                    self.report(
                        if_stmt.loc,
                        DiagnosticCode::TypeMismatch,
                        "type mismatch: if condition must be bool-compatible".to_string(),
                    );
                }
                self.with_scope(|v| v.validate_block(&if_stmt.then_body));
                self.with_scope(|v| v.validate_block(&if_stmt.else_body));
            }
            Stmt::While(while_stmt) => {
                let condition_ty = self.validate_expr(&while_stmt.condition);
                if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
                    self.report(
                        while_stmt.loc,
                        DiagnosticCode::TypeMismatch,
                        "type mismatch: while condition must be bool-compatible".to_string(),
                    );
                }
                self.loop_depth += 1;
                self.with_scope(|v| v.validate_block(&while_stmt.body));
                self.loop_depth -= 1;
            }
            Stmt::DoWhile(do_while) => {
                self.loop_depth += 1;
                self.with_scope(|v| v.validate_block(&do_while.body));
                self.loop_depth -= 1;
                let condition_ty = self.validate_expr(&do_while.condition);
                if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
                    self.report(
                        do_while.loc,
                        DiagnosticCode::TypeMismatch,
                        "type mismatch: do-while condition must be bool-compatible".to_string(),
                    );
                }
            }
            Stmt::For(for_stmt) => {
                self.scopes.push(Scope::new());
                self.validate_for_clause(&for_stmt.init);
                if let Some(condition) = &for_stmt.condition {
                    let condition_ty = self.validate_expr(condition);
                    if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
                        self.report(
                            for_stmt.loc,
                            DiagnosticCode::TypeMismatch,
                            "type mismatch: for condition must be bool-compatible".to_string(),
                        );
                    }
                }
                self.validate_for_clause(&for_stmt.step);
                self.loop_depth += 1;
                self.with_scope(|v| v.validate_block(&for_stmt.body));
                self.loop_depth -= 1;
                self.scopes.pop();
            }
            Stmt::Switch(switch) => {
                let condition_ty = self.validate_expr(&switch.condition);
                if !condition_ty.is_unknown() && !condition_ty.is_bool_compatible() {
                    self.report(
                        switch.loc,
                        DiagnosticCode::TypeMismatch,
                        "type mismatch: switch condition must be i32-compatible".to_string(),
                    );
                }
                let mut seen_values = HashSet::new();
                let mut seen_default = false;
                for case in &switch.cases {
                    match &case.label {
                        CaseLabel::Default => {
                            if seen_default {
                                self.report(
                                    case.loc,
                                    DiagnosticCode::TypeMismatch,
                                    "type mismatch: duplicate default label in switch".to_string(),
                                );
                            }
                            seen_default = true;
                        }
                        CaseLabel::Value { value, loc } => {
                            if !seen_values.insert(*value) {
                                self.report(
                                    *loc,
                                    DiagnosticCode::TypeMismatch,
                                    format!(
                                        "type mismatch: duplicate case label '{value}' in switch"
                                    ),
                                );
                            }
                        }
                    }
                    self.switch_depth += 1;
                    self.with_scope(|v| v.validate_block(&case.body));
                    self.switch_depth -= 1;
                }
            }
            Stmt::Block(body) => {
                self.with_scope(|v| v.validate_block(body));
            }
            Stmt::Break { loc } => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.report(
                        *loc,
                        DiagnosticCode::BreakOutsideLoop,
                        "loop-control misuse: 'break' outside loop".to_string(),
                    );
                }
            }
            Stmt::Continue { loc } => {
                if self.loop_depth == 0 {
                    self.report(
                        *loc,
                        DiagnosticCode::ContinueOutsideLoop,
                        "loop-control misuse: 'continue' outside loop".to_string(),
                    );
                }
            }
            Stmt::Empty => {}
        }
    }

    fn validate_let(&mut self, let_stmt: &LetStmt) {
        let value_ty = self.validate_expr(&let_stmt.value);
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&let_stmt.name) {
            self.report(
                let_stmt.loc,
                DiagnosticCode::DuplicateDeclaration,
                format!("duplicate declaration '{}'", let_stmt.name),
            );
        } else {
            scope.insert(let_stmt.name.clone(), value_ty);
        }
    }

    fn resolve_assignment_target(&self, name: &str) -> Option<SemType> {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(name) {
                return Some(ty.clone());
            }
        }
        self.surface
            .globals
            .get(name)
            .map(|ty| SemType::scalar(*ty))
    }

    fn validate_assign(&mut self, assign: &AssignStmt) {
        let target_ty = self.resolve_assignment_target(&assign.target);
        if target_ty.is_none() {
            self.report(
                assign.loc,
                DiagnosticCode::InvalidAssignmentTarget,
                format!(
                    "invalid assignment target '{}': target must be a mutable symbol",
                    assign.target
                ),
            );
        }
        let value_ty = match &assign.value {
            Some(value) => self.validate_expr(value),
            None => SemType::unknown(),
        };
        self.check_assignment_compatibility(assign, target_ty.as_ref(), &value_ty);
    }

    fn validate_for_clause(&mut self, clause: &ForClause) {
        match clause {
            ForClause::None => {}
            ForClause::Expr(value) => {
                self.validate_expr(value);
            }
            ForClause::Let(let_stmt) => self.validate_let(let_stmt),
            ForClause::Assign(assign) => self.validate_assign(assign),
        }
    }

    fn report_assignment_mismatch(
        &mut self,
        assign: &AssignStmt,
        target_ty: &SemType,
        value_ty: &SemType,
    ) {
        self.report(
            assign.loc,
            DiagnosticCode::TypeMismatch,
            format!(
                "type mismatch: assignment to '{}' expects '{target_ty}', got '{value_ty}'; {}",
                assign.target,
                memory_order_hint(&assign.op)
            ),
        );
    }

    fn check_assignment_compatibility(
        &mut self,
        assign: &AssignStmt,
        target_ty: Option<&SemType>,
        value_ty: &SemType,
    ) {
        let op = &assign.op;
        let unknown = SemType::unknown();
        let target = target_ty.unwrap_or(&unknown);
        let found = target_ty.is_some();

        if *op == AssignOp::Assign {
            let target_known_scalar = target.is_known_scalar();
            let value_known_scalar = value_ty.is_known_scalar();
            let assign_matches = target == value_ty
                || (target_known_scalar
                    && value_known_scalar
                    && target.base == ValueType::I32
                    && value_ty.base == ValueType::Bool)
                || (target_known_scalar
                    && value_known_scalar
                    && target.base == ValueType::Bool
                    && value_ty.base == ValueType::I32
                    && assign.value.as_ref().is_some_and(is_bool_like_i32_literal));
            if found && target_known_scalar && !value_ty.is_unknown() && !value_known_scalar {
                self.report_assignment_mismatch(assign, target, value_ty);
                return;
            }
            if found && target_known_scalar && value_known_scalar && !assign_matches {
                self.report_assignment_mismatch(assign, target, value_ty);
                return;
            }
            if found && target.is_vector() && !value_ty.is_unknown() && !assign_matches {
                self.report_assignment_mismatch(assign, target, value_ty);
            }
            return;
        }

        if !op.is_compound() {
            if matches!(op, AssignOp::Increment | AssignOp::Decrement) {
                if found
                    && !target.is_unknown()
                    && (target.is_vector() || target.base != ValueType::I32)
                {
                    let message = format!(
                        "type mismatch: update operator '{op}' target '{}' must be 'i32', got '{target}'; {}",
                        assign.target,
                        memory_order_hint(op)
                    );
                    self.report(assign.loc, DiagnosticCode::TypeMismatch, message);
                }
                return;
            }
            let message = format!(
                "type mismatch: unsupported assignment operator '{op}'; {}",
                memory_order_hint(op)
            );
            self.report(assign.loc, DiagnosticCode::TypeMismatch, message);
            return;
        }

        if !found {
            return;
        }
        if !target.is_unknown() && (target.is_vector() || target.base != ValueType::I32) {
            let message = format!(
                "type mismatch: compound assignment '{op}' target '{}' must be 'i32', got '{target}'; {}",
                assign.target,
                memory_order_hint(op)
            );
            self.report(assign.loc, DiagnosticCode::TypeMismatch, message);
        }
        if target.base == ValueType::I32
            && !target.is_vector()
            && !value_ty.is_unknown()
            && (value_ty.is_vector() || value_ty.base != ValueType::I32)
        {
            let message = format!(
                "type mismatch: compound assignment '{op}' value for '{}' must be 'i32', got '{value_ty}'; {}",
                assign.target,
                memory_order_hint(op)
            );
            self.report(assign.loc, DiagnosticCode::TypeMismatch, message);
        }
    }

    fn validate_return(&mut self, ret: &ReturnStmt) {
        let Some(value) = &ret.value else {
            if *self.expected_return != SemType::scalar(ValueType::Void) {
                self.report(
                    ret.loc,
                    DiagnosticCode::ReturnTypeMismatch,
                    format!(
                        "type mismatch: function '{}' must return '{}'",
                        self.function_name, self.expected_return
                    ),
                );
            }
            return;
        };

        if *self.expected_return == SemType::scalar(ValueType::Void) {
            self.report(
                ret.loc,
                DiagnosticCode::ReturnTypeMismatch,
                format!(
                    "type mismatch: void function '{}' must use 'return;'",
                    self.function_name
                ),
            );
            self.validate_expr(value);
            return;
        }

        let return_ty = self.validate_expr(value);
        let expected = self.expected_return;
        let return_matches = return_ty == *expected
            || (expected.is_scalar_base(ValueType::I32) && return_ty.is_scalar_base(ValueType::Bool))
            || (expected.is_scalar_base(ValueType::Bool)
                && return_ty.is_scalar_base(ValueType::I32)
                && is_bool_like_i32_literal(value));
        if !return_matches
            && !return_ty.is_unknown()
            && !return_ty.is_scalar_base(ValueType::Function)
        {
            let message = format!(
                "type mismatch: return expression in function '{}' must be '{expected}', got '{return_ty}'",
                self.function_name
            );
            self.report(ret.loc, DiagnosticCode::ReturnTypeMismatch, message);
        }
    }
}
