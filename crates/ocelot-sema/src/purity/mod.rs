//! Pass 3: interprocedural purity classification.
//!
//! Each defined function's body is scanned once for effect sites: writes to
//! program globals (through the scope stack, so shadowed names don't count),
//! message sends, and calls. Direct effects seed an impure set; a fixpoint
//! then grows it along the call graph, attributing each newly impure function
//! to a canonical cause — the candidate with the least `(token, line,
//! column)` triple. The set only grows and is bounded by the defined
//! functions, so the fixpoint terminates.


use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;

use ocelot_ast::{Expr, ForClause, Program, SourceLoc, Stmt};

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::surface::FunctionInfo;

/// Effect sites observed in one function body, each the earliest of its kind.
#[derive(Debug, Default)]
struct EffectInfo {
    global_write: Option<SourceLoc>,
    message_send: Option<SourceLoc>,
    /// Earliest call site per callee, iterated in name order.
    calls: BTreeMap<String, SourceLoc>,
}

fn record_earliest(slot: &mut Option<SourceLoc>, loc: SourceLoc) {
    if slot.is_none_or(|existing| loc < existing) {
        *slot = Some(loc);
    }
}

/// Why a function is impure, anchored at its cause site. `detail` carries the
/// root effect when the cause was inherited through a callee.
#[derive(Debug, Clone)]
struct ImpurityCause {
    token: String,
    site: SourceLoc,
    detail: Option<(String, SourceLoc)>,
}

impl ImpurityCause {
    fn direct(token: &str, site: SourceLoc) -> Self {
        Self {
            token: token.to_string(),
            site,
            detail: Some((token.to_string(), site)),
        }
    }

    fn is_better_than(&self, current: Option<&ImpurityCause>) -> bool {
        match current {
            None => true,
            Some(current) => {
                (&self.token, self.site) < (&current.token, current.site)
            }
        }
    }
}

fn direct_cause(info: &EffectInfo) -> Option<ImpurityCause> {
    if let Some(site) = info.global_write {
        return Some(ImpurityCause::direct("global-write", site));
    }
    if let Some(site) = info.message_send {
        return Some(ImpurityCause::direct("message-send", site));
    }
    None
}

/// Walks one body with a scope stack seeded by the parameters, so local and
/// parameter names shadow globals.
struct EffectCollector<'a> {
    globals: &'a HashSet<String>,
    scopes: Vec<HashSet<String>>,
    info: EffectInfo,
}

impl EffectCollector<'_> {
    fn is_shadowed(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn is_global_write_target(&self, name: &str) -> bool {
        !name.is_empty() && !self.is_shadowed(name) && self.globals.contains(name)
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut()
            && !name.is_empty()
        {
            scope.insert(name.to_string());
        }
    }

    fn with_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.scopes.push(HashSet::new());
        f(self);
        self.scopes.pop();
    }

    fn collect_block(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.collect_stmt(stmt);
        }
    }

    fn collect_for_clause(&mut self, clause: &ForClause) {
        match clause {
            ForClause::None => {}
            ForClause::Expr(value) => self.collect_expr(value),
            ForClause::Let(let_stmt) => {
                self.collect_expr(&let_stmt.value);
                self.bind(&let_stmt.name);
            }
            ForClause::Assign(assign) => {
                if self.is_global_write_target(&assign.target) {
                    record_earliest(&mut self.info.global_write, assign.loc);
                }
                if let Some(value) = &assign.value {
                    self.collect_expr(value);
                }
            }
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => {
                self.collect_expr(&let_stmt.value);
                self.bind(&let_stmt.name);
            }
            Stmt::Assign(assign) => {
                if self.is_global_write_target(&assign.target) {
                    record_earliest(&mut self.info.global_write, assign.loc);
                }
                if let Some(value) = &assign.value {
                    self.collect_expr(value);
                }
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.collect_expr(value);
                }
            }
            Stmt::Expr(value) => self.collect_expr(value),
            Stmt::If(if_stmt) => {
                self.collect_expr(&if_stmt.condition);
                self.with_scope(|c| c.collect_block(&if_stmt.then_body));
                self.with_scope(|c| c.collect_block(&if_stmt.else_body));
            }
            Stmt::DoWhile(do_while) => {
                self.with_scope(|c| c.collect_block(&do_while.body));
                self.collect_expr(&do_while.condition);
            }
            Stmt::For(for_stmt) => {
                self.with_scope(|c| {
                    c.collect_for_clause(&for_stmt.init);
                    if let Some(condition) = &for_stmt.condition {
                        c.collect_expr(condition);
                    }
                    c.with_scope(|c| c.collect_block(&for_stmt.body));
                    c.collect_for_clause(&for_stmt.step);
                });
            }
            Stmt::Switch(switch) => {
                self.collect_expr(&switch.condition);
                for case in &switch.cases {
                    self.with_scope(|c| c.collect_block(&case.body));
                }
            }
            Stmt::While(while_stmt) => {
                self.collect_expr(&while_stmt.condition);
                self.with_scope(|c| c.collect_block(&while_stmt.body));
            }
            Stmt::Block(body) => {
                self.with_scope(|c| c.collect_block(body));
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty => {}
        }
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number { .. } | Expr::Bool { .. } | Expr::Nil { .. } | Expr::Identifier { .. } => {
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.collect_expr(lhs);
                self.collect_expr(rhs);
            }
            Expr::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => {
                self.collect_expr(condition);
                self.collect_expr(then_value);
                self.collect_expr(else_value);
            }
            Expr::Call { callee, args, loc } => {
                let slot = self.info.calls.entry(callee.clone());
                slot.and_modify(|existing| {
                    if *loc < *existing {
                        *existing = *loc;
                    }
                })
                .or_insert(*loc);
                for arg in args {
                    self.collect_expr(arg);
                }
            }
            Expr::MessageSend {
                receiver,
                args,
                loc,
                ..
            } => {
                record_earliest(&mut self.info.message_send, *loc);
                if let Some(receiver) = receiver {
                    self.collect_expr(receiver);
                }
                for arg in args {
                    self.collect_expr(arg);
                }
            }
        }
    }
}

/// Classify every defined function and report `O3S215` for each function
/// declared `pure` that lands in the impure set, at most once per name at its
/// first pure-annotated definition.
pub fn validate_pure_contract(
    program: &Program,
    surface_functions: &IndexMap<String, FunctionInfo>,
    diagnostics: &mut Diagnostics,
) {
    let globals: HashSet<String> = program
        .globals
        .iter()
        .map(|global| global.name.clone())
        .collect();

    let mut function_effects: BTreeMap<String, EffectInfo> = BTreeMap::new();
    for function in &program.functions {
        if function.is_prototype {
            continue;
        }
        let mut collector = EffectCollector {
            globals: &globals,
            scopes: vec![function.params.iter().map(|p| p.name.clone()).collect()],
            info: EffectInfo::default(),
        };
        collector.collect_block(&function.body);
        function_effects.insert(function.name.clone(), collector.info);
    }

    // The impure set and its causes in one map: membership means a cause was
    // recorded.
    let mut impure: BTreeMap<String, ImpurityCause> = BTreeMap::new();
    for (name, info) in &function_effects {
        if let Some(cause) = direct_cause(info) {
            impure.insert(name.clone(), cause);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (name, info) in &function_effects {
            if impure.contains_key(name) {
                continue;
            }
            let mut selected: Option<ImpurityCause> = None;
            for (callee, call_site) in &info.calls {
                let callee_info = surface_functions.get(callee);
                let callee_defined = callee_info.is_some_and(|info| info.has_definition);
                let callee_pure = callee_info.is_some_and(|info| info.is_pure_annotation);
                let candidate = if !callee_defined && !callee_pure {
                    let token = format!("unannotated-extern-call:{callee}");
                    ImpurityCause {
                        detail: Some((token.clone(), *call_site)),
                        token,
                        site: *call_site,
                    }
                } else if let Some(callee_cause) = impure.get(callee) {
                    ImpurityCause {
                        token: format!("impure-callee:{callee}"),
                        site: *call_site,
                        detail: callee_cause
                            .detail
                            .clone()
                            .or(Some((callee_cause.token.clone(), callee_cause.site))),
                    }
                } else {
                    continue;
                };
                if candidate.is_better_than(selected.as_ref()) {
                    selected = Some(candidate);
                }
            }
            if let Some(mut cause) = selected {
                if cause.detail.is_none() {
                    cause.detail = Some((cause.token.clone(), cause.site));
                }
                impure.insert(name.clone(), cause);
                changed = true;
            }
        }
    }

    let mut reported: HashSet<&str> = HashSet::new();
    for function in &program.functions {
        if function.is_prototype || !function.is_pure {
            continue;
        }
        let Some(cause) = impure.get(&function.name) else {
            continue;
        };
        if !reported.insert(&function.name) {
            continue;
        }
        let (detail_token, detail_site) = cause
            .detail
            .clone()
            .unwrap_or_else(|| (cause.token.clone(), cause.site));
        diagnostics.report(
            function.loc,
            DiagnosticCode::PureContractViolation,
            format!(
                "pure contract violation: function '{}' declared 'pure' has side effects \
                 (cause: {}; cause-site:{}:{}; detail:{}@{}:{})",
                function.name,
                cause.token,
                cause.site.line,
                cause.site.column,
                detail_token,
                detail_site.line,
                detail_site.column
            ),
        );
    }
}
