//! Atomic memory-order mapping and vector-type lowering summaries.
//!
//! Both are small deterministic derivations read by downstream consumers:
//! the first maps every assignment operator in the program to the memory
//! order its lowering uses, the second counts vector annotations on the
//! surface's function entries.

use serde::{Deserialize, Serialize};

use ocelot_ast::{AssignOp, ForClause, Program, Stmt, ValueType};

use crate::surface::IntegrationSurface;

/// Memory orders assignment operators lower to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryOrder {
    Relaxed,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
    Unsupported,
}

impl MemoryOrder {
    pub fn name(self) -> &'static str {
        match self {
            MemoryOrder::Relaxed => "relaxed",
            MemoryOrder::Acquire => "acquire",
            MemoryOrder::Release => "release",
            MemoryOrder::AcqRel => "acq_rel",
            MemoryOrder::SeqCst => "seq_cst",
            MemoryOrder::Unsupported => "unsupported",
        }
    }
}

/// Total mapping from assignment operator to memory order.
pub fn memory_order_for_operator(op: &AssignOp) -> MemoryOrder {
    match op {
        AssignOp::Assign | AssignOp::BitOrAssign | AssignOp::BitXorAssign => MemoryOrder::Release,
        AssignOp::BitAndAssign | AssignOp::ShlAssign | AssignOp::ShrAssign => MemoryOrder::Acquire,
        AssignOp::AddAssign | AssignOp::SubAssign | AssignOp::Increment | AssignOp::Decrement => {
            MemoryOrder::AcqRel
        }
        AssignOp::MulAssign | AssignOp::DivAssign | AssignOp::RemAssign => MemoryOrder::SeqCst,
        AssignOp::Other(_) => MemoryOrder::Unsupported,
    }
}

/// Hint appended to assignment diagnostics.
pub(crate) fn memory_order_hint(op: &AssignOp) -> String {
    match memory_order_for_operator(op) {
        MemoryOrder::Unsupported => {
            format!("atomic memory-order mapping unavailable for operator '{op}'")
        }
        order => format!(
            "atomic memory-order mapping for operator '{op}' uses '{}'",
            order.name()
        ),
    }
}

/// Occurrence counts of each mapping outcome across every assignment
/// (including `for`-clause assignments) in all function bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryOrderSummary {
    pub relaxed: usize,
    pub acquire: usize,
    pub release: usize,
    pub acq_rel: usize,
    pub seq_cst: usize,
    pub unsupported: usize,
    pub deterministic: bool,
}

impl Default for MemoryOrderSummary {
    fn default() -> Self {
        Self {
            relaxed: 0,
            acquire: 0,
            release: 0,
            acq_rel: 0,
            seq_cst: 0,
            unsupported: 0,
            deterministic: true,
        }
    }
}

impl MemoryOrderSummary {
    fn record(&mut self, op: &AssignOp) {
        match memory_order_for_operator(op) {
            MemoryOrder::Relaxed => self.relaxed += 1,
            MemoryOrder::Acquire => self.acquire += 1,
            MemoryOrder::Release => self.release += 1,
            MemoryOrder::AcqRel => self.acq_rel += 1,
            MemoryOrder::SeqCst => self.seq_cst += 1,
            MemoryOrder::Unsupported => {
                self.unsupported += 1;
                self.deterministic = false;
            }
        }
    }
}

fn collect_memory_orders(statements: &[Stmt], summary: &mut MemoryOrderSummary) {
    for stmt in statements {
        collect_memory_orders_in_stmt(stmt, summary);
    }
}

fn collect_memory_orders_in_stmt(stmt: &Stmt, summary: &mut MemoryOrderSummary) {
    match stmt {
        Stmt::Assign(assign) => summary.record(&assign.op),
        Stmt::If(if_stmt) => {
            collect_memory_orders(&if_stmt.then_body, summary);
            collect_memory_orders(&if_stmt.else_body, summary);
        }
        Stmt::DoWhile(do_while) => collect_memory_orders(&do_while.body, summary),
        Stmt::For(for_stmt) => {
            if let ForClause::Assign(assign) = &for_stmt.init {
                summary.record(&assign.op);
            }
            if let ForClause::Assign(assign) = &for_stmt.step {
                summary.record(&assign.op);
            }
            collect_memory_orders(&for_stmt.body, summary);
        }
        Stmt::Switch(switch) => {
            for case in &switch.cases {
                collect_memory_orders(&case.body, summary);
            }
        }
        Stmt::While(while_stmt) => collect_memory_orders(&while_stmt.body, summary),
        Stmt::Block(body) => collect_memory_orders(body, summary),
        Stmt::Let(_) | Stmt::Return(_) | Stmt::Expr(_) | Stmt::Break { .. }
        | Stmt::Continue { .. } | Stmt::Empty => {}
    }
}

/// Count the mapping outcome of every assignment in `program`.
pub fn build_memory_order_summary(program: &Program) -> MemoryOrderSummary {
    let mut summary = MemoryOrderSummary::default();
    for function in &program.functions {
        collect_memory_orders(&function.body, &mut summary);
    }
    summary
}

/// Counts of vector annotations on the surface's function entries, grouped by
/// position, base type, and lane count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorLoweringSummary {
    pub return_annotations: usize,
    pub param_annotations: usize,
    pub bool_annotations: usize,
    pub i32_annotations: usize,
    pub lane2_annotations: usize,
    pub lane4_annotations: usize,
    pub lane8_annotations: usize,
    pub lane16_annotations: usize,
    pub unsupported_annotations: usize,
    pub deterministic: bool,
}

impl Default for VectorLoweringSummary {
    fn default() -> Self {
        Self {
            return_annotations: 0,
            param_annotations: 0,
            bool_annotations: 0,
            i32_annotations: 0,
            lane2_annotations: 0,
            lane4_annotations: 0,
            lane8_annotations: 0,
            lane16_annotations: 0,
            unsupported_annotations: 0,
            deterministic: true,
        }
    }
}

impl VectorLoweringSummary {
    fn record(&mut self, base: ValueType, lanes: u32, is_return: bool) {
        if is_return {
            self.return_annotations += 1;
        } else {
            self.param_annotations += 1;
        }

        match base {
            ValueType::Bool => self.bool_annotations += 1,
            ValueType::I32 => self.i32_annotations += 1,
            _ => {
                self.unsupported_annotations += 1;
                self.deterministic = false;
            }
        }

        match lanes {
            2 => self.lane2_annotations += 1,
            4 => self.lane4_annotations += 1,
            8 => self.lane8_annotations += 1,
            16 => self.lane16_annotations += 1,
            _ => {
                self.unsupported_annotations += 1;
                self.deterministic = false;
            }
        }
    }
}

/// Count vector annotations across the surface's function entries. Counts are
/// order-independent; a malformed entry clears `deterministic` and is skipped.
pub fn build_vector_lowering_summary(surface: &IntegrationSurface) -> VectorLoweringSummary {
    let mut summary = VectorLoweringSummary::default();
    for info in surface.functions.values() {
        if !info.is_well_formed() {
            summary.deterministic = false;
            continue;
        }

        if let Some(shape) = &info.return_type.vector {
            summary.record(info.return_type.base, shape.lanes, true);
        }
        for param in &info.params {
            if let Some(shape) = &param.ty.vector {
                summary.record(param.ty.base, shape.lanes, false);
            }
        }
    }
    summary
}
