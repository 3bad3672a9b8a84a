//! Shared AST construction helpers for tests.
//!
//! The middle-end has no parser, so tests build trees directly; these
//! helpers keep them close to the source they stand for. Locations are
//! passed explicitly wherever an assertion depends on them.

use ocelot_ast::{
    AssignOp, AssignStmt, BinaryOp, CaseLabel, Expr, ForClause, FuncParam, FunctionDecl,
    GlobalDecl, IfStmt, LetStmt, Program, ReturnStmt, SourceLoc, Stmt, SwitchCase, SwitchStmt,
    TypeAnnotation, ValueType, WhileStmt,
};

pub fn at(line: u32, column: u32) -> SourceLoc {
    SourceLoc::new(line, column)
}

pub fn num(value: i32, line: u32, column: u32) -> Expr {
    Expr::Number {
        value,
        loc: at(line, column),
    }
}

pub fn boolean(value: bool, line: u32, column: u32) -> Expr {
    Expr::Bool {
        value,
        loc: at(line, column),
    }
}

pub fn nil(line: u32, column: u32) -> Expr {
    Expr::Nil {
        loc: at(line, column),
    }
}

pub fn ident(name: &str, line: u32, column: u32) -> Expr {
    Expr::Identifier {
        name: name.to_string(),
        loc: at(line, column),
    }
}

pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, line: u32, column: u32) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        loc: at(line, column),
    }
}

pub fn conditional(condition: Expr, then_value: Expr, else_value: Expr, line: u32, column: u32) -> Expr {
    Expr::Conditional {
        condition: Box::new(condition),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
        loc: at(line, column),
    }
}

pub fn call(callee: &str, args: Vec<Expr>, line: u32, column: u32) -> Expr {
    Expr::Call {
        callee: callee.to_string(),
        args,
        loc: at(line, column),
    }
}

pub fn send(receiver: Expr, selector: &str, args: Vec<Expr>, line: u32, column: u32) -> Expr {
    Expr::MessageSend {
        receiver: Some(Box::new(receiver)),
        selector: selector.to_string(),
        args,
        loc: at(line, column),
    }
}

pub fn let_stmt(name: &str, value: Expr, line: u32, column: u32) -> Stmt {
    Stmt::Let(LetStmt {
        name: name.to_string(),
        value,
        loc: at(line, column),
    })
}

pub fn assign(target: &str, op: AssignOp, value: Expr, line: u32, column: u32) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: target.to_string(),
        op,
        value: Some(value),
        loc: at(line, column),
    })
}

pub fn update(target: &str, op: AssignOp, line: u32, column: u32) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: target.to_string(),
        op,
        value: None,
        loc: at(line, column),
    })
}

pub fn ret(value: Expr, line: u32, column: u32) -> Stmt {
    Stmt::Return(ReturnStmt {
        value: Some(value),
        loc: at(line, column),
    })
}

pub fn ret_void(line: u32, column: u32) -> Stmt {
    Stmt::Return(ReturnStmt {
        value: None,
        loc: at(line, column),
    })
}

pub fn expr_stmt(value: Expr) -> Stmt {
    Stmt::Expr(value)
}

pub fn if_stmt(condition: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt>, line: u32, column: u32) -> Stmt {
    Stmt::If(IfStmt {
        condition,
        then_body,
        else_body,
        loc: at(line, column),
    })
}

pub fn while_stmt(condition: Expr, body: Vec<Stmt>, line: u32, column: u32) -> Stmt {
    Stmt::While(WhileStmt {
        condition,
        body,
        loc: at(line, column),
    })
}

pub fn switch_stmt(condition: Expr, cases: Vec<SwitchCase>, line: u32, column: u32) -> Stmt {
    Stmt::Switch(SwitchStmt {
        condition,
        cases,
        loc: at(line, column),
    })
}

pub fn case_arm(value: i32, body: Vec<Stmt>, line: u32, column: u32) -> SwitchCase {
    SwitchCase {
        label: CaseLabel::Value {
            value,
            loc: at(line, column),
        },
        body,
        loc: at(line, column),
    }
}

pub fn default_arm(body: Vec<Stmt>, line: u32, column: u32) -> SwitchCase {
    SwitchCase {
        label: CaseLabel::Default,
        body,
        loc: at(line, column),
    }
}

pub fn for_clause_assign(target: &str, op: AssignOp, value: Expr, line: u32, column: u32) -> ForClause {
    ForClause::Assign(AssignStmt {
        target: target.to_string(),
        op,
        value: Some(value),
        loc: at(line, column),
    })
}

pub fn param(name: &str, ty: ValueType, line: u32, column: u32) -> FuncParam {
    FuncParam {
        name: name.to_string(),
        annotation: TypeAnnotation::scalar(ty),
        loc: at(line, column),
    }
}

pub fn vector_param(name: &str, ty: ValueType, spelling: &str, lanes: u32, line: u32, column: u32) -> FuncParam {
    FuncParam {
        name: name.to_string(),
        annotation: TypeAnnotation::vector(ty, spelling, lanes),
        loc: at(line, column),
    }
}

pub fn function(
    name: &str,
    params: Vec<FuncParam>,
    return_type: ValueType,
    body: Vec<Stmt>,
    line: u32,
    column: u32,
) -> FunctionDecl {
    FunctionDecl {
        name: name.to_string(),
        params,
        return_annotation: TypeAnnotation::scalar(return_type),
        body,
        is_prototype: false,
        is_pure: false,
        loc: at(line, column),
    }
}

pub fn prototype(
    name: &str,
    params: Vec<FuncParam>,
    return_type: ValueType,
    line: u32,
    column: u32,
) -> FunctionDecl {
    FunctionDecl {
        body: Vec::new(),
        is_prototype: true,
        ..function(name, params, return_type, Vec::new(), line, column)
    }
}

pub fn pure_function(
    name: &str,
    params: Vec<FuncParam>,
    return_type: ValueType,
    body: Vec<Stmt>,
    line: u32,
    column: u32,
) -> FunctionDecl {
    FunctionDecl {
        is_pure: true,
        ..function(name, params, return_type, body, line, column)
    }
}

pub fn global(name: &str, value: Expr, line: u32, column: u32) -> GlobalDecl {
    GlobalDecl {
        name: name.to_string(),
        value,
        loc: at(line, column),
    }
}

pub fn program_with(globals: Vec<GlobalDecl>, functions: Vec<FunctionDecl>) -> Program {
    Program {
        globals,
        functions,
        ..Program::default()
    }
}
