//! AST and source location types for the Ocelot language.
//!
//! This crate defines the tree the parser hands to the semantic analyses:
//! declarations (globals, functions, interfaces, implementations), statements,
//! expressions, and the type annotations the source syntax allows. The tree is
//! a plain owned structure with no back-references; analyses borrow it
//! read-only.

mod ast;
mod source;


pub use ast::{
    AssignOp, AssignStmt, BinaryOp, CaseLabel, DoWhileStmt, Expr, ForClause, ForStmt, FuncParam,
    FunctionDecl, GlobalDecl, IfStmt, ImplementationDecl, InterfaceDecl, LetStmt, MethodDecl,
    ObjectSpelling, Program, ReturnStmt, Stmt, SuffixToken, SwitchCase, SwitchStmt, TypeAnnotation,
    TypeSuffixes, ValueType, VectorShape, WhileStmt,
};
pub use source::SourceLoc;
