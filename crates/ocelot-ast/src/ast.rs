//! AST node definitions.
//!
//! Child ownership is exclusive: `Box` for single children, `Vec` for
//! sequences, `Option` for nullable slots (a `for` without a condition, a
//! message send whose receiver failed to parse). Statement bodies are plain
//! `Vec<Stmt>`; a missing `else` is an empty vector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::SourceLoc;

/// Base value types of the language.
///
/// `Function` marks a function name used in value position; `Unknown` marks a
/// failed inference and suppresses cascading diagnostics downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    I32,
    Bool,
    Void,
    Function,
    Unknown,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::I32 => "i32",
            ValueType::Bool => "bool",
            ValueType::Void => "void",
            ValueType::Function => "function",
            ValueType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    /// Bitwise and shift operators.
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment statement operators, including the update forms `++`/`--`.
///
/// `Other` carries an operator token the parser recognized lexically but the
/// language does not support; the body validator diagnoses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    Increment,
    Decrement,
    Other(String),
}

impl AssignOp {
    pub fn as_str(&self) -> &str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::RemAssign => "%=",
            AssignOp::BitAndAssign => "&=",
            AssignOp::BitOrAssign => "|=",
            AssignOp::BitXorAssign => "^=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::Increment => "++",
            AssignOp::Decrement => "--",
            AssignOp::Other(text) => text,
        }
    }

    /// The compound forms `+= -= *= /= %= &= |= ^= <<= >>=`.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            AssignOp::AddAssign
                | AssignOp::SubAssign
                | AssignOp::MulAssign
                | AssignOp::DivAssign
                | AssignOp::RemAssign
                | AssignOp::BitAndAssign
                | AssignOp::BitOrAssign
                | AssignOp::BitXorAssign
                | AssignOp::ShlAssign
                | AssignOp::ShrAssign
        )
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vector shape of a vector-annotated type (`i32x4`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VectorShape {
    /// Base spelling as written in the annotation (`i32` in `i32x4`).
    pub base_spelling: String,
    /// Lane count, at least 1.
    pub lanes: u32,
}

/// Object-typed annotation spellings that admit generic, pointer, and
/// nullability suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectSpelling {
    Id,
    Class,
    Instancetype,
}

/// A suffix or declarator token with its own location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixToken {
    pub text: String,
    pub loc: SourceLoc,
}

/// Suffix tokens attached to one type annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSuffixes {
    /// Generic suffix (`<...>`); the text may be empty when the parser could
    /// not recover the spelling.
    pub generic: Option<SuffixToken>,
    /// Pointer declarator tokens (`*`).
    pub pointer_declarators: Vec<SuffixToken>,
    /// Nullability tokens (`_Nullable`, `_Nonnull`).
    pub nullability: Vec<SuffixToken>,
}

/// A parameter or return type annotation as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub ty: ValueType,
    pub vector: Option<VectorShape>,
    /// Present when the annotation was spelled `id`, `Class`, or
    /// `instancetype`.
    pub object_spelling: Option<ObjectSpelling>,
    pub suffixes: TypeSuffixes,
}

impl TypeAnnotation {
    pub fn scalar(ty: ValueType) -> Self {
        Self {
            ty,
            vector: None,
            object_spelling: None,
            suffixes: TypeSuffixes::default(),
        }
    }

    pub fn vector(ty: ValueType, base_spelling: impl Into<String>, lanes: u32) -> Self {
        Self {
            ty,
            vector: Some(VectorShape {
                base_spelling: base_spelling.into(),
                lanes,
            }),
            object_spelling: None,
            suffixes: TypeSuffixes::default(),
        }
    }
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Number {
        value: i32,
        loc: SourceLoc,
    },
    Bool {
        value: bool,
        loc: SourceLoc,
    },
    Nil {
        loc: SourceLoc,
    },
    Identifier {
        name: String,
        loc: SourceLoc,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        loc: SourceLoc,
    },
    Conditional {
        condition: Box<Expr>,
        then_value: Box<Expr>,
        else_value: Box<Expr>,
        loc: SourceLoc,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        loc: SourceLoc,
    },
    MessageSend {
        receiver: Option<Box<Expr>>,
        selector: String,
        args: Vec<Expr>,
        loc: SourceLoc,
    },
}

impl Expr {
    pub fn loc(&self) -> SourceLoc {
        match self {
            Expr::Number { loc, .. }
            | Expr::Bool { loc, .. }
            | Expr::Nil { loc }
            | Expr::Identifier { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::Conditional { loc, .. }
            | Expr::Call { loc, .. }
            | Expr::MessageSend { loc, .. } => *loc,
        }
    }
}

/// `let name = value;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetStmt {
    pub name: String,
    pub value: Expr,
    pub loc: SourceLoc,
}

/// `target op value;` — `value` is absent for the update forms `++`/`--`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: String,
    pub op: AssignOp,
    pub value: Option<Expr>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    /// Empty when the `if` has no `else`.
    pub else_body: Vec<Stmt>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoWhileStmt {
    pub body: Vec<Stmt>,
    pub condition: Expr,
    pub loc: SourceLoc,
}

/// Init and step clauses of a `for` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForClause {
    None,
    Expr(Expr),
    Let(LetStmt),
    Assign(AssignStmt),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: ForClause,
    pub condition: Option<Expr>,
    pub step: ForClause,
    pub body: Vec<Stmt>,
    pub loc: SourceLoc,
}

/// A `case`/`default` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseLabel {
    Value { value: i32, loc: SourceLoc },
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub label: CaseLabel,
    pub body: Vec<Stmt>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub condition: Expr,
    pub cases: Vec<SwitchCase>,
    pub loc: SourceLoc,
}

/// Statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
    Expr(Expr),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(Box<ForStmt>),
    Switch(SwitchStmt),
    Block(Vec<Stmt>),
    Break { loc: SourceLoc },
    Continue { loc: SourceLoc },
    Empty,
}

/// `int name = value;` at file scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub name: String,
    pub value: Expr,
    pub loc: SourceLoc,
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncParam {
    pub name: String,
    pub annotation: TypeAnnotation,
    pub loc: SourceLoc,
}

/// A function declaration; a prototype has no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub return_annotation: TypeAnnotation,
    pub body: Vec<Stmt>,
    pub is_prototype: bool,
    /// The `pure` annotation on this declaration.
    pub is_pure: bool,
    pub loc: SourceLoc,
}

/// A method declaration inside an interface or implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub selector: String,
    pub params: Vec<FuncParam>,
    pub return_annotation: TypeAnnotation,
    pub is_class_method: bool,
    /// Interfaces declare bodiless methods; implementations define them.
    pub body: Option<Vec<Stmt>>,
    pub loc: SourceLoc,
}

impl MethodDecl {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub super_name: Option<String>,
    pub methods: Vec<MethodDecl>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
    pub loc: SourceLoc,
}

/// A whole parsed program, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub globals: Vec<GlobalDecl>,
    pub functions: Vec<FunctionDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub implementations: Vec<ImplementationDecl>,
}
