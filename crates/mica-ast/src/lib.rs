//! Mica AST
//!
//! Node definitions for the Mica language, a small class-based language
//! compiled to stack-machine assembly. The tree is produced by an external
//! parser; this crate defines the shape the backend passes consume:
//!
//! - AST nodes as closed tagged variants (no visitor dispatch)
//! - `NodeId` handles on expression nodes, so analysis results live in
//!   side tables instead of mutable node fields
//! - the `Type` model with Jasmin descriptor rendering

pub mod ast;
pub mod span;
pub mod ty;

pub use ast::{
    AssignStatement, AssignTarget, BinaryExpression, BinaryOp, Block, BooleanLiteral, ENTRY_METHOD,
    ENTRY_WRAPPER, CallExpression, ClassDecl, Expression, ExprStatement, Identifier, IfStatement,
    IndexExpression, IntLiteral, LengthExpression, MethodDecl, NewArrayExpression,
    NewObjectExpression, NodeId, NodeIdGen, PrintStatement, Program, Statement, StrLiteral,
    ThisExpr, UnaryExpression, UnaryOp, VarDecl, WhileStatement,
};
pub use span::Span;
pub use ty::Type;
