//! AST node definitions
//!
//! The tree arrives fully built from the parser. Declarations are plain
//! structs; statements and expressions are closed enums so the backend
//! passes can pattern match exhaustively. Every expression node carries a
//! `NodeId`: the resolution pass keys its type and binding side tables on
//! it, and the code generator reads them back without the tree ever being
//! mutated.

use crate::span::Span;
use crate::ty::Type;
use serde::{Deserialize, Serialize};

/// Unique handle of an expression node within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Hands out fresh node ids. The parser owns one per compilation; tests
/// construct their own.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    /// Create a generator starting at id 0
    pub fn new() -> Self {
        NodeIdGen::default()
    }

    /// Allocate the next id
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Name of the designated entry method on the entry class.
pub const ENTRY_METHOD: &str = "main";

/// Reserved name of the synthetic wrapper class the code generator emits.
/// The resolution pass rejects user classes with this name, so at most one
/// artifact ever carries it.
pub const ENTRY_WRAPPER: &str = "MicaMain";

/// A whole program: one distinguished entry class plus the ordinary classes.
///
/// The entry class's `main` method is the designated entry point; the code
/// generator synthesizes a wrapper class that constructs the entry class
/// and invokes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The distinguished entry class
    pub entry: ClassDecl,
    /// All other declared classes, in source order
    pub classes: Vec<ClassDecl>,
    pub span: Span,
}

impl Program {
    /// All classes including the entry class, entry first.
    pub fn all_classes(&self) -> impl Iterator<Item = &ClassDecl> {
        std::iter::once(&self.entry).chain(self.classes.iter())
    }
}

/// A class declaration. Single inheritance; `parent` absent means the class
/// is a hierarchy root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Identifier,
    pub parent: Option<Identifier>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

impl ClassDecl {
    /// Find an own (non-inherited) method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name.name == name)
    }

    /// Find an own (non-inherited) field by name.
    pub fn field(&self, name: &str) -> Option<&VarDecl> {
        self.fields.iter().find(|f| f.name.name == name)
    }
}

/// A method declaration. Mica has no overloading: method names are unique
/// within a class. Every method ends by evaluating `return_expr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Identifier,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Statement>,
    pub return_expr: Expression,
    pub return_type: Type,
    pub span: Span,
}

impl MethodDecl {
    /// The Jasmin method descriptor, e.g. `(I[I)Z`.
    pub fn descriptor(&self) -> String {
        let params: String = self.params.iter().map(|p| p.ty.descriptor()).collect();
        format!("({}){}", params, self.return_type.descriptor())
    }
}

/// A variable declaration: a class field, a method parameter, or a local.
/// Which of the three it is depends on where it appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Identifier,
    pub ty: Type,
    pub span: Span,
}

/// A name occurrence. Declaration sites and use sites both carry their own
/// `NodeId`, so each occurrence gets its own resolution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(id: NodeId, name: impl Into<String>, span: Span) -> Self {
        Identifier {
            id,
            name: name.into(),
            span,
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `target = value;`
    Assign(Box<AssignStatement>),
    /// `{ ... }`
    Block(Block),
    /// `if (cond) then else alt`
    If(Box<IfStatement>),
    /// `while (cond) body`
    While(Box<WhileStatement>),
    /// `writeln(expr);` — the side-effecting output statement
    Print(Box<PrintStatement>),
    /// An expression in statement position (a call); its result is discarded
    Expr(Box<ExprStatement>),
}

/// An assignment. Targets are restricted by construction: only variables
/// and array elements are assignable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStatement {
    pub target: AssignTarget,
    pub value: Expression,
    pub span: Span,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    /// A named variable: local, parameter, or field
    Variable(Identifier),
    /// An array element: `array[index]`
    Element(Box<IndexExpression>),
}

/// A braced statement sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A conditional statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Statement,
    pub else_branch: Option<Statement>,
    pub span: Span,
}

/// A while loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Statement,
    pub span: Span,
}

/// The output statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStatement {
    pub argument: Expression,
    pub span: Span,
}

/// An expression evaluated for its side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStatement {
    pub expression: Expression,
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal
    Int(IntLiteral),
    /// Boolean literal
    Boolean(BooleanLiteral),
    /// String literal
    Str(StrLiteral),
    /// Variable reference
    Identifier(Identifier),
    /// The receiver object
    This(ThisExpr),
    /// Unary operation
    Unary(Box<UnaryExpression>),
    /// Binary operation
    Binary(Box<BinaryExpression>),
    /// Array element read: `array[index]`
    Index(Box<IndexExpression>),
    /// Array length read: `array.length`
    Length(Box<LengthExpression>),
    /// Method call: `receiver.method(args)`
    Call(Box<CallExpression>),
    /// Object allocation: `new Class()`
    NewObject(NewObjectExpression),
    /// Array allocation: `new elem[size]`
    NewArray(Box<NewArrayExpression>),
}

impl Expression {
    /// The node id of this expression.
    pub fn id(&self) -> NodeId {
        match self {
            Expression::Int(e) => e.id,
            Expression::Boolean(e) => e.id,
            Expression::Str(e) => e.id,
            Expression::Identifier(e) => e.id,
            Expression::This(e) => e.id,
            Expression::Unary(e) => e.id,
            Expression::Binary(e) => e.id,
            Expression::Index(e) => e.id,
            Expression::Length(e) => e.id,
            Expression::Call(e) => e.id,
            Expression::NewObject(e) => e.id,
            Expression::NewArray(e) => e.id,
        }
    }

    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Int(e) => e.span,
            Expression::Boolean(e) => e.span,
            Expression::Str(e) => e.span,
            Expression::Identifier(e) => e.span,
            Expression::This(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Length(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::NewObject(e) => e.span,
            Expression::NewArray(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntLiteral {
    pub id: NodeId,
    pub value: i32,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub id: NodeId,
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrLiteral {
    pub id: NodeId,
    pub value: String,
    pub span: Span,
}

/// `this`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisExpr {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub id: NodeId,
    pub operator: UnaryOp,
    pub operand: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub id: NodeId,
    pub operator: BinaryOp,
    pub left: Expression,
    pub right: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpression {
    pub id: NodeId,
    pub array: Expression,
    pub index: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthExpression {
    pub id: NodeId,
    pub array: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub id: NodeId,
    pub receiver: Expression,
    pub method: Identifier,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObjectExpression {
    pub id: NodeId,
    pub class: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArrayExpression {
    pub id: NodeId,
    pub element: Type,
    pub size: Expression,
    pub span: Span,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Boolean not
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Whether the operator yields a boolean.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne
        )
    }

    /// Whether the operator is `&&` or `||`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_gen_is_sequential() {
        let mut ids = NodeIdGen::new();
        assert_eq!(ids.fresh(), NodeId(0));
        assert_eq!(ids.fresh(), NodeId(1));
        assert_eq!(ids.fresh(), NodeId(2));
    }

    #[test]
    fn test_method_descriptor() {
        let mut ids = NodeIdGen::new();
        let method = MethodDecl {
            name: Identifier::new(ids.fresh(), "dist", Span::dummy()),
            params: vec![
                VarDecl {
                    name: Identifier::new(ids.fresh(), "p", Span::dummy()),
                    ty: Type::class("Point"),
                    span: Span::dummy(),
                },
                VarDecl {
                    name: Identifier::new(ids.fresh(), "scale", Span::dummy()),
                    ty: Type::Int,
                    span: Span::dummy(),
                },
            ],
            locals: vec![],
            body: vec![],
            return_expr: Expression::Int(IntLiteral {
                id: ids.fresh(),
                value: 0,
                span: Span::dummy(),
            }),
            return_type: Type::Int,
            span: Span::dummy(),
        };
        assert_eq!(method.descriptor(), "(LPoint;I)I");
    }
}
