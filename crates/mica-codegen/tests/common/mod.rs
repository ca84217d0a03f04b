//! Shared AST construction helpers for the integration tests
//!
//! There is no parser in this workspace; tests build trees by hand through
//! this builder, which hands out node ids the way a parser would.

#![allow(dead_code)]

use mica_ast::*;

pub struct AstBuilder {
    ids: NodeIdGen,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder {
            ids: NodeIdGen::new(),
        }
    }

    pub fn ident(&mut self, name: &str) -> Identifier {
        Identifier::new(self.ids.fresh(), name, Span::dummy())
    }

    pub fn int(&mut self, value: i32) -> Expression {
        Expression::Int(IntLiteral {
            id: self.ids.fresh(),
            value,
            span: Span::dummy(),
        })
    }

    pub fn boolean(&mut self, value: bool) -> Expression {
        Expression::Boolean(BooleanLiteral {
            id: self.ids.fresh(),
            value,
            span: Span::dummy(),
        })
    }

    pub fn string(&mut self, value: &str) -> Expression {
        Expression::Str(StrLiteral {
            id: self.ids.fresh(),
            value: value.to_string(),
            span: Span::dummy(),
        })
    }

    pub fn var(&mut self, name: &str) -> Expression {
        Expression::Identifier(self.ident(name))
    }

    pub fn this(&mut self) -> Expression {
        Expression::This(ThisExpr {
            id: self.ids.fresh(),
            span: Span::dummy(),
        })
    }

    pub fn unary(&mut self, operator: UnaryOp, operand: Expression) -> Expression {
        Expression::Unary(Box::new(UnaryExpression {
            id: self.ids.fresh(),
            operator,
            operand,
            span: Span::dummy(),
        }))
    }

    pub fn binary(&mut self, operator: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::Binary(Box::new(BinaryExpression {
            id: self.ids.fresh(),
            operator,
            left,
            right,
            span: Span::dummy(),
        }))
    }

    pub fn index(&mut self, array: Expression, index: Expression) -> Expression {
        Expression::Index(Box::new(IndexExpression {
            id: self.ids.fresh(),
            array,
            index,
            span: Span::dummy(),
        }))
    }

    pub fn length(&mut self, array: Expression) -> Expression {
        Expression::Length(Box::new(LengthExpression {
            id: self.ids.fresh(),
            array,
            span: Span::dummy(),
        }))
    }

    pub fn call(&mut self, receiver: Expression, method: &str, args: Vec<Expression>) -> Expression {
        let method = self.ident(method);
        Expression::Call(Box::new(CallExpression {
            id: self.ids.fresh(),
            receiver,
            method,
            args,
            span: Span::dummy(),
        }))
    }

    pub fn new_object(&mut self, class: &str) -> Expression {
        let class = self.ident(class);
        Expression::NewObject(NewObjectExpression {
            id: self.ids.fresh(),
            class,
            span: Span::dummy(),
        })
    }

    pub fn new_array(&mut self, element: Type, size: Expression) -> Expression {
        Expression::NewArray(Box::new(NewArrayExpression {
            id: self.ids.fresh(),
            element,
            size,
            span: Span::dummy(),
        }))
    }

    pub fn assign(&mut self, name: &str, value: Expression) -> Statement {
        let target = AssignTarget::Variable(self.ident(name));
        Statement::Assign(Box::new(AssignStatement {
            target,
            value,
            span: Span::dummy(),
        }))
    }

    pub fn assign_element(
        &mut self,
        array: Expression,
        index: Expression,
        value: Expression,
    ) -> Statement {
        let target = AssignTarget::Element(Box::new(IndexExpression {
            id: self.ids.fresh(),
            array,
            index,
            span: Span::dummy(),
        }));
        Statement::Assign(Box::new(AssignStatement {
            target,
            value,
            span: Span::dummy(),
        }))
    }

    pub fn if_stmt(
        &mut self,
        condition: Expression,
        then_branch: Statement,
        else_branch: Option<Statement>,
    ) -> Statement {
        Statement::If(Box::new(IfStatement {
            condition,
            then_branch,
            else_branch,
            span: Span::dummy(),
        }))
    }

    pub fn while_stmt(&mut self, condition: Expression, body: Statement) -> Statement {
        Statement::While(Box::new(WhileStatement {
            condition,
            body,
            span: Span::dummy(),
        }))
    }

    pub fn print(&mut self, argument: Expression) -> Statement {
        Statement::Print(Box::new(PrintStatement {
            argument,
            span: Span::dummy(),
        }))
    }

    pub fn expr_stmt(&mut self, expression: Expression) -> Statement {
        Statement::Expr(Box::new(ExprStatement {
            expression,
            span: Span::dummy(),
        }))
    }

    pub fn block(&mut self, statements: Vec<Statement>) -> Statement {
        Statement::Block(Block {
            statements,
            span: Span::dummy(),
        })
    }

    pub fn var_decl(&mut self, name: &str, ty: Type) -> VarDecl {
        VarDecl {
            name: self.ident(name),
            ty,
            span: Span::dummy(),
        }
    }

    pub fn method(
        &mut self,
        name: &str,
        params: Vec<VarDecl>,
        locals: Vec<VarDecl>,
        body: Vec<Statement>,
        return_expr: Expression,
        return_type: Type,
    ) -> MethodDecl {
        MethodDecl {
            name: self.ident(name),
            params,
            locals,
            body,
            return_expr,
            return_type,
            span: Span::dummy(),
        }
    }

    /// A method with no parameters, locals, or body: just a return.
    pub fn getter(&mut self, name: &str, return_expr: Expression, return_type: Type) -> MethodDecl {
        self.method(name, vec![], vec![], vec![], return_expr, return_type)
    }

    pub fn class(
        &mut self,
        name: &str,
        parent: Option<&str>,
        fields: Vec<VarDecl>,
        methods: Vec<MethodDecl>,
    ) -> ClassDecl {
        ClassDecl {
            name: self.ident(name),
            parent: parent.map(|p| self.ident(p)),
            fields,
            methods,
            span: Span::dummy(),
        }
    }

    /// An entry class whose `main` returns the given expression.
    pub fn entry_class(
        &mut self,
        name: &str,
        locals: Vec<VarDecl>,
        body: Vec<Statement>,
        return_expr: Expression,
    ) -> ClassDecl {
        let main = self.method(ENTRY_METHOD, vec![], locals, body, return_expr, Type::Int);
        self.class(name, None, vec![], vec![main])
    }
}

pub fn program(entry: ClassDecl, classes: Vec<ClassDecl>) -> Program {
    Program {
        entry,
        classes,
        span: Span::dummy(),
    }
}
