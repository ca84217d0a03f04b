//! The resolution pass
//!
//! Two logical passes over the AST. The first registers every class into
//! the registry and the global scope, so forward references resolve; the
//! second walks each class's fields, methods, and statement trees, pushing
//! and popping scopes, assigning local slots, and resolving every
//! identifier, member access, and call.
//!
//! Results land in an [`Analysis`]: side tables keyed by expression
//! `NodeId`, holding the resolved type of every expression and, for
//! identifiers, whether the name is a local (with its slot) or a field
//! (with its declaring class). The AST itself is never touched, so running
//! the pass twice over the same tree yields identical results.
//!
//! Errors never abort the walk; they are collected and returned as a batch
//! so one run surfaces as many diagnostics as possible.

use crate::error::SemaError;
use crate::registry::ClassRegistry;
use crate::symbols::{ScopeKind, ScopeTable, SymbolEntry};
use mica_ast::{
    AssignTarget, BinaryOp, CallExpression, ClassDecl, Expression, IndexExpression, MethodDecl,
    NodeId, Program, Span, Statement, Type, UnaryOp, VarDecl, ENTRY_METHOD, ENTRY_WRAPPER,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// How an identifier occurrence resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A method parameter or local variable, stored in a slot.
    Local { slot: u16, ty: Type },
    /// A field of the receiver, own or inherited. `class` is the declaring
    /// class, which field instructions must name.
    Field { class: String, ty: Type },
}

impl Binding {
    /// The type of the bound variable.
    pub fn ty(&self) -> &Type {
        match self {
            Binding::Local { ty, .. } => ty,
            Binding::Field { ty, .. } => ty,
        }
    }
}

/// The annotations produced by resolution, keyed by expression node id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Analysis {
    types: FxHashMap<NodeId, Type>,
    bindings: FxHashMap<NodeId, Binding>,
}

impl Analysis {
    /// The resolved type of an expression, if resolution reached it.
    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    /// The binding of an identifier occurrence (use sites and parameter /
    /// local declaration sites).
    pub fn binding_of(&self, id: NodeId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    fn set_type(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    fn set_binding(&mut self, id: NodeId, binding: Binding) {
        self.bindings.insert(id, binding);
    }
}

/// A successful resolution: the finalized registry plus the annotations.
#[derive(Debug)]
pub struct Resolution<'p> {
    /// The class registry, immutable from here on.
    pub registry: ClassRegistry<'p>,
    /// Side tables the code generator consumes.
    pub analysis: Analysis,
}

/// Resolve a program.
///
/// Returns every diagnostic recorded during the run; `Ok` only when there
/// were none. All state is local to this call.
pub fn resolve(program: &Program) -> Result<Resolution<'_>, Vec<SemaError>> {
    let mut resolver = Resolver::new();
    let registry = resolver.collect_classes(program);
    resolver.resolve_members(program, &registry);

    if resolver.errors.is_empty() {
        Ok(Resolution {
            registry,
            analysis: resolver.analysis,
        })
    } else {
        Err(resolver.errors)
    }
}

struct Resolver {
    scopes: ScopeTable,
    analysis: Analysis,
    errors: Vec<SemaError>,
}

impl Resolver {
    fn new() -> Self {
        Resolver {
            scopes: ScopeTable::new(),
            analysis: Analysis::default(),
            errors: Vec::new(),
        }
    }

    /// Pass 1: register every class before resolving any member, so a class
    /// may reference one declared later.
    fn collect_classes<'p>(&mut self, program: &'p Program) -> ClassRegistry<'p> {
        self.scopes.push(ScopeKind::Global);

        let mut registry = ClassRegistry::new();
        for class in program.all_classes() {
            // The code generator owns this name for the wrapper artifact.
            if class.name.name == ENTRY_WRAPPER {
                self.errors.push(SemaError::ReservedClassName {
                    name: class.name.name.clone(),
                    span: class.name.span,
                });
            }
            match registry.register(class) {
                Ok(()) => {
                    // The global scope mirrors the registry; a duplicate
                    // was already reported by the register call.
                    let _ = self.scopes.define(SymbolEntry::Class {
                        name: class.name.name.clone(),
                    });
                }
                Err(err) => self.errors.push(err),
            }
        }

        self.errors.extend(registry.validate());

        match registry.resolve_method(&program.entry.name.name, ENTRY_METHOD) {
            Some((_, main)) => {
                // The wrapper invokes the entry method as `()I` with no
                // arguments on the stack.
                if !main.params.is_empty() || main.return_type != Type::Int {
                    self.errors.push(SemaError::TypeMismatch {
                        expected: "()I".to_string(),
                        found: main.descriptor(),
                        span: main.name.span,
                    });
                }
            }
            None => self.errors.push(SemaError::UnresolvedMember {
                class: program.entry.name.name.clone(),
                member: ENTRY_METHOD.to_string(),
                span: program.entry.name.span,
            }),
        }

        registry
    }

    /// Pass 2: resolve fields, methods, and bodies of every class.
    fn resolve_members<'p>(&mut self, program: &'p Program, registry: &ClassRegistry<'p>) {
        for class in program.all_classes() {
            self.resolve_class(class, registry);
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl, registry: &ClassRegistry<'_>) {
        self.scopes.push(ScopeKind::Class);

        for field in &class.fields {
            self.check_type(&field.ty, field.span, registry);
            let entry = SymbolEntry::Variable {
                name: field.name.name.clone(),
                ty: field.ty.clone(),
                slot: None,
            };
            if self.scopes.define(entry).is_err() {
                self.errors.push(SemaError::DuplicateMember {
                    name: field.name.name.clone(),
                    class: class.name.name.clone(),
                    span: field.name.span,
                });
            }
        }

        // No overloading: method names are unique within one class.
        let mut seen = FxHashSet::default();
        for method in &class.methods {
            if !seen.insert(method.name.name.as_str()) {
                self.errors.push(SemaError::DuplicateMember {
                    name: method.name.name.clone(),
                    class: class.name.name.clone(),
                    span: method.name.span,
                });
            }
        }

        for method in &class.methods {
            self.resolve_method(class, method, registry);
        }

        self.scopes.pop();
    }

    fn resolve_method(
        &mut self,
        class: &ClassDecl,
        method: &MethodDecl,
        registry: &ClassRegistry<'_>,
    ) {
        // Slot 0 is the receiver; parameters then locals own the next
        // consecutive slots in declaration order, all within the 16-bit
        // slot space of the method format.
        let needed = 1 + method.params.len() + method.locals.len();
        if needed > u16::MAX as usize {
            self.errors.push(SemaError::TooManyLocals {
                method: format!("{}.{}", class.name.name, method.name.name),
                count: needed,
                span: method.name.span,
            });
            return;
        }

        self.scopes.push(ScopeKind::Method);

        let mut slot: u16 = 1;
        for param in &method.params {
            self.declare_local(class, param, &mut slot, registry);
        }
        for local in &method.locals {
            self.declare_local(class, local, &mut slot, registry);
        }

        for stmt in &method.body {
            self.resolve_stmt(class, stmt, registry);
        }

        if let Some(ty) = self.resolve_expr(class, &method.return_expr, registry) {
            if !registry.is_assignable(&method.return_type, &ty) {
                self.errors.push(SemaError::TypeMismatch {
                    expected: method.return_type.to_string(),
                    found: ty.to_string(),
                    span: method.return_expr.span(),
                });
            }
        }

        self.scopes.pop();
    }

    fn declare_local(
        &mut self,
        class: &ClassDecl,
        decl: &VarDecl,
        slot: &mut u16,
        registry: &ClassRegistry<'_>,
    ) {
        self.check_type(&decl.ty, decl.span, registry);
        let entry = SymbolEntry::Variable {
            name: decl.name.name.clone(),
            ty: decl.ty.clone(),
            slot: Some(*slot),
        };
        match self.scopes.define(entry) {
            Ok(()) => {
                self.analysis.set_binding(
                    decl.name.id,
                    Binding::Local {
                        slot: *slot,
                        ty: decl.ty.clone(),
                    },
                );
            }
            Err(dup) => self.errors.push(SemaError::DuplicateMember {
                name: dup.name,
                class: class.name.name.clone(),
                span: decl.name.span,
            }),
        }
        *slot += 1;
    }

    /// A declared type must only mention declared classes.
    fn check_type(&mut self, ty: &Type, span: Span, registry: &ClassRegistry<'_>) {
        match ty {
            Type::Class(name) => {
                if registry.lookup(name).is_none() {
                    self.errors.push(SemaError::UnknownClass {
                        name: name.clone(),
                        span,
                    });
                }
            }
            Type::Array(element) => self.check_type(element, span, registry),
            _ => {}
        }
    }

    fn resolve_stmt(&mut self, class: &ClassDecl, stmt: &Statement, registry: &ClassRegistry<'_>) {
        match stmt {
            Statement::Assign(assign) => {
                let target_ty = match &assign.target {
                    AssignTarget::Variable(ident) => self.resolve_identifier(class, ident, registry),
                    AssignTarget::Element(index) => self.resolve_index(class, index, registry),
                };
                let value_ty = self.resolve_expr(class, &assign.value, registry);
                if let (Some(target), Some(value)) = (target_ty, value_ty) {
                    if !registry.is_assignable(&target, &value) {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: target.to_string(),
                            found: value.to_string(),
                            span: assign.value.span(),
                        });
                    }
                }
            }
            Statement::Block(block) => {
                self.scopes.push(ScopeKind::Block);
                for stmt in &block.statements {
                    self.resolve_stmt(class, stmt, registry);
                }
                self.scopes.pop();
            }
            Statement::If(if_stmt) => {
                self.check_condition(class, &if_stmt.condition, registry);
                self.resolve_stmt(class, &if_stmt.then_branch, registry);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.resolve_stmt(class, else_branch, registry);
                }
            }
            Statement::While(while_stmt) => {
                self.check_condition(class, &while_stmt.condition, registry);
                self.resolve_stmt(class, &while_stmt.body, registry);
            }
            Statement::Print(print) => {
                if let Some(ty) = self.resolve_expr(class, &print.argument, registry) {
                    if !matches!(ty, Type::Int | Type::Boolean | Type::Str) {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: "int, boolean, or string".to_string(),
                            found: ty.to_string(),
                            span: print.argument.span(),
                        });
                    }
                }
            }
            Statement::Expr(expr_stmt) => {
                self.resolve_expr(class, &expr_stmt.expression, registry);
            }
        }
    }

    fn check_condition(
        &mut self,
        class: &ClassDecl,
        condition: &Expression,
        registry: &ClassRegistry<'_>,
    ) {
        if let Some(ty) = self.resolve_expr(class, condition, registry) {
            if ty != Type::Boolean {
                self.errors.push(SemaError::TypeMismatch {
                    expected: Type::Boolean.to_string(),
                    found: ty.to_string(),
                    span: condition.span(),
                });
            }
        }
    }

    /// Resolve an expression, annotating its node with the resolved type.
    ///
    /// `None` means the type could not be determined; the cause has already
    /// been recorded and the walk continues best-effort.
    fn resolve_expr(
        &mut self,
        class: &ClassDecl,
        expr: &Expression,
        registry: &ClassRegistry<'_>,
    ) -> Option<Type> {
        match expr {
            Expression::Int(lit) => {
                self.analysis.set_type(lit.id, Type::Int);
                Some(Type::Int)
            }
            Expression::Boolean(lit) => {
                self.analysis.set_type(lit.id, Type::Boolean);
                Some(Type::Boolean)
            }
            Expression::Str(lit) => {
                self.analysis.set_type(lit.id, Type::Str);
                Some(Type::Str)
            }
            Expression::Identifier(ident) => self.resolve_identifier(class, ident, registry),
            Expression::This(this) => {
                let ty = Type::class(class.name.name.clone());
                self.analysis.set_type(this.id, ty.clone());
                Some(ty)
            }
            Expression::Unary(unary) => {
                let expected = match unary.operator {
                    UnaryOp::Neg => Type::Int,
                    UnaryOp::Not => Type::Boolean,
                };
                if let Some(ty) = self.resolve_expr(class, &unary.operand, registry) {
                    if ty != expected {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: expected.to_string(),
                            found: ty.to_string(),
                            span: unary.operand.span(),
                        });
                    }
                }
                self.analysis.set_type(unary.id, expected.clone());
                Some(expected)
            }
            Expression::Binary(binary) => {
                let left = self.resolve_expr(class, &binary.left, registry);
                let right = self.resolve_expr(class, &binary.right, registry);
                let result = self.binary_result(binary.operator, left, right, binary, registry);
                self.analysis.set_type(binary.id, result.clone());
                Some(result)
            }
            Expression::Index(index) => self.resolve_index(class, index, registry),
            Expression::Length(length) => {
                if let Some(ty) = self.resolve_expr(class, &length.array, registry) {
                    if !matches!(ty, Type::Array(_)) {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: "array".to_string(),
                            found: ty.to_string(),
                            span: length.array.span(),
                        });
                    }
                }
                self.analysis.set_type(length.id, Type::Int);
                Some(Type::Int)
            }
            Expression::Call(call) => self.resolve_call(class, call, registry),
            Expression::NewObject(alloc) => {
                if registry.lookup(&alloc.class.name).is_none() {
                    self.errors.push(SemaError::UnknownClass {
                        name: alloc.class.name.clone(),
                        span: alloc.class.span,
                    });
                    return None;
                }
                let ty = Type::class(alloc.class.name.clone());
                self.analysis.set_type(alloc.id, ty.clone());
                Some(ty)
            }
            Expression::NewArray(alloc) => {
                self.check_type(&alloc.element, alloc.span, registry);
                if let Some(ty) = self.resolve_expr(class, &alloc.size, registry) {
                    if ty != Type::Int {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: Type::Int.to_string(),
                            found: ty.to_string(),
                            span: alloc.size.span(),
                        });
                    }
                }
                let ty = Type::array(alloc.element.clone());
                self.analysis.set_type(alloc.id, ty.clone());
                Some(ty)
            }
        }
    }

    fn binary_result(
        &mut self,
        op: BinaryOp,
        left: Option<Type>,
        right: Option<Type>,
        binary: &mica_ast::BinaryExpression,
        registry: &ClassRegistry<'_>,
    ) -> Type {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                self.expect_operand(left, &Type::Int, binary.left.span());
                self.expect_operand(right, &Type::Int, binary.right.span());
                Type::Int
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.expect_operand(left, &Type::Int, binary.left.span());
                self.expect_operand(right, &Type::Int, binary.right.span());
                Type::Boolean
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if let (Some(l), Some(r)) = (&left, &right) {
                    let comparable =
                        registry.is_assignable(l, r) || registry.is_assignable(r, l);
                    if !comparable {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: l.to_string(),
                            found: r.to_string(),
                            span: binary.right.span(),
                        });
                    }
                }
                Type::Boolean
            }
            BinaryOp::And | BinaryOp::Or => {
                self.expect_operand(left, &Type::Boolean, binary.left.span());
                self.expect_operand(right, &Type::Boolean, binary.right.span());
                Type::Boolean
            }
        }
    }

    fn expect_operand(&mut self, found: Option<Type>, expected: &Type, span: Span) {
        if let Some(ty) = found {
            if ty != *expected {
                self.errors.push(SemaError::TypeMismatch {
                    expected: expected.to_string(),
                    found: ty.to_string(),
                    span,
                });
            }
        }
    }

    /// Resolve an identifier occurrence: innermost scopes first (locals,
    /// parameters, own fields), then the inherited fields of the current
    /// class's ancestors.
    fn resolve_identifier(
        &mut self,
        class: &ClassDecl,
        ident: &mica_ast::Identifier,
        registry: &ClassRegistry<'_>,
    ) -> Option<Type> {
        if let Some(SymbolEntry::Variable { ty, slot, .. }) = self.scopes.resolve(&ident.name) {
            let ty = ty.clone();
            let binding = match slot {
                Some(slot) => Binding::Local {
                    slot: *slot,
                    ty: ty.clone(),
                },
                // The class scope holds exactly the current class's own
                // fields, so a slotless hit was declared right here.
                None => Binding::Field {
                    class: class.name.name.clone(),
                    ty: ty.clone(),
                },
            };
            self.analysis.set_binding(ident.id, binding);
            self.analysis.set_type(ident.id, ty.clone());
            return Some(ty);
        }

        // A class name hit in the global scope is not a variable; an
        // inherited field with the same name still wins over it.
        if let Some((declaring, field)) = registry.resolve_field(&class.name.name, &ident.name) {
            let ty = field.ty.clone();
            self.analysis.set_binding(
                ident.id,
                Binding::Field {
                    class: declaring.name.name.clone(),
                    ty: ty.clone(),
                },
            );
            self.analysis.set_type(ident.id, ty.clone());
            return Some(ty);
        }

        self.errors.push(SemaError::UnresolvedName {
            name: ident.name.clone(),
            span: ident.span,
        });
        None
    }

    fn resolve_index(
        &mut self,
        class: &ClassDecl,
        index: &IndexExpression,
        registry: &ClassRegistry<'_>,
    ) -> Option<Type> {
        let array_ty = self.resolve_expr(class, &index.array, registry);
        if let Some(ty) = self.resolve_expr(class, &index.index, registry) {
            if ty != Type::Int {
                self.errors.push(SemaError::TypeMismatch {
                    expected: Type::Int.to_string(),
                    found: ty.to_string(),
                    span: index.index.span(),
                });
            }
        }

        match array_ty {
            Some(Type::Array(element)) => {
                let element = *element;
                self.analysis.set_type(index.id, element.clone());
                Some(element)
            }
            Some(other) => {
                self.errors.push(SemaError::TypeMismatch {
                    expected: "array".to_string(),
                    found: other.to_string(),
                    span: index.array.span(),
                });
                None
            }
            None => None,
        }
    }

    fn resolve_call(
        &mut self,
        class: &ClassDecl,
        call: &CallExpression,
        registry: &ClassRegistry<'_>,
    ) -> Option<Type> {
        let receiver_ty = self.resolve_expr(class, &call.receiver, registry);
        let arg_tys: Vec<Option<Type>> = call
            .args
            .iter()
            .map(|arg| self.resolve_expr(class, arg, registry))
            .collect();

        let receiver_class = match receiver_ty {
            Some(Type::Class(name)) => name,
            Some(other) => {
                self.errors.push(SemaError::TypeMismatch {
                    expected: "class instance".to_string(),
                    found: other.to_string(),
                    span: call.receiver.span(),
                });
                return None;
            }
            None => return None,
        };

        let Some((_, method)) = registry.resolve_method(&receiver_class, &call.method.name) else {
            self.errors.push(SemaError::UnresolvedMember {
                class: receiver_class,
                member: call.method.name.clone(),
                span: call.method.span,
            });
            return None;
        };

        if method.params.len() != call.args.len() {
            self.errors.push(SemaError::TypeMismatch {
                expected: format!("{} argument(s)", method.params.len()),
                found: format!("{} argument(s)", call.args.len()),
                span: call.span,
            });
        } else {
            for ((param, arg_ty), arg) in method.params.iter().zip(arg_tys).zip(&call.args) {
                if let Some(arg_ty) = arg_ty {
                    if !registry.is_assignable(&param.ty, &arg_ty) {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: param.ty.to_string(),
                            found: arg_ty.to_string(),
                            span: arg.span(),
                        });
                    }
                }
            }
        }

        let ty = method.return_type.clone();
        self.analysis.set_type(call.id, ty.clone());
        Some(ty)
    }
}
