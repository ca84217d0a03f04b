//! Code generation from the annotated AST to assembly text
//!
//! A second complete traversal of the tree. It never resolves names itself:
//! identifiers come back from the analysis side tables as either a local
//! slot or a field of a declaring class, and every expression node must
//! already carry its resolved type. A missing annotation is a broken
//! precondition and aborts the run; no partial artifact is valid.
//!
//! Emission is strictly post-order: operands before operators, left before
//! right. Value types (int, boolean) travel through the `i`-family
//! load/store instructions, references through the `a`-family.

use crate::artifact::Artifact;
use crate::emit::{ClassBuilder, MethodBuilder};
use crate::error::{CompileError, CompileResult};
use mica_ast::{
    AssignTarget, BinaryOp, CallExpression, ClassDecl, Expression, Identifier, MethodDecl,
    Program, Statement, Type, UnaryOp, ENTRY_METHOD,
};
use mica_sema::{Analysis, Binding, ClassRegistry, Resolution};

/// Reserved name of the synthetic entry wrapper class. The resolution pass
/// rejects user classes with this name, so the artifact set never holds two
/// modules called `MicaMain`.
pub use mica_ast::ENTRY_WRAPPER;

/// The runtime root object every hierarchy root extends.
pub(crate) const OBJECT: &str = "java/lang/Object";

/// Walks the annotated program and emits one artifact per class plus the
/// entry wrapper.
pub struct CodeGenerator<'p, 'r> {
    program: &'p Program,
    registry: &'r ClassRegistry<'p>,
    analysis: &'r Analysis,
}

impl<'p, 'r> CodeGenerator<'p, 'r> {
    /// Create a generator over a successful resolution.
    pub fn new(program: &'p Program, resolution: &'r Resolution<'p>) -> Self {
        CodeGenerator {
            program,
            registry: &resolution.registry,
            analysis: &resolution.analysis,
        }
    }

    /// Emit all artifacts: the entry wrapper first, then every class in
    /// declaration order (entry class first).
    pub fn generate(&self) -> CompileResult<Vec<Artifact>> {
        log::debug!(
            "generating code for {} class(es), entry `{}`",
            self.registry.len(),
            self.program.entry.name.name
        );

        let mut artifacts = Vec::with_capacity(self.registry.len() + 1);
        artifacts.push(self.gen_entry_wrapper()?);
        for class in self.program.all_classes() {
            artifacts.push(self.gen_class(class)?);
        }
        Ok(artifacts)
    }

    /// The synthetic wrapper: constructs the entry class, invokes its entry
    /// method, discards the result, and halts normally.
    fn gen_entry_wrapper(&self) -> CompileResult<Artifact> {
        let entry = self.program.entry.name.name.as_str();
        let (_, main) = self
            .registry
            .resolve_method(entry, ENTRY_METHOD)
            .ok_or_else(|| CompileError::UnresolvedMember {
                class: entry.to_string(),
                member: ENTRY_METHOD.to_string(),
            })?;

        let mut class = ClassBuilder::new(ENTRY_WRAPPER, None);

        let mut init = MethodBuilder::new("<init>()V", 1);
        init.emit("aload_0");
        init.emit(format!("invokespecial {}/<init>()V", OBJECT));
        init.emit("return");
        class.method(init);

        let mut process_entry = MethodBuilder::new_static("main([Ljava/lang/String;)V", 1);
        process_entry.emit(format!("new {}", entry));
        process_entry.emit("dup");
        process_entry.emit(format!("invokespecial {}/<init>()V", entry));
        process_entry.emit(format!(
            "invokevirtual {}/{}{}",
            entry,
            ENTRY_METHOD,
            main.descriptor()
        ));
        process_entry.emit("pop");
        process_entry.emit("return");
        class.method(process_entry);

        Ok(class.build())
    }

    fn gen_class(&self, class: &ClassDecl) -> CompileResult<Artifact> {
        log::trace!("emitting class `{}`", class.name.name);

        let parent = class.parent.as_ref().map(|p| p.name.as_str());
        let mut builder = ClassBuilder::new(&class.name.name, parent);
        for field in &class.fields {
            builder.field(&field.name.name, &field.ty.descriptor());
        }
        builder.method(self.gen_constructor(class));
        for method in &class.methods {
            builder.method(self.gen_method(class, method)?);
        }
        Ok(builder.build())
    }

    /// The synthesized zero-argument constructor: chain to the superclass
    /// constructor, then zero/empty-initialize every own field.
    fn gen_constructor(&self, class: &ClassDecl) -> MethodBuilder {
        let superclass = class
            .parent
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(OBJECT);

        let mut init = MethodBuilder::new("<init>()V", 1);
        init.emit("aload_0");
        init.emit(format!("invokespecial {}/<init>()V", superclass));

        for field in &class.fields {
            init.emit("aload_0");
            match &field.ty {
                Type::Int | Type::Boolean => init.emit("iconst_0"),
                Type::Str => init.emit("ldc \"\""),
                Type::Array(_) | Type::Class(_) => init.emit("aconst_null"),
            }
            init.emit(format!(
                "putfield {}/{} {}",
                class.name.name,
                field.name.name,
                field.ty.descriptor()
            ));
        }

        init.emit("return");
        init
    }

    fn gen_method(&self, class: &ClassDecl, method: &MethodDecl) -> CompileResult<MethodBuilder> {
        log::trace!("emitting method `{}.{}`", class.name.name, method.name.name);

        // Slot 0 is the receiver; each parameter and local owns one slot.
        // The resolver has already bounded the count to the slot space.
        let locals_limit = u16::try_from(1 + method.params.len() + method.locals.len())
            .map_err(|_| {
                CompileError::precondition(format!(
                    "method `{}.{}` exceeds the local slot space",
                    class.name.name, method.name.name
                ))
            })?;
        let mut builder = MethodBuilder::new(
            format!("{}{}", method.name.name, method.descriptor()),
            locals_limit,
        );

        for stmt in &method.body {
            self.gen_stmt(&mut builder, stmt)?;
        }

        self.gen_expr(&mut builder, &method.return_expr)?;
        builder.emit(if method.return_type.is_value() {
            "ireturn"
        } else {
            "areturn"
        });
        Ok(builder)
    }

    fn gen_stmt(&self, builder: &mut MethodBuilder, stmt: &Statement) -> CompileResult<()> {
        match stmt {
            Statement::Assign(assign) => match &assign.target {
                AssignTarget::Variable(ident) => self.gen_store(builder, ident, &assign.value),
                AssignTarget::Element(index) => {
                    self.gen_expr(builder, &index.array)?;
                    self.gen_expr(builder, &index.index)?;
                    self.gen_expr(builder, &assign.value)?;
                    let element = self.expr_type(index.id)?;
                    builder.emit(if element.is_value() { "iastore" } else { "aastore" });
                    Ok(())
                }
            },
            Statement::Block(block) => {
                for stmt in &block.statements {
                    self.gen_stmt(builder, stmt)?;
                }
                Ok(())
            }
            Statement::If(if_stmt) => {
                self.gen_expr(builder, &if_stmt.condition)?;
                match &if_stmt.else_branch {
                    Some(else_branch) => {
                        let else_label = builder.fresh_label();
                        let end_label = builder.fresh_label();
                        builder.emit(format!("ifeq {}", else_label));
                        self.gen_stmt(builder, &if_stmt.then_branch)?;
                        builder.emit(format!("goto {}", end_label));
                        builder.place_label(&else_label);
                        self.gen_stmt(builder, else_branch)?;
                        builder.place_label(&end_label);
                    }
                    None => {
                        let end_label = builder.fresh_label();
                        builder.emit(format!("ifeq {}", end_label));
                        self.gen_stmt(builder, &if_stmt.then_branch)?;
                        builder.place_label(&end_label);
                    }
                }
                Ok(())
            }
            Statement::While(while_stmt) => {
                let start_label = builder.fresh_label();
                let end_label = builder.fresh_label();
                builder.place_label(&start_label);
                self.gen_expr(builder, &while_stmt.condition)?;
                builder.emit(format!("ifeq {}", end_label));
                self.gen_stmt(builder, &while_stmt.body)?;
                builder.emit(format!("goto {}", start_label));
                builder.place_label(&end_label);
                Ok(())
            }
            Statement::Print(print) => {
                builder.emit("getstatic java/lang/System/out Ljava/io/PrintStream;");
                self.gen_expr(builder, &print.argument)?;
                let descriptor = self.expr_type(print.argument.id())?.descriptor();
                builder.emit(format!(
                    "invokevirtual java/io/PrintStream/println({})V",
                    descriptor
                ));
                Ok(())
            }
            Statement::Expr(expr_stmt) => {
                self.gen_expr(builder, &expr_stmt.expression)?;
                // Every Mica method returns a value; discard it.
                builder.emit("pop");
                Ok(())
            }
        }
    }

    /// Store the value of `value` into the variable `ident` resolves to.
    /// Field stores load the receiver before evaluating the value, so the
    /// operand order suits `putfield`.
    fn gen_store(
        &self,
        builder: &mut MethodBuilder,
        ident: &Identifier,
        value: &Expression,
    ) -> CompileResult<()> {
        match self.binding(ident)? {
            Binding::Local { slot, ty } => {
                let (slot, value_load) = (*slot, ty.is_value());
                self.gen_expr(builder, value)?;
                builder.emit(format!(
                    "{} {}",
                    if value_load { "istore" } else { "astore" },
                    slot
                ));
            }
            Binding::Field { class, ty } => {
                let field = format!("putfield {}/{} {}", class, ident.name, ty.descriptor());
                builder.emit("aload_0");
                self.gen_expr(builder, value)?;
                builder.emit(field);
            }
        }
        Ok(())
    }

    fn gen_expr(&self, builder: &mut MethodBuilder, expr: &Expression) -> CompileResult<()> {
        match expr {
            Expression::Int(lit) => {
                builder.emit(format!("ldc {}", lit.value));
                Ok(())
            }
            Expression::Boolean(lit) => {
                builder.emit(if lit.value { "iconst_1" } else { "iconst_0" });
                Ok(())
            }
            Expression::Str(lit) => {
                let escaped = lit.value.replace('\\', "\\\\").replace('"', "\\\"");
                builder.emit(format!("ldc \"{}\"", escaped));
                Ok(())
            }
            Expression::Identifier(ident) => self.gen_load(builder, ident),
            Expression::This(_) => {
                builder.emit("aload_0");
                Ok(())
            }
            Expression::Unary(unary) => {
                self.gen_expr(builder, &unary.operand)?;
                match unary.operator {
                    UnaryOp::Neg => builder.emit("ineg"),
                    UnaryOp::Not => {
                        builder.emit("iconst_1");
                        builder.emit("ixor");
                    }
                }
                Ok(())
            }
            Expression::Binary(binary) => self.gen_binary(builder, binary),
            Expression::Index(index) => {
                self.gen_expr(builder, &index.array)?;
                self.gen_expr(builder, &index.index)?;
                let element = self.expr_type(index.id)?;
                builder.emit(if element.is_value() { "iaload" } else { "aaload" });
                Ok(())
            }
            Expression::Length(length) => {
                self.gen_expr(builder, &length.array)?;
                builder.emit("arraylength");
                Ok(())
            }
            Expression::Call(call) => self.gen_call(builder, call),
            Expression::NewObject(alloc) => {
                builder.emit(format!("new {}", alloc.class.name));
                builder.emit("dup");
                builder.emit(format!("invokespecial {}/<init>()V", alloc.class.name));
                Ok(())
            }
            Expression::NewArray(alloc) => {
                self.gen_expr(builder, &alloc.size)?;
                match &alloc.element {
                    Type::Int => builder.emit("newarray int"),
                    Type::Boolean => builder.emit("newarray boolean"),
                    other => builder.emit(format!("anewarray {}", other.internal_name())),
                }
                Ok(())
            }
        }
    }

    /// Load the variable `ident` resolves to: a slot load for locals and
    /// parameters, a receiver load plus `getfield` naming the declaring
    /// class for fields.
    fn gen_load(&self, builder: &mut MethodBuilder, ident: &Identifier) -> CompileResult<()> {
        match self.binding(ident)? {
            Binding::Local { slot, ty } => {
                builder.emit(format!(
                    "{} {}",
                    if ty.is_value() { "iload" } else { "aload" },
                    slot
                ));
            }
            Binding::Field { class, ty } => {
                builder.emit("aload_0");
                builder.emit(format!(
                    "getfield {}/{} {}",
                    class,
                    ident.name,
                    ty.descriptor()
                ));
            }
        }
        Ok(())
    }

    fn gen_binary(
        &self,
        builder: &mut MethodBuilder,
        binary: &mica_ast::BinaryExpression,
    ) -> CompileResult<()> {
        if binary.operator.is_logical() {
            return self.gen_logical(builder, binary);
        }

        self.gen_expr(builder, &binary.left)?;
        self.gen_expr(builder, &binary.right)?;

        match binary.operator {
            BinaryOp::Add => builder.emit("iadd"),
            BinaryOp::Sub => builder.emit("isub"),
            BinaryOp::Mul => builder.emit("imul"),
            BinaryOp::Div => builder.emit("idiv"),
            BinaryOp::Lt => self.gen_comparison(builder, "if_icmplt"),
            BinaryOp::Le => self.gen_comparison(builder, "if_icmple"),
            BinaryOp::Gt => self.gen_comparison(builder, "if_icmpgt"),
            BinaryOp::Ge => self.gen_comparison(builder, "if_icmpge"),
            BinaryOp::Eq | BinaryOp::Ne => {
                let value = self.expr_type(binary.left.id())?.is_value();
                let op = match (binary.operator, value) {
                    (BinaryOp::Eq, true) => "if_icmpeq",
                    (BinaryOp::Eq, false) => "if_acmpeq",
                    (BinaryOp::Ne, true) => "if_icmpne",
                    (BinaryOp::Ne, false) => "if_acmpne",
                    _ => unreachable!(),
                };
                self.gen_comparison(builder, op);
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
        Ok(())
    }

    /// Lower a comparison into a 0/1 producing label ladder.
    fn gen_comparison(&self, builder: &mut MethodBuilder, branch: &str) {
        let true_label = builder.fresh_label();
        let end_label = builder.fresh_label();
        builder.emit(format!("{} {}", branch, true_label));
        builder.emit("iconst_0");
        builder.emit(format!("goto {}", end_label));
        builder.place_label(&true_label);
        builder.emit("iconst_1");
        builder.place_label(&end_label);
    }

    /// Short-circuit `&&` / `||`: keep the left value on the stack for the
    /// test, only evaluate the right operand when it still matters.
    fn gen_logical(
        &self,
        builder: &mut MethodBuilder,
        binary: &mica_ast::BinaryExpression,
    ) -> CompileResult<()> {
        let short_circuit = match binary.operator {
            BinaryOp::And => "ifeq",
            BinaryOp::Or => "ifne",
            _ => unreachable!(),
        };
        let end_label = builder.fresh_label();

        self.gen_expr(builder, &binary.left)?;
        builder.emit("dup");
        builder.emit(format!("{} {}", short_circuit, end_label));
        builder.emit("pop");
        self.gen_expr(builder, &binary.right)?;
        builder.place_label(&end_label);
        Ok(())
    }

    /// Receiver, then arguments, then a virtual invocation qualified by the
    /// receiver's static class and the signature of the nearest declaring
    /// ancestor's method.
    fn gen_call(&self, builder: &mut MethodBuilder, call: &CallExpression) -> CompileResult<()> {
        self.gen_expr(builder, &call.receiver)?;

        let receiver_class = match self.expr_type(call.receiver.id())? {
            Type::Class(name) => name.clone(),
            other => {
                return Err(CompileError::precondition(format!(
                    "call receiver of non-class type `{}`",
                    other
                )))
            }
        };

        let (_, method) = self
            .registry
            .resolve_method(&receiver_class, &call.method.name)
            .ok_or_else(|| CompileError::UnresolvedMember {
                class: receiver_class.clone(),
                member: call.method.name.clone(),
            })?;

        for arg in &call.args {
            self.gen_expr(builder, arg)?;
        }

        builder.emit(format!(
            "invokevirtual {}/{}{}",
            receiver_class,
            call.method.name,
            method.descriptor()
        ));
        Ok(())
    }

    /// The resolved type of an expression node; failing the lookup means
    /// code generation ran on an unannotated tree.
    fn expr_type(&self, id: mica_ast::NodeId) -> CompileResult<&Type> {
        self.analysis.type_of(id).ok_or_else(|| {
            CompileError::precondition("expression reached code generation without a resolved type")
        })
    }

    fn binding(&self, ident: &Identifier) -> CompileResult<&Binding> {
        self.analysis.binding_of(ident.id).ok_or_else(|| {
            CompileError::precondition(format!(
                "identifier `{}` reached code generation without a binding",
                ident.name
            ))
        })
    }
}
