//! Assembly text builders
//!
//! Line-oriented builders for one class module and one method block.
//! Labels are allocated per method and monotonically numbered, so every
//! conditional and loop gets its own targets.

use crate::artifact::Artifact;

/// Conservative operand stack bound emitted for every method.
const STACK_LIMIT: u32 = 32;

/// Builds one method block: signature header, `.limit` directives,
/// instruction lines, end marker.
#[derive(Debug)]
pub struct MethodBuilder {
    signature: String,
    is_static: bool,
    locals_limit: u16,
    lines: Vec<String>,
    next_label: u32,
}

impl MethodBuilder {
    /// An instance method with the given `name(desc)` signature. The locals
    /// limit counts the receiver plus every parameter and local slot.
    pub fn new(signature: impl Into<String>, locals_limit: u16) -> Self {
        MethodBuilder {
            signature: signature.into(),
            is_static: false,
            locals_limit,
            lines: Vec::new(),
            next_label: 0,
        }
    }

    /// A static method (only the synthetic process entry uses this).
    pub fn new_static(signature: impl Into<String>, locals_limit: u16) -> Self {
        let mut builder = MethodBuilder::new(signature, locals_limit);
        builder.is_static = true;
        builder
    }

    /// Append one instruction line.
    pub fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Allocate a fresh label name, unique within this method.
    pub fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Place a previously allocated label at the current position.
    pub fn place_label(&mut self, label: &str) {
        self.lines.push(format!("{}:", label));
    }

    /// Instruction lines emitted so far (no header or directives).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Finish the block.
    pub fn build(self) -> Vec<String> {
        let modifiers = if self.is_static { "public static" } else { "public" };
        let mut block = Vec::with_capacity(self.lines.len() + 4);
        block.push(format!(".method {} {}", modifiers, self.signature));
        block.push(format!(".limit stack {}", STACK_LIMIT));
        block.push(format!(".limit locals {}", self.locals_limit));
        block.extend(self.lines);
        block.push(".end method".to_string());
        block
    }
}

/// Builds one class module: header, field directives, method blocks.
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    lines: Vec<String>,
}

impl ClassBuilder {
    /// Start a module for `name`. A class without a declared parent extends
    /// the runtime root object.
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        let name = name.into();
        let lines = vec![
            format!(".class public {}", name),
            format!(".super {}", parent.unwrap_or(super::codegen::OBJECT)),
        ];
        ClassBuilder { name, lines }
    }

    /// Declare a field.
    pub fn field(&mut self, name: &str, descriptor: &str) {
        self.lines.push(format!(".field public {} {}", name, descriptor));
    }

    /// Append a finished method block.
    pub fn method(&mut self, method: MethodBuilder) {
        self.lines.extend(method.build());
    }

    /// Finish the module.
    pub fn build(self) -> Artifact {
        Artifact {
            name: self.name,
            lines: self.lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_block_shape() {
        let mut method = MethodBuilder::new("get()I", 1);
        method.emit("ldc 42");
        method.emit("ireturn");
        let block = method.build();
        assert_eq!(block.first().unwrap(), ".method public get()I");
        assert_eq!(block[1], ".limit stack 32");
        assert_eq!(block[2], ".limit locals 1");
        assert_eq!(block.last().unwrap(), ".end method");
    }

    #[test]
    fn test_labels_are_unique_and_monotonic() {
        let mut method = MethodBuilder::new("m()I", 1);
        let a = method.fresh_label();
        let b = method.fresh_label();
        assert_eq!(a, "L0");
        assert_eq!(b, "L1");
        method.place_label(&a);
        assert_eq!(method.lines().last().unwrap(), "L0:");
    }

    #[test]
    fn test_class_header_and_default_super() {
        let builder = ClassBuilder::new("Point", None);
        let artifact = builder.build();
        assert_eq!(artifact.lines[0], ".class public Point");
        assert_eq!(artifact.lines[1], ".super java/lang/Object");
    }

    #[test]
    fn test_class_header_with_parent() {
        let mut builder = ClassBuilder::new("Point3D", Some("Point"));
        builder.field("z", "I");
        let artifact = builder.build();
        assert_eq!(artifact.lines[1], ".super Point");
        assert_eq!(artifact.lines[2], ".field public z I");
    }
}
