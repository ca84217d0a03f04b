//! Class registry - declared classes and the ancestor-chain walks
//!
//! A borrowed, name-keyed view over the program's class declarations.
//! Member resolution walks the ancestor chain nearest-first: the walk
//! checks the class itself, returns immediately on a hit, and advances to
//! the parent only on a miss. The same single rule governs field shadowing
//! and method override resolution.
//!
//! The registry is filled once while classes are collected and is read-only
//! afterwards.

use crate::error::SemaError;
use mica_ast::{ClassDecl, MethodDecl, Type, VarDecl};
use rustc_hash::{FxHashMap, FxHashSet};

/// Name → declaration map over one program's classes.
#[derive(Debug, Default)]
pub struct ClassRegistry<'p> {
    classes: FxHashMap<&'p str, &'p ClassDecl>,
}

impl<'p> ClassRegistry<'p> {
    /// Create an empty registry.
    pub fn new() -> Self {
        ClassRegistry {
            classes: FxHashMap::default(),
        }
    }

    /// Register a class declaration. Fails if the name is already taken.
    pub fn register(&mut self, class: &'p ClassDecl) -> Result<(), SemaError> {
        let name = class.name.name.as_str();
        if self.classes.contains_key(name) {
            return Err(SemaError::DuplicateClass {
                name: name.to_string(),
                span: class.name.span,
            });
        }
        self.classes.insert(name, class);
        Ok(())
    }

    /// Look a class up by name.
    pub fn lookup(&self, name: &str) -> Option<&'p ClassDecl> {
        self.classes.get(name).copied()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate the ancestor chain starting at `name`: the class itself,
    /// then its parent, then the grandparent. Stops at a hierarchy root,
    /// at an undeclared parent, or when a class repeats (cycle guard);
    /// `validate` reports the latter two as errors.
    pub fn ancestors(&self, name: &str) -> Ancestors<'_, 'p> {
        Ancestors {
            registry: self,
            next: Some(name.to_string()),
            seen: FxHashSet::default(),
        }
    }

    /// Resolve a field to its nearest declaration in the ancestor chain.
    ///
    /// Returns the declaring class together with the declaration, so field
    /// access instructions can name the declaring class's field identity.
    pub fn resolve_field(&self, class: &str, name: &str) -> Option<(&'p ClassDecl, &'p VarDecl)> {
        for ancestor in self.ancestors(class) {
            if let Some(field) = ancestor.field(name) {
                return Some((ancestor, field));
            }
        }
        None
    }

    /// Resolve a method to its nearest declaration in the ancestor chain.
    pub fn resolve_method(
        &self,
        class: &str,
        name: &str,
    ) -> Option<(&'p ClassDecl, &'p MethodDecl)> {
        for ancestor in self.ancestors(class) {
            if let Some(method) = ancestor.method(name) {
                return Some((ancestor, method));
            }
        }
        None
    }

    /// Assignability: identity for primitives and arrays of identical
    /// element type; a class type is assignable to any of its ancestors
    /// (including itself).
    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        match (target, source) {
            (Type::Class(target_name), Type::Class(source_name)) => self
                .ancestors(source_name)
                .any(|c| c.name.name == *target_name),
            _ => target == source,
        }
    }

    /// Check parent links: every named parent must be declared, and no
    /// class may be its own transitive ancestor.
    pub fn validate(&self) -> Vec<SemaError> {
        let mut errors = Vec::new();
        for class in self.classes.values() {
            if let Some(parent) = &class.parent {
                if self.lookup(&parent.name).is_none() {
                    errors.push(SemaError::UnknownClass {
                        name: parent.name.clone(),
                        span: parent.span,
                    });
                    continue;
                }
                // Walk from the parent; reaching the class again is a cycle.
                if self.ancestors(&parent.name).any(|c| c.name.name == class.name.name) {
                    errors.push(SemaError::CyclicInheritance {
                        name: class.name.name.clone(),
                        span: class.name.span,
                    });
                }
            }
        }
        errors.sort_by_key(|e| e.span().start);
        errors
    }
}

/// Iterator over an ancestor chain, most-derived first.
pub struct Ancestors<'r, 'p> {
    registry: &'r ClassRegistry<'p>,
    next: Option<String>,
    seen: FxHashSet<String>,
}

impl<'r, 'p> Iterator for Ancestors<'r, 'p> {
    type Item = &'p ClassDecl;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next.take()?;
        if !self.seen.insert(name.clone()) {
            // Inheritance cycle; validate() reports it, the walk just stops.
            return None;
        }
        let class = self.registry.lookup(&name)?;
        self.next = class.parent.as_ref().map(|p| p.name.clone());
        Some(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_ast::{Identifier, NodeIdGen, Span};

    fn class(ids: &mut NodeIdGen, name: &str, parent: Option<&str>) -> ClassDecl {
        ClassDecl {
            name: Identifier::new(ids.fresh(), name, Span::dummy()),
            parent: parent.map(|p| Identifier::new(ids.fresh(), p, Span::dummy())),
            fields: vec![],
            methods: vec![],
            span: Span::dummy(),
        }
    }

    fn field(ids: &mut NodeIdGen, name: &str) -> VarDecl {
        VarDecl {
            name: Identifier::new(ids.fresh(), name, Span::dummy()),
            ty: Type::Int,
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut ids = NodeIdGen::new();
        let a = class(&mut ids, "A", None);
        let a2 = class(&mut ids, "A", None);

        let mut registry = ClassRegistry::new();
        registry.register(&a).unwrap();
        assert!(matches!(
            registry.register(&a2),
            Err(SemaError::DuplicateClass { .. })
        ));
    }

    #[test]
    fn test_nearest_match_across_grandparent() {
        let mut ids = NodeIdGen::new();
        let mut g = class(&mut ids, "G", None);
        g.fields.push(field(&mut ids, "value"));
        let p = class(&mut ids, "P", Some("G"));
        let c = class(&mut ids, "C", Some("P"));

        let mut registry = ClassRegistry::new();
        registry.register(&g).unwrap();
        registry.register(&p).unwrap();
        registry.register(&c).unwrap();

        let (declaring, _) = registry.resolve_field("C", "value").unwrap();
        assert_eq!(declaring.name.name, "G");
    }

    #[test]
    fn test_override_wins_over_further_ancestors() {
        let mut ids = NodeIdGen::new();
        let mut g = class(&mut ids, "G", None);
        g.fields.push(field(&mut ids, "value"));
        let mut p = class(&mut ids, "P", Some("G"));
        p.fields.push(field(&mut ids, "value"));
        let c = class(&mut ids, "C", Some("P"));

        let mut registry = ClassRegistry::new();
        registry.register(&g).unwrap();
        registry.register(&p).unwrap();
        registry.register(&c).unwrap();

        let (declaring, _) = registry.resolve_field("C", "value").unwrap();
        assert_eq!(declaring.name.name, "P");
    }

    #[test]
    fn test_miss_exhausts_chain() {
        let mut ids = NodeIdGen::new();
        let g = class(&mut ids, "G", None);
        let c = class(&mut ids, "C", Some("G"));

        let mut registry = ClassRegistry::new();
        registry.register(&g).unwrap();
        registry.register(&c).unwrap();

        assert!(registry.resolve_field("C", "missing").is_none());
    }

    #[test]
    fn test_cycle_detected_and_walk_terminates() {
        let mut ids = NodeIdGen::new();
        let a = class(&mut ids, "A", Some("B"));
        let b = class(&mut ids, "B", Some("A"));

        let mut registry = ClassRegistry::new();
        registry.register(&a).unwrap();
        registry.register(&b).unwrap();

        // The walk must terminate even on a cyclic chain
        assert!(registry.resolve_field("A", "missing").is_none());

        let errors = registry.validate();
        assert!(errors
            .iter()
            .any(|e| matches!(e, SemaError::CyclicInheritance { .. })));
    }

    #[test]
    fn test_assignability_follows_ancestry() {
        let mut ids = NodeIdGen::new();
        let a = class(&mut ids, "A", None);
        let b = class(&mut ids, "B", Some("A"));

        let mut registry = ClassRegistry::new();
        registry.register(&a).unwrap();
        registry.register(&b).unwrap();

        assert!(registry.is_assignable(&Type::class("A"), &Type::class("B")));
        assert!(registry.is_assignable(&Type::class("B"), &Type::class("B")));
        assert!(!registry.is_assignable(&Type::class("B"), &Type::class("A")));
        assert!(registry.is_assignable(&Type::Int, &Type::Int));
        assert!(!registry.is_assignable(&Type::Int, &Type::Boolean));
        assert!(registry.is_assignable(&Type::array(Type::Int), &Type::array(Type::Int)));
        assert!(!registry.is_assignable(&Type::array(Type::Int), &Type::array(Type::Boolean)));
    }
}
