//! Scope table - the stack of nested symbol scopes
//!
//! Scopes nest global → class → method → block. Lookup searches from the
//! innermost scope outward; entries live exactly as long as their scope is
//! on the stack and are never mutated after insertion.

use mica_ast::Type;
use rustc_hash::FxHashMap;

/// What kind of scope a stack entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Class,
    Method,
    Block,
}

/// An entry in a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolEntry {
    /// A declared class
    Class { name: String },
    /// A variable. `slot` is `Some(i)` for parameters and locals (their
    /// local-variable index) and `None` for fields, which are resolved
    /// through the receiver at access time.
    Variable {
        name: String,
        ty: Type,
        slot: Option<u16>,
    },
}

impl SymbolEntry {
    /// The declared name of this entry.
    pub fn name(&self) -> &str {
        match self {
            SymbolEntry::Class { name } => name,
            SymbolEntry::Variable { name, .. } => name,
        }
    }
}

/// A rejected `define` because the innermost scope already holds the name.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateDeclaration {
    pub name: String,
}

/// One scope: a mapping from name to entry.
#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    entries: FxHashMap<String, SymbolEntry>,
}

/// The scope stack.
///
/// Created empty per compilation run; the resolver pushes the global scope
/// itself so no state can leak across runs.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    /// Create an empty scope table.
    pub fn new() -> Self {
        ScopeTable { scopes: Vec::new() }
    }

    /// Open a new innermost scope.
    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            entries: FxHashMap::default(),
        });
    }

    /// Close the innermost scope, discarding its entries.
    ///
    /// Panics if the stack is empty; push/pop pairs are a structural
    /// property of the resolver's traversal.
    pub fn pop(&mut self) {
        self.scopes.pop().expect("scope stack underflow");
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Kind of the innermost scope, if any.
    pub fn current_kind(&self) -> Option<ScopeKind> {
        self.scopes.last().map(|s| s.kind)
    }

    /// Insert an entry into the innermost scope.
    ///
    /// Fails if the innermost scope already contains the name; outer scopes
    /// are allowed to hold the same name (shadowing).
    pub fn define(&mut self, entry: SymbolEntry) -> Result<(), DuplicateDeclaration> {
        let scope = self.scopes.last_mut().expect("no open scope");
        let name = entry.name().to_string();
        if scope.entries.contains_key(&name) {
            return Err(DuplicateDeclaration { name });
        }
        scope.entries.insert(name, entry);
        Ok(())
    }

    /// Look a name up, searching from the innermost scope outward.
    pub fn resolve(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.entries.get(name))
    }
}
