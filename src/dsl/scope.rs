//! Lexical scope chain consulted by the code generator.

use indexmap::IndexMap;
use tracing::trace;

use super::error::ScopeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Function,
    Parameter,
}

/// What a name is bound to: its kind and the rendered text it was defined with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    pub value: String,
}

impl Binding {
    pub fn variable(value: impl Into<String>) -> Self {
        Self { kind: BindingKind::Variable, value: value.into() }
    }

    pub fn function(value: impl Into<String>) -> Self {
        Self { kind: BindingKind::Function, value: value.into() }
    }

    pub fn parameter(value: impl Into<String>) -> Self {
        Self { kind: BindingKind::Parameter, value: value.into() }
    }
}

/// One binding frame. Each frame owns its parent, so the chain is a
/// singly-linked stack rooted at the global scope.
#[derive(Debug, Default)]
struct Scope {
    level: usize,
    bindings: IndexMap<String, Binding>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    fn lookup(&self, name: &str, current_only: bool) -> Option<&Binding> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            if current_only {
                return None;
            }
            scope = scope.parent.as_deref()?;
        }
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    current: Scope,
}

impl SymbolTable {
    /// A table holding only the empty global scope (level 0).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        let level = self.current.level + 1;
        let parent = std::mem::take(&mut self.current);
        self.current = Scope {
            level,
            bindings: IndexMap::new(),
            parent: Some(Box::new(parent)),
        };
        trace!(level, "enter scope");
    }

    pub fn exit_scope(&mut self) -> Result<(), ScopeError> {
        let parent = self.current.parent.take().ok_or(ScopeError::ExitGlobalScope)?;
        trace!(level = self.current.level, "exit scope");
        self.current = *parent;
        Ok(())
    }

    /// Bind `name` in the current scope. Names in enclosing scopes may be shadowed.
    pub fn define(&mut self, name: &str, binding: Binding) -> Result<(), ScopeError> {
        if self.current.bindings.contains_key(name) {
            return Err(ScopeError::AlreadyDefined(name.to_string()));
        }
        self.current.bindings.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn lookup(&self, name: &str, current_only: bool) -> Option<&Binding> {
        self.current.lookup(name, current_only)
    }

    pub fn level(&self) -> usize {
        self.current.level
    }
}
