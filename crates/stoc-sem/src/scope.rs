//! The symbol table: a stack of lexical scopes (spec.md §3.4).
//!
//! Lookup walks scopes from innermost to outermost; inner scopes shadow
//! outer ones. Each scope maps an identifier to a non-empty list of
//! symbols so overload sets can live alongside ordinary bindings.

use rustc_hash::FxHashMap;
use stoc_util::{BasicType, Signature, Symbol};

/// What an identifier is bound to in a scope.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Variable,
    Constant,
    Parameter,
    Function,
}

/// One symbol-table entry (spec.md §3.4). For a function, `ty` is unused;
/// its type lives in `signature` instead (a function identifier carries
/// no scalar type of its own).
#[derive(Debug, Clone)]
pub struct SemSymbol {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub ty: BasicType,
    pub signature: Option<Signature>,
    pub mangled_name: String,
}

impl SemSymbol {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function)
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable | SymbolKind::Parameter)
    }
}

#[derive(Default)]
struct Scope {
    bindings: FxHashMap<Symbol, Vec<SemSymbol>>,
}

/// The stack-of-scopes symbol table (spec.md §3.4). The global scope
/// (index 0) is pushed by [`ScopeStack::new`] and is never popped.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

pub enum InsertError {
    /// A non-function identifier is already bound in this scope.
    AlreadyBound,
    /// A function with the same parameter-type list is already bound in
    /// this scope (an overload clash).
    OverloadClash,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// True iff the current scope is the global (file-top-level) scope.
    pub fn at_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Declares a variable, constant, or parameter. Fails iff the
    /// identifier is already bound in the current scope (spec.md §3.4).
    pub fn declare_value(&mut self, symbol: SemSymbol) -> Result<(), InsertError> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.bindings.contains_key(&symbol.name) {
            return Err(InsertError::AlreadyBound);
        }
        scope.bindings.insert(symbol.name, vec![symbol]);
        Ok(())
    }

    /// Declares a function. Succeeds if the identifier is unbound in the
    /// current scope, or bound only to functions whose parameter-type
    /// lists all differ from this one (spec.md §3.4: overloading by
    /// parameter-type list; return-type differences do not distinguish
    /// overloads).
    pub fn declare_function(&mut self, symbol: SemSymbol) -> Result<(), InsertError> {
        let new_sig = symbol.signature.as_ref().expect("function symbol must carry a signature");
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if let Some(existing) = scope.bindings.get(&symbol.name) {
            if existing.iter().any(|s| !s.is_function()) {
                return Err(InsertError::AlreadyBound);
            }
            if existing.iter().any(|s| s.signature.as_ref().unwrap().overload_clashes_with(new_sig)) {
                return Err(InsertError::OverloadClash);
            }
        }
        scope.bindings.entry(symbol.name).or_default().push(symbol);
        Ok(())
    }

    /// Walks scopes outward from the innermost, returning the first
    /// binding found (shadowing).
    pub fn lookup(&self, name: Symbol) -> Option<&[SemSymbol]> {
        self.scopes.iter().rev().find_map(|scope| scope.bindings.get(&name)).map(Vec::as_slice)
    }
}
