//! String interning for identifiers.
//!
//! The whole compiler runs as a single sequential pipeline invocation
//! (spec.md §5: "purely sequential, single-threaded. No asynchrony."), so
//! unlike the teacher's thread-safe `DashMap`-backed interner, a single
//! `RefCell`-guarded table per compilation is enough and avoids pulling in
//! synchronization machinery nothing here ever contends on.

use std::cell::RefCell;
use std::fmt;
use rustc_hash::FxHashMap;

/// A compact handle to an interned string. Two symbols compare equal iff
/// they were interned from equal strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

struct Interner {
    strings: Vec<String>,
    lookup: FxHashMap<String, u32>,
}

impl Interner {
    fn new() -> Self {
        Self { strings: Vec::new(), lookup: FxHashMap::default() }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&id) = self.lookup.get(s) {
            return Symbol(id);
        }
        let id = self.strings.len() as u32;
        self.strings.push(s.to_owned());
        self.lookup.insert(s.to_owned(), id);
        Symbol(id)
    }

    fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

impl Symbol {
    pub fn intern(s: &str) -> Symbol {
        INTERNER.with(|i| i.borrow_mut().intern(s))
    }

    /// Copies the interned string out. `Symbol` does not borrow the table,
    /// so this allocates; call sparingly on hot paths (prefer comparing
    /// `Symbol`s directly).
    pub fn as_str(&self) -> String {
        INTERNER.with(|i| i.borrow().resolve(*self).to_owned())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_intern_to_equal_symbols() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("foo");
        let c = Symbol::intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn round_trips_through_as_str() {
        let s = Symbol::intern("hello_world");
        assert_eq!(s.as_str(), "hello_world");
    }
}
