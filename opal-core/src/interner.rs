use std::collections::HashMap;
use std::fmt::Display;

/// An interned string.
///
/// This is fast to move, clone and compare: two `Interned` tokens produced
/// by the same interner are equal if and only if the strings they stand for
/// are equal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Interned(pub u32);

impl Display for Interned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A string interner.
///
/// Selectors and identifiers are canonicalized through one interner per
/// runtime instance, which makes them identity-comparable tokens. Tokens
/// from distinct interners must never be mixed.
#[derive(Debug, Default)]
pub struct Interner {
    names: Vec<String>,
    reverse: HashMap<String, Interned>,
}

impl Interner {
    /// Initialize the interner, with a given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            reverse: HashMap::with_capacity(capacity),
        }
    }

    /// Intern a string, returning the same token for the same string thereafter.
    pub fn intern(&mut self, name: &str) -> Interned {
        if let Some(interned) = self.reverse.get(name) {
            return *interned;
        }
        let interned = Interned(self.names.len().try_into().expect("too many interned strings"));
        self.names.push(name.to_string());
        self.reverse.insert(name.to_string(), interned);
        interned
    }

    /// Get the string a token stands for.
    pub fn lookup(&self, interned: Interned) -> &str {
        self.names[interned.0 as usize].as_str()
    }

    /// Get the token for an already-interned string, if there is one.
    pub fn reverse_lookup(&self, name: &str) -> Option<Interned> {
        self.reverse.get(name).copied()
    }

    /// The number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::with_capacity(10);
        let a = interner.intern("increment");
        let b = interner.intern("increment");
        let c = interner.intern("decrement");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.lookup(a), "increment");
        assert_eq!(interner.reverse_lookup("decrement"), Some(c));
        assert_eq!(interner.reverse_lookup("missing"), None);
    }
}
