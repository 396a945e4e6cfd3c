use crate::value::Value;
use indexmap::IndexMap;
use opal_core::interner::Interned;

/// A shared pool of named bindings, addressable as a message receiver.
#[derive(Debug, Default)]
pub struct Pool {
    /// The pool's name.
    pub name: String,
    /// The pool's bindings.
    pub bindings: IndexMap<Interned, Value>,
}

impl Pool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: IndexMap::new(),
        }
    }

    pub fn lookup_binding(&self, name: Interned) -> Option<Value> {
        self.bindings.get(&name).cloned()
    }

    pub fn assign_binding(&mut self, name: Interned, value: Value) {
        self.bindings.insert(name, value);
    }
}
