use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::vm_objects::method::{Method, MethodSide};
use crate::ObjRef;
use indexmap::IndexMap;
use opal_core::interner::Interned;

/// Represents a loaded class.
///
/// A class carries two method dictionaries: the instance side answers
/// messages sent to its instances, the class side answers messages sent to
/// the class object itself. Both dictionaries are append-then-freeze: once
/// the class is frozen, installing a method fails deterministically.
pub struct Class {
    /// The class' name.
    pub name: String,
    /// The superclass of this class. `None` only for the root Object class.
    pub super_class: Option<ObjRef<Class>>,
    /// The instance-side method dictionary.
    pub instance_methods: IndexMap<Interned, Rc<Method>>,
    /// The class-side method dictionary.
    pub class_methods: IndexMap<Interned, Rc<Method>>,
    /// The class' own field names (not counting inherited fields).
    pub field_names: Vec<String>,
    /// Whether the method dictionaries are write-protected.
    pub frozen: bool,
}

impl Class {
    pub fn new(name: impl Into<String>, super_class: Option<ObjRef<Class>>, field_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            super_class,
            instance_methods: IndexMap::new(),
            class_methods: IndexMap::new(),
            field_names,
            frozen: false,
        }
    }

    /// Get the class' name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get the superclass of this class.
    pub fn super_class(&self) -> Option<ObjRef<Class>> {
        self.super_class.clone()
    }

    fn methods(&self, side: MethodSide) -> &IndexMap<Interned, Rc<Method>> {
        match side {
            MethodSide::Instance => &self.instance_methods,
            MethodSide::Class => &self.class_methods,
        }
    }

    /// Probe this class' own dictionary for a selector, without walking the
    /// superclass chain.
    pub fn own_method(&self, side: MethodSide, selector: Interned) -> Option<Rc<Method>> {
        self.methods(side).get(&selector).cloned()
    }

    /// Install a method. Fails if the class has been frozen.
    pub fn define_method(&mut self, side: MethodSide, selector: Interned, method: Rc<Method>) -> Result<(), RuntimeError> {
        if self.frozen {
            return Err(RuntimeError::FrozenClass {
                class: self.name.clone(),
                selector: method.signature.clone(),
            });
        }
        match side {
            MethodSide::Instance => self.instance_methods.insert(selector, method),
            MethodSide::Class => self.class_methods.insert(selector, method),
        };
        Ok(())
    }

    /// Write-protect both method dictionaries.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// The total number of fields an instance of this class carries,
    /// inherited fields included.
    pub fn total_fields(&self) -> usize {
        let inherited = match self.super_class() {
            Some(super_class) => super_class.borrow().total_fields(),
            None => 0,
        };
        self.field_names.len() + inherited
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("instance_methods", &self.instance_methods.len())
            .field("class_methods", &self.class_methods.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}
