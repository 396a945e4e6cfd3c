use std::fmt;

use crate::value::Value;
use crate::vm_objects::class::Class;
use crate::ObjRef;

/// Represents a generic (non-primitive) class instance.
pub struct Instance {
    /// The class of which this is an instance.
    pub class: ObjRef<Class>,
    /// This instance's fields, inherited fields included.
    pub fields: Vec<Value>,
}

impl Instance {
    /// Construct an instance for a given class, with all fields nil.
    pub fn from_class(class: ObjRef<Class>) -> Self {
        let nbr_fields = class.borrow().total_fields();
        Self {
            class,
            fields: vec![Value::Nil; nbr_fields],
        }
    }

    /// Get the class of which this is an instance.
    pub fn class(&self) -> ObjRef<Class> {
        self.class.clone()
    }

    /// Search for a field binding.
    pub fn lookup_field(&self, idx: u8) -> Option<Value> {
        self.fields.get(idx as usize).cloned()
    }

    /// Assign a value to a field binding.
    pub fn assign_field(&mut self, idx: u8, value: Value) -> Option<()> {
        *self.fields.get_mut(idx as usize)? = value;
        Some(())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.borrow().name)
            .field("fields", &self.fields.len())
            .finish()
    }
}
