use std::fmt;
use std::rc::Rc;

use crate::universe::Universe;
use crate::vm_objects::block::Block;
use crate::vm_objects::class::Class;
use crate::vm_objects::instance::Instance;
use crate::vm_objects::pool::Pool;
use crate::ObjRef;
use opal_core::interner::Interned;

/// Represents an Opal value.
#[derive(Clone)]
pub enum Value {
    /// The **nil** value.
    Nil,
    /// A boolean value (**true** or **false**).
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Double(f64),
    /// An interned symbol value.
    Symbol(Interned),
    /// A string value.
    String(Rc<String>),
    /// An array of values.
    Array(ObjRef<Vec<Value>>),
    /// A block value, ready to be evaluated.
    Block(Rc<Block>),
    /// A class object.
    Class(ObjRef<Class>),
    /// A generic (non-primitive) class instance.
    Instance(ObjRef<Instance>),
    /// A shared pool of named bindings.
    Pool(ObjRef<Pool>),
}

impl Value {
    /// Get the class of the current value.
    pub fn class(&self, universe: &Universe) -> ObjRef<Class> {
        match self {
            Self::Nil => universe.core.nil_class.clone(),
            Self::Boolean(_) => universe.core.boolean_class.clone(),
            Self::Integer(_) => universe.core.integer_class.clone(),
            Self::Double(_) => universe.core.double_class.clone(),
            Self::Symbol(_) => universe.core.symbol_class.clone(),
            Self::String(_) => universe.core.string_class.clone(),
            Self::Array(_) => universe.core.array_class.clone(),
            Self::Block(_) => universe.core.block_class.clone(),
            Self::Class(_) => universe.core.metaclass_class.clone(),
            Self::Instance(instance) => instance.borrow().class(),
            Self::Pool(_) => universe.core.pool_class.clone(),
        }
    }

    /// Returns whether this value is a language-side object, as opposed to
    /// a primitive-mapped host value.
    pub fn is_language_object(&self) -> bool {
        matches!(self, Self::Instance(_) | Self::Class(_) | Self::Array(_) | Self::Block(_) | Self::Pool(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Interned> {
        match self {
            Self::Symbol(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&Rc<String>> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ObjRef<Vec<Value>>> {
        match self {
            Self::Array(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Rc<Block>> {
        match self {
            Self::Block(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ObjRef<Class>> {
        match self {
            Self::Class(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&ObjRef<Instance>> {
        match self {
            Self::Instance(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_pool(&self) -> Option<&ObjRef<Pool>> {
        match self {
            Self::Pool(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(a), Self::Double(b)) | (Self::Double(b), Self::Integer(a)) => (*a as f64) == *b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Block(a), Self::Block(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Pool(a), Self::Pool(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Boolean(value) => f.debug_tuple("Boolean").field(value).finish(),
            Self::Integer(value) => f.debug_tuple("Integer").field(value).finish(),
            Self::Double(value) => f.debug_tuple("Double").field(value).finish(),
            Self::Symbol(value) => f.debug_tuple("Symbol").field(value).finish(),
            Self::String(value) => f.debug_tuple("String").field(value).finish(),
            Self::Array(value) => f.debug_tuple("Array").field(&value.borrow().len()).finish(),
            Self::Block(value) => f.debug_tuple("Block").field(&value.nbr_params()).finish(),
            Self::Class(value) => f.debug_tuple("Class").field(&value.borrow().name).finish(),
            Self::Instance(value) => f.debug_tuple("Instance").field(&value.borrow().class().borrow().name).finish(),
            Self::Pool(value) => f.debug_tuple("Pool").field(&value.borrow().name).finish(),
        }
    }
}
