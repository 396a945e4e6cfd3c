use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use crate::ast::AstMethodDef;
use crate::invokable::Return;
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::class::Class;
use crate::ObjRef;

/// A host primitive. The first argument is always the receiver.
pub type PrimitiveFn = fn(&mut Universe, Vec<Value>) -> Return;

/// Which method dictionary of a class a method lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodSide {
    Instance,
    Class,
}

/// The kind of a method.
#[derive(Clone)]
pub enum MethodKind {
    /// A user-defined method, lowered to the runtime tree.
    Lowered(AstMethodDef),
    /// A host primitive.
    Primitive(PrimitiveFn),
}

/// Represents a compiled method.
#[derive(Clone)]
pub struct Method {
    pub kind: MethodKind,
    /// The class the method was defined in. Weak: the holder owns its
    /// methods, not the other way around.
    pub holder: Weak<RefCell<Class>>,
    pub side: MethodSide,
    pub signature: String,
}

impl Method {
    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    pub fn signature(&self) -> &str {
        self.signature.as_str()
    }

    /// Get the class the method was defined in, if it is still alive.
    pub fn holder(&self) -> Option<ObjRef<Class>> {
        self.holder.upgrade()
    }

    /// Whether this method is a host primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, MethodKind::Primitive(_))
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match &self.kind {
            MethodKind::Lowered(_) => "lowered",
            MethodKind::Primitive(_) => "primitive",
        };
        f.debug_struct("Method").field("signature", &self.signature).field("kind", &kind).finish()
    }
}
