use crate::value::Value;

/// A type-level tag for receivers whose guard does not need a concrete
/// class identity: all values of the tag share one class per runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Nil,
    Boolean,
    Integer,
    Double,
    String,
    Symbol,
    Pool,
}

/// The closed set of receiver shapes the binder can dispatch over.
///
/// Each shape owns its class-derivation rule and its guard-construction
/// rule; the binder matches on this rather than on an open-ended receiver
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// A language-side object: instance, array or block. Guarded by
    /// concrete class identity.
    Object,
    /// An interned symbol. Guarded by type.
    Symbol,
    /// A shared binding pool. Guarded by type.
    Pool,
    /// A primitive-mapped host value. Guarded by type, narrowed by value
    /// for booleans.
    HostPrimitive(TypeTag),
    /// A class object. Dispatch probes the class side first.
    ClassObject,
}

impl ReceiverKind {
    /// Classify a receiver value.
    pub fn of(receiver: &Value) -> Self {
        match receiver {
            Value::Instance(_) | Value::Array(_) | Value::Block(_) => Self::Object,
            Value::Symbol(_) => Self::Symbol,
            Value::Pool(_) => Self::Pool,
            Value::Class(_) => Self::ClassObject,
            Value::Nil => Self::HostPrimitive(TypeTag::Nil),
            Value::Boolean(_) => Self::HostPrimitive(TypeTag::Boolean),
            Value::Integer(_) => Self::HostPrimitive(TypeTag::Integer),
            Value::Double(_) => Self::HostPrimitive(TypeTag::Double),
            Value::String(_) => Self::HostPrimitive(TypeTag::String),
        }
    }

    /// The type tag of a receiver, if its shape is guarded by type rather
    /// than by class identity.
    pub fn type_tag(receiver: &Value) -> Option<TypeTag> {
        match Self::of(receiver) {
            Self::HostPrimitive(tag) => Some(tag),
            Self::Symbol => Some(TypeTag::Symbol),
            Self::Pool => Some(TypeTag::Pool),
            _ => None,
        }
    }
}
