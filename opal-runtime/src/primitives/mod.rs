//! Native members backing the primitive-mapped host types, and the
//! methods installed on the core classes at bootstrap.

pub mod array;
pub mod blocks;
pub mod boolean;
pub mod class;
pub mod double;
pub mod integer;
pub mod nil;
pub mod object;
pub mod pool;
pub mod string;
pub mod symbol;

use crate::error::RuntimeError;
use crate::invokable::Return;
use crate::receiver::TypeTag;
use crate::vm_objects::method::PrimitiveFn;

/// A table of named native members.
pub type PrimitiveTable = &'static [(&'static str, PrimitiveFn)];

/// The native member a primitive-mapped receiver is offered before
/// language lookup runs, if the host type has one under that name.
pub fn host_member(tag: TypeTag, name: &str) -> Option<PrimitiveFn> {
    let table: PrimitiveTable = match tag {
        TypeTag::Nil => nil::MEMBERS,
        TypeTag::Boolean => boolean::MEMBERS,
        TypeTag::Integer => integer::MEMBERS,
        TypeTag::Double => double::MEMBERS,
        TypeTag::String => string::MEMBERS,
        TypeTag::Symbol => symbol::MEMBERS,
        // Pools are language objects; their members resolve by lookup.
        TypeTag::Pool => return None,
    };
    table.iter().find(|(member, _)| *member == name).map(|(_, func)| *func)
}

/// The methods installed on a core class at bootstrap, instance side.
pub fn get_instance_primitives(class_name: &str) -> Option<PrimitiveTable> {
    match class_name {
        "Object" => Some(object::INSTANCE_PRIMITIVES),
        "Class" => Some(class::INSTANCE_PRIMITIVES),
        "Array" => Some(array::INSTANCE_PRIMITIVES),
        "Block" => Some(blocks::INSTANCE_PRIMITIVES),
        "Pool" => Some(pool::INSTANCE_PRIMITIVES),
        // The host-type classes mirror their native member tables, so
        // that plain lookup and the native probe agree.
        "Nil" => Some(nil::MEMBERS),
        "Boolean" => Some(boolean::MEMBERS),
        "Integer" => Some(integer::MEMBERS),
        "Double" => Some(double::MEMBERS),
        "String" => Some(string::MEMBERS),
        "Symbol" => Some(symbol::MEMBERS),
        _ => None,
    }
}

/// The methods installed on a core class at bootstrap, class side.
pub fn get_class_primitives(class_name: &str) -> Option<PrimitiveTable> {
    match class_name {
        "Array" => Some(array::CLASS_PRIMITIVES),
        _ => None,
    }
}

pub(crate) fn wrong_types(signature: &str) -> Return {
    Return::Exception(RuntimeError::msg(format!("{signature}: wrong argument types")))
}
