use std::cell::RefCell;
use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::instance::Instance;

/// Installed instance-side on the Class core class: the protocol every
/// class object answers when its own class-side dictionaries miss.
pub static INSTANCE_PRIMITIVES: PrimitiveTable = &[("new", new), ("name", name), ("superclass", superclass)];

fn new(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Class(class)] => {
            let instance = Instance::from_class(class.clone());
            Return::Local(Value::Instance(Rc::new(RefCell::new(instance))))
        }
        _ => wrong_types("Class>>#new"),
    }
}

fn name(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Class(class)] => Return::Local(Value::String(Rc::new(class.borrow().name.clone()))),
        _ => wrong_types("Class>>#name"),
    }
}

fn superclass(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Class(class)] => {
            let super_class = class.borrow().super_class();
            Return::Local(super_class.map_or(Value::Nil, Value::Class))
        }
        _ => wrong_types("Class>>#superclass"),
    }
}
