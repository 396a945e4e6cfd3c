use crate::error::RuntimeError;
use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: PrimitiveTable = &[
    ("class", class),
    ("=", eq),
    ("~=", ne),
    ("==", eq),
    ("isNil", is_nil),
    ("notNil", not_nil),
    ("doesNotUnderstand:arguments:", does_not_understand),
];

fn class(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver] => Return::Local(Value::Class(receiver.class(universe))),
        _ => wrong_types("Object>>#class"),
    }
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Object>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Object>>#~="),
    }
}

fn is_nil(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver] => Return::Local(Value::Boolean(receiver.is_nil())),
        _ => wrong_types("Object>>#isNil"),
    }
}

fn not_nil(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver] => Return::Local(Value::Boolean(!receiver.is_nil())),
        _ => wrong_types("Object>>#notNil"),
    }
}

/// The root does-not-understand handler: unless a class along the chain
/// overrides it, an unresolved send surfaces as a message-not-understood
/// error.
fn does_not_understand(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver, Value::Symbol(selector), Value::Array(_)] => {
            let class = match receiver {
                Value::Class(class) => format!("{} class", class.borrow().name),
                _ => receiver.class(universe).borrow().name.clone(),
            };
            Return::Exception(RuntimeError::MessageNotUnderstood {
                class,
                selector: universe.lookup_symbol(*selector).to_string(),
            })
        }
        _ => wrong_types("Object>>#doesNotUnderstand:arguments:"),
    }
}
