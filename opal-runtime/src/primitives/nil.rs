use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[
    ("isNil", is_nil),
    ("notNil", not_nil),
    ("=", eq),
    ("~=", ne),
    ("==", eq),
    ("asString", as_string),
];

fn is_nil(_: &mut Universe, _: Vec<Value>) -> Return {
    Return::Local(Value::Boolean(true))
}

fn not_nil(_: &mut Universe, _: Vec<Value>) -> Return {
    Return::Local(Value::Boolean(false))
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Nil>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Nil>>#~="),
    }
}

fn as_string(_: &mut Universe, _: Vec<Value>) -> Return {
    Return::Local(Value::String(Rc::new("nil".to_string())))
}
