use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[("asString", as_string), ("=", eq), ("~=", ne), ("==", eq)];

fn as_string(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Symbol(value)] => Return::Local(Value::String(Rc::new(universe.lookup_symbol(*value).to_string()))),
        _ => wrong_types("Symbol>>#asString"),
    }
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Symbol>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Symbol>>#~="),
    }
}
