use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[
    ("length", length),
    ("size", length),
    (",", concatenate),
    ("concatenate:", concatenate),
    ("=", eq),
    ("~=", ne),
    ("asSymbol", as_symbol),
    ("asString", as_string),
];

fn length(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::String(value)] => Return::Local(Value::Integer(value.chars().count() as i64)),
        _ => wrong_types("String>>#length"),
    }
}

fn concatenate(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::String(a), Value::String(b)] => Return::Local(Value::String(Rc::new(format!("{a}{b}")))),
        _ => wrong_types("String>>#,"),
    }
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("String>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("String>>#~="),
    }
}

fn as_symbol(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::String(value)] => {
            let symbol = universe.intern_symbol(value.as_str());
            Return::Local(Value::Symbol(symbol))
        }
        _ => wrong_types("String>>#asSymbol"),
    }
}

fn as_string(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver @ Value::String(_)] => Return::Local(receiver.clone()),
        _ => wrong_types("String>>#asString"),
    }
}
