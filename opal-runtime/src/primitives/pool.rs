use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;
use opal_core::interner::Interned;

pub static INSTANCE_PRIMITIVES: PrimitiveTable = &[("at:", at), ("at:put:", at_put), ("name", name), ("includesKey:", includes_key)];

/// Pool keys may be given as symbols or strings.
fn as_key(universe: &mut Universe, value: &Value) -> Option<Interned> {
    match value {
        Value::Symbol(symbol) => Some(*symbol),
        Value::String(string) => Some(universe.intern_symbol(string.as_str())),
        _ => None,
    }
}

fn at(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Pool(pool), key] => match as_key(universe, key) {
            Some(key) => Return::Local(pool.borrow().lookup_binding(key).unwrap_or(Value::Nil)),
            None => wrong_types("Pool>>#at:"),
        },
        _ => wrong_types("Pool>>#at:"),
    }
}

fn at_put(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Pool(pool), key, value] => match as_key(universe, key) {
            Some(key) => {
                pool.borrow_mut().assign_binding(key, value.clone());
                Return::Local(value.clone())
            }
            None => wrong_types("Pool>>#at:put:"),
        },
        _ => wrong_types("Pool>>#at:put:"),
    }
}

fn name(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Pool(pool)] => Return::Local(Value::String(Rc::new(pool.borrow().name.clone()))),
        _ => wrong_types("Pool>>#name"),
    }
}

fn includes_key(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Pool(pool), key] => match as_key(universe, key) {
            Some(key) => Return::Local(Value::Boolean(pool.borrow().lookup_binding(key).is_some())),
            None => wrong_types("Pool>>#includesKey:"),
        },
        _ => wrong_types("Pool>>#includesKey:"),
    }
}
