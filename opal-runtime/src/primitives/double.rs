use std::rc::Rc;

use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[
    ("+", add),
    ("-", subtract),
    ("*", multiply),
    ("/", divide),
    ("<", lt),
    (">", gt),
    ("<=", le),
    (">=", ge),
    ("=", eq),
    ("~=", ne),
    ("==", eq),
    ("sqrt", sqrt),
    ("round", round),
    ("asInteger", as_integer),
    ("asString", as_string),
];

fn promote(value: &Value) -> Option<f64> {
    match value {
        Value::Double(value) => Some(*value),
        Value::Integer(value) => Some(*value as f64),
        _ => None,
    }
}

fn arith(args: &[Value], signature: &str, op: fn(f64, f64) -> f64) -> Return {
    match args {
        [Value::Double(a), b] => match promote(b) {
            Some(b) => Return::Local(Value::Double(op(*a, b))),
            None => wrong_types(signature),
        },
        _ => wrong_types(signature),
    }
}

fn compare(args: &[Value], signature: &str, cmp: fn(f64, f64) -> bool) -> Return {
    match args {
        [Value::Double(a), b] => match promote(b) {
            Some(b) => Return::Local(Value::Boolean(cmp(*a, b))),
            None => wrong_types(signature),
        },
        _ => wrong_types(signature),
    }
}

fn add(_: &mut Universe, args: Vec<Value>) -> Return {
    arith(&args, "Double>>#+", |a, b| a + b)
}

fn subtract(_: &mut Universe, args: Vec<Value>) -> Return {
    arith(&args, "Double>>#-", |a, b| a - b)
}

fn multiply(_: &mut Universe, args: Vec<Value>) -> Return {
    arith(&args, "Double>>#*", |a, b| a * b)
}

fn divide(_: &mut Universe, args: Vec<Value>) -> Return {
    arith(&args, "Double>>#/", |a, b| a / b)
}

fn lt(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Double>>#<", |a, b| a < b)
}

fn gt(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Double>>#>", |a, b| a > b)
}

fn le(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Double>>#<=", |a, b| a <= b)
}

fn ge(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Double>>#>=", |a, b| a >= b)
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Double>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Double>>#~="),
    }
}

fn sqrt(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Double(a)] => Return::Local(Value::Double(a.sqrt())),
        _ => wrong_types("Double>>#sqrt"),
    }
}

fn round(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Double(a)] => Return::Local(Value::Integer(a.round() as i64)),
        _ => wrong_types("Double>>#round"),
    }
}

fn as_integer(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Double(a)] => Return::Local(Value::Integer(a.trunc() as i64)),
        _ => wrong_types("Double>>#asInteger"),
    }
}

fn as_string(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Double(a)] => Return::Local(Value::String(Rc::new(a.to_string()))),
        _ => wrong_types("Double>>#asString"),
    }
}
