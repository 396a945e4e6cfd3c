use std::rc::Rc;

use crate::error::RuntimeError;
use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[
    ("+", add),
    ("-", subtract),
    ("*", multiply),
    ("/", divide),
    ("%", modulo),
    ("<", lt),
    (">", gt),
    ("<=", le),
    (">=", ge),
    ("=", eq),
    ("~=", ne),
    ("==", eq),
    ("negated", negated),
    ("abs", abs),
    ("asDouble", as_double),
    ("asString", as_string),
];

fn add(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Integer(a.wrapping_add(*b))),
        [Value::Integer(a), Value::Double(b)] => Return::Local(Value::Double(*a as f64 + b)),
        _ => wrong_types("Integer>>#+"),
    }
}

fn subtract(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Integer(a.wrapping_sub(*b))),
        [Value::Integer(a), Value::Double(b)] => Return::Local(Value::Double(*a as f64 - b)),
        _ => wrong_types("Integer>>#-"),
    }
}

fn multiply(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Integer(a.wrapping_mul(*b))),
        [Value::Integer(a), Value::Double(b)] => Return::Local(Value::Double(*a as f64 * b)),
        _ => wrong_types("Integer>>#*"),
    }
}

fn divide(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(_), Value::Integer(0)] => Return::Exception(RuntimeError::msg("Integer>>#/: division by zero")),
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Integer(a.wrapping_div(*b))),
        [Value::Integer(a), Value::Double(b)] => Return::Local(Value::Double(*a as f64 / b)),
        _ => wrong_types("Integer>>#/"),
    }
}

fn modulo(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(_), Value::Integer(0)] => Return::Exception(RuntimeError::msg("Integer>>#%: division by zero")),
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Integer(a.rem_euclid(*b))),
        _ => wrong_types("Integer>>#%"),
    }
}

fn compare(args: &[Value], signature: &str, cmp: fn(f64, f64) -> bool) -> Return {
    match args {
        [Value::Integer(a), Value::Integer(b)] => Return::Local(Value::Boolean(cmp(*a as f64, *b as f64))),
        [Value::Integer(a), Value::Double(b)] => Return::Local(Value::Boolean(cmp(*a as f64, *b))),
        _ => wrong_types(signature),
    }
}

fn lt(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Integer>>#<", |a, b| a < b)
}

fn gt(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Integer>>#>", |a, b| a > b)
}

fn le(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Integer>>#<=", |a, b| a <= b)
}

fn ge(_: &mut Universe, args: Vec<Value>) -> Return {
    compare(&args, "Integer>>#>=", |a, b| a >= b)
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Integer>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Integer>>#~="),
    }
}

fn negated(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a)] => Return::Local(Value::Integer(a.wrapping_neg())),
        _ => wrong_types("Integer>>#negated"),
    }
}

fn abs(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a)] => Return::Local(Value::Integer(a.wrapping_abs())),
        _ => wrong_types("Integer>>#abs"),
    }
}

fn as_double(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a)] => Return::Local(Value::Double(*a as f64)),
        _ => wrong_types("Integer>>#asDouble"),
    }
}

fn as_string(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Integer(a)] => Return::Local(Value::String(Rc::new(a.to_string()))),
        _ => wrong_types("Integer>>#asString"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(ret: Return) -> Value {
        match ret {
            Return::Local(value) => value,
            other => panic!("expected a local return, got {other:?}"),
        }
    }

    #[test]
    fn minimum_value_operands_wrap_instead_of_aborting() {
        let mut universe = Universe::default();
        let min = Value::Integer(i64::MIN);
        assert_eq!(answer(negated(&mut universe, vec![min.clone()])), min);
        assert_eq!(answer(abs(&mut universe, vec![min.clone()])), min);
        assert_eq!(
            answer(divide(&mut universe, vec![min.clone(), Value::Integer(-1)])),
            min
        );
    }
}
