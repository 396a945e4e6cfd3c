use crate::invokable::{Invoke, Return};
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static MEMBERS: PrimitiveTable = &[
    ("not", not),
    ("&", and_value),
    ("|", or_value),
    ("and:", and),
    ("or:", or),
    ("ifTrue:", if_true),
    ("ifFalse:", if_false),
    ("ifTrue:ifFalse:", if_true_if_false),
    ("=", eq),
    ("~=", ne),
    ("==", eq),
];

/// Force an `and:`/`or:` style operand: a block is invoked, a plain
/// boolean passes through.
fn force_operand(universe: &mut Universe, operand: &Value, signature: &str) -> Return {
    match operand {
        Value::Block(block) => block.invoke(universe, vec![]),
        Value::Boolean(value) => Return::Local(Value::Boolean(*value)),
        _ => wrong_types(signature),
    }
}

fn not(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(a)] => Return::Local(Value::Boolean(!a)),
        _ => wrong_types("Boolean>>#not"),
    }
}

fn and_value(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(a), Value::Boolean(b)] => Return::Local(Value::Boolean(*a && *b)),
        _ => wrong_types("Boolean>>#&"),
    }
}

fn or_value(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(a), Value::Boolean(b)] => Return::Local(Value::Boolean(*a || *b)),
        _ => wrong_types("Boolean>>#|"),
    }
}

fn and(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(false), _] => Return::Local(Value::Boolean(false)),
        [Value::Boolean(true), operand] => force_operand(universe, operand, "Boolean>>#and:"),
        _ => wrong_types("Boolean>>#and:"),
    }
}

fn or(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(true), _] => Return::Local(Value::Boolean(true)),
        [Value::Boolean(false), operand] => force_operand(universe, operand, "Boolean>>#or:"),
        _ => wrong_types("Boolean>>#or:"),
    }
}

fn if_true(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(true), Value::Block(block)] => block.invoke(universe, vec![]),
        [Value::Boolean(false), Value::Block(_)] => Return::Local(Value::Nil),
        _ => wrong_types("Boolean>>#ifTrue:"),
    }
}

fn if_false(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(false), Value::Block(block)] => block.invoke(universe, vec![]),
        [Value::Boolean(true), Value::Block(_)] => Return::Local(Value::Nil),
        _ => wrong_types("Boolean>>#ifFalse:"),
    }
}

fn if_true_if_false(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Boolean(true), Value::Block(block), Value::Block(_)] => block.invoke(universe, vec![]),
        [Value::Boolean(false), Value::Block(_), Value::Block(block)] => block.invoke(universe, vec![]),
        _ => wrong_types("Boolean>>#ifTrue:ifFalse:"),
    }
}

fn eq(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a == b)),
        _ => wrong_types("Boolean>>#="),
    }
}

fn ne(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [a, b] => Return::Local(Value::Boolean(a != b)),
        _ => wrong_types("Boolean>>#~="),
    }
}
