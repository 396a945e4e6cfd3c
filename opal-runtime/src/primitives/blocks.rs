use crate::invokable::{Invoke, Return};
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: PrimitiveTable = &[
    ("value", value),
    ("value:", value_1),
    ("value:value:", value_2),
    ("whileTrue:", while_true),
    ("whileFalse:", while_false),
    ("numArgs", num_args),
];

fn value(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Block(block)] => block.invoke(universe, vec![]),
        _ => wrong_types("Block>>#value"),
    }
}

fn value_1(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Block(block), arg] => block.invoke(universe, vec![arg.clone()]),
        _ => wrong_types("Block>>#value:"),
    }
}

fn value_2(universe: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Block(block), arg_1, arg_2] => block.invoke(universe, vec![arg_1.clone(), arg_2.clone()]),
        _ => wrong_types("Block>>#value:value:"),
    }
}

/// The dispatched form of a while loop, taken when a receiver or body is
/// not a literal block and the send could not be inlined.
fn while_loop(universe: &mut Universe, args: Vec<Value>, expected: bool) -> Return {
    let (cond, body) = match args.as_slice() {
        [Value::Block(cond), Value::Block(body)] => (cond.clone(), body.clone()),
        _ => return wrong_types("Block>>#whileTrue:"),
    };
    loop {
        let value = propagate!(cond.invoke(universe, vec![]));
        match value.as_boolean() {
            Some(value) if value == expected => {
                propagate!(body.invoke(universe, vec![]));
            }
            Some(_) => break Return::Local(Value::Nil),
            None => break wrong_types("Block>>#whileTrue:"),
        }
    }
}

fn while_true(universe: &mut Universe, args: Vec<Value>) -> Return {
    while_loop(universe, args, true)
}

fn while_false(universe: &mut Universe, args: Vec<Value>) -> Return {
    while_loop(universe, args, false)
}

fn num_args(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Block(block)] => Return::Local(Value::Integer(block.nbr_params() as i64)),
        _ => wrong_types("Block>>#numArgs"),
    }
}
