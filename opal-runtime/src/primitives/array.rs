use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::invokable::Return;
use crate::primitives::{wrong_types, PrimitiveTable};
use crate::universe::Universe;
use crate::value::Value;

pub static INSTANCE_PRIMITIVES: PrimitiveTable = &[("at:", at), ("at:put:", at_put), ("length", length), ("size", length)];

pub static CLASS_PRIMITIVES: PrimitiveTable = &[("new:", new_with_length)];

fn index_error(signature: &str, index: i64, length: usize) -> Return {
    Return::Exception(RuntimeError::msg(format!("{signature}: index {index} out of bounds (length {length})")))
}

fn checked_index(index: i64) -> Option<usize> {
    index.checked_sub(1).and_then(|idx| usize::try_from(idx).ok())
}

fn at(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Array(values), Value::Integer(index)] => {
            let values = values.borrow();
            // Indices are 1-based.
            match checked_index(*index).and_then(|idx| values.get(idx)) {
                Some(value) => Return::Local(value.clone()),
                None => index_error("Array>>#at:", *index, values.len()),
            }
        }
        _ => wrong_types("Array>>#at:"),
    }
}

fn at_put(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [receiver @ Value::Array(values), Value::Integer(index), value] => {
            let mut borrowed = values.borrow_mut();
            let length = borrowed.len();
            match checked_index(*index).and_then(|idx| borrowed.get_mut(idx)) {
                Some(slot) => {
                    *slot = value.clone();
                    drop(borrowed);
                    Return::Local(receiver.clone())
                }
                None => index_error("Array>>#at:put:", *index, length),
            }
        }
        _ => wrong_types("Array>>#at:put:"),
    }
}

fn length(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Array(values)] => Return::Local(Value::Integer(values.borrow().len() as i64)),
        _ => wrong_types("Array>>#length"),
    }
}

fn new_with_length(_: &mut Universe, args: Vec<Value>) -> Return {
    match args.as_slice() {
        [Value::Class(_), Value::Integer(length)] if *length >= 0 => {
            Return::Local(Value::Array(Rc::new(RefCell::new(vec![Value::Nil; *length as usize]))))
        }
        _ => wrong_types("Array class>>#new:"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_value_indices_are_reported_out_of_bounds() {
        let mut universe = Universe::default();
        let array = Value::Array(Rc::new(RefCell::new(vec![Value::Integer(1)])));
        assert!(matches!(
            at(&mut universe, vec![array.clone(), Value::Integer(i64::MIN)]),
            Return::Exception(RuntimeError::Msg(_))
        ));
        assert!(matches!(
            at_put(&mut universe, vec![array, Value::Integer(i64::MIN), Value::Nil]),
            Return::Exception(RuntimeError::Msg(_))
        ));
    }
}
