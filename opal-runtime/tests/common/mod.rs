#![allow(dead_code)]

use opal_runtime::invokable::Return;
use opal_runtime::value::Value;
use opal_core::ast::{Block, Body, Expression, Literal, Message, MethodDef};

pub fn method(selector: &str, nbr_locals: usize, exprs: Vec<Expression>) -> MethodDef {
    MethodDef {
        selector: selector.to_string(),
        nbr_locals,
        body: Body { exprs },
    }
}

pub fn msg(receiver: Expression, selector: &str, values: Vec<Expression>) -> Expression {
    Expression::Message(Box::new(Message {
        receiver,
        selector: selector.to_string(),
        values,
    }))
}

pub fn block(nbr_params: usize, nbr_locals: usize, exprs: Vec<Expression>) -> Expression {
    Expression::Block(Box::new(Block {
        nbr_params,
        nbr_locals,
        body: Body { exprs },
    }))
}

pub fn exit(expr: Expression) -> Expression {
    Expression::Exit(Box::new(expr))
}

pub fn int(value: i64) -> Expression {
    Expression::Literal(Literal::Integer(value))
}

pub fn sym(name: &str) -> Expression {
    Expression::Literal(Literal::Symbol(name.to_string()))
}

pub fn global(name: &str) -> Expression {
    Expression::GlobalRead(name.to_string())
}

pub fn self_read() -> Expression {
    Expression::ArgRead(0, 0)
}

pub fn unwrap_local(ret: Return) -> Value {
    match ret {
        Return::Local(value) => value,
        other => panic!("expected a local return, got {other:?}"),
    }
}
