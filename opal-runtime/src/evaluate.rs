use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{
    AndInlinedNode, AstBody, AstDispatch, AstExpression, AstLiteral, AstSuperDispatch, IfInlinedNode, IfTrueIfFalseInlinedNode, InlinedNode,
    OrInlinedNode, WhileInlinedNode,
};
use crate::error::RuntimeError;
use crate::invokable::Return;
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::block::Block;
use crate::vm_objects::frame::{Frame, FrameKind};

/// The trait for evaluating nodes of the lowered tree.
pub trait Evaluate {
    /// Evaluate the node within a given universe.
    fn evaluate(&self, universe: &mut Universe) -> Return;
}

impl Evaluate for AstExpression {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        match self {
            Self::GlobalRead(name) => match universe.lookup_global(*name) {
                Some(value) => Return::Local(value),
                None => Return::Exception(RuntimeError::msg(format!("global variable '{}' not found", universe.lookup_symbol(*name)))),
            },
            Self::LocalVarRead(idx) => {
                let value = universe.current_frame().borrow().lookup_local(*idx);
                Return::Local(value)
            }
            Self::NonLocalVarRead(scope, idx) => {
                let frame = Frame::nth_frame_back(&universe.current_frame(), *scope);
                let value = frame.borrow().lookup_local(*idx);
                Return::Local(value)
            }
            Self::ArgRead(scope, idx) => {
                let frame = Frame::nth_frame_back(&universe.current_frame(), *scope);
                let value = frame.borrow().lookup_argument(*idx);
                Return::Local(value)
            }
            Self::FieldRead(idx) => read_field(universe, *idx),
            Self::LocalVarWrite(idx, expr) => {
                let value = propagate!(expr.evaluate(universe));
                universe.current_frame().borrow_mut().assign_local(*idx, value.clone());
                Return::Local(value)
            }
            Self::NonLocalVarWrite(scope, idx, expr) => {
                let value = propagate!(expr.evaluate(universe));
                let frame = Frame::nth_frame_back(&universe.current_frame(), *scope);
                frame.borrow_mut().assign_local(*idx, value.clone());
                Return::Local(value)
            }
            Self::ArgWrite(scope, idx, expr) => {
                let value = propagate!(expr.evaluate(universe));
                let frame = Frame::nth_frame_back(&universe.current_frame(), *scope);
                frame.borrow_mut().assign_argument(*idx, value.clone());
                Return::Local(value)
            }
            Self::FieldWrite(idx, expr) => {
                let value = propagate!(expr.evaluate(universe));
                write_field(universe, *idx, value)
            }
            Self::Literal(literal) => literal.evaluate(universe),
            Self::Block(ast_block) => {
                let block = Block {
                    ast: ast_block.clone(),
                    frame: universe.current_frame(),
                };
                Return::Local(Value::Block(Rc::new(block)))
            }
            Self::LocalExit(expr) => {
                let value = propagate!(expr.evaluate(universe));
                Return::Exit(value)
            }
            Self::NonLocalExit(expr, scope) => {
                let value = propagate!(expr.evaluate(universe));
                exit_non_local(universe, value, *scope, false)
            }
            Self::RaiseExit(expr, scope) => {
                let value = propagate!(expr.evaluate(universe));
                exit_non_local(universe, value, *scope, true)
            }
            Self::UnwindHandler(body) => match body.evaluate(universe) {
                Return::Unwind(value, home) => {
                    let frame = universe.current_frame();
                    let owns_home = frame.borrow().home.as_ref().is_some_and(|own| Rc::ptr_eq(own, &home));
                    if owns_home {
                        Return::Exit(value)
                    } else {
                        // Not meant for this activation: re-raise unchanged.
                        Return::Unwind(value, home)
                    }
                }
                ret => ret,
            },
            Self::Dispatch(node) => node.evaluate(universe),
            Self::SuperDispatch(node) => node.evaluate(universe),
            Self::InlinedCall(node) => match node.as_ref() {
                InlinedNode::If(node) => node.evaluate(universe),
                InlinedNode::IfTrueIfFalse(node) => node.evaluate(universe),
                InlinedNode::While(node) => node.evaluate(universe),
                InlinedNode::And(node) => node.evaluate(universe),
                InlinedNode::Or(node) => node.evaluate(universe),
            },
        }
    }
}

fn read_field(universe: &mut Universe, idx: u8) -> Return {
    let self_value = Frame::get_self(&universe.current_frame());
    match self_value.as_instance() {
        Some(instance) => match instance.borrow().lookup_field(idx) {
            Some(value) => Return::Local(value),
            None => Return::Exception(RuntimeError::msg(format!("no field at offset {}", idx))),
        },
        None => Return::Exception(RuntimeError::msg("field access on a non-instance receiver")),
    }
}

fn write_field(universe: &mut Universe, idx: u8, value: Value) -> Return {
    let self_value = Frame::get_self(&universe.current_frame());
    match self_value.as_instance() {
        Some(instance) => match instance.borrow_mut().assign_field(idx, value.clone()) {
            Some(()) => Return::Local(value),
            None => Return::Exception(RuntimeError::msg(format!("no field at offset {}", idx))),
        },
        None => Return::Exception(RuntimeError::msg("field access on a non-instance receiver")),
    }
}

/// Execute a `^` from inside a true block.
///
/// The home activation must still be live: a block invoked after its home
/// method has returned has no activation to return to, which is a defined
/// runtime error under both unwind policies.
fn exit_non_local(universe: &mut Universe, value: Value, scope: u8, raise: bool) -> Return {
    let current = universe.current_frame();
    let target = Frame::nth_frame_back(&current, scope);

    let home = match &target.borrow().home {
        Some(home) => home.clone(),
        None => return Return::Exception(RuntimeError::msg("non-local return but the home activation has no home context")),
    };

    let is_live = universe.frames.iter().rev().any(|frame| Rc::ptr_eq(frame, &target));
    if !is_live {
        let selector = match &target.borrow().kind {
            FrameKind::Method { selector, .. } => universe.lookup_symbol(*selector).to_string(),
            FrameKind::Block { .. } => "<block>".to_string(),
        };
        return Return::Exception(RuntimeError::EscapedBlockReturn { selector });
    }

    if raise {
        Return::Unwind(value, home)
    } else {
        Return::NonLocal(value, home)
    }
}

impl Evaluate for AstLiteral {
    fn evaluate(&self, _: &mut Universe) -> Return {
        Return::Local(literal_to_value(self))
    }
}

fn literal_to_value(literal: &AstLiteral) -> Value {
    match literal {
        AstLiteral::Integer(value) => Value::Integer(*value),
        AstLiteral::Double(value) => Value::Double(*value),
        AstLiteral::Boolean(value) => Value::Boolean(*value),
        AstLiteral::String(value) => Value::String(value.clone()),
        AstLiteral::Symbol(value) => Value::Symbol(*value),
        AstLiteral::Array(values) => Value::Array(Rc::new(RefCell::new(values.iter().map(literal_to_value).collect()))),
        AstLiteral::Nil => Value::Nil,
    }
}

impl Evaluate for AstDispatch {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let receiver = propagate!(self.receiver.evaluate(universe));
        let mut args = Vec::with_capacity(self.values.len());
        for expr in &self.values {
            args.push(propagate!(expr.evaluate(universe)));
        }
        self.site.dispatch(universe, receiver, args)
    }
}

impl Evaluate for AstSuperDispatch {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let receiver = Frame::get_self(&universe.current_frame());
        let mut args = Vec::with_capacity(self.values.len());
        for expr in &self.values {
            args.push(propagate!(expr.evaluate(universe)));
        }
        self.site.dispatch(universe, receiver, args)
    }
}

impl Evaluate for AstBody {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let mut last_value = Value::Nil;
        for expr in &self.exprs {
            last_value = propagate!(expr.evaluate(universe));
        }
        Return::Local(last_value)
    }
}

fn expect_boolean(value: Value) -> Result<bool, RuntimeError> {
    value
        .as_boolean()
        .ok_or_else(|| RuntimeError::msg(format!("inlined condition expected a boolean, got {:?}", value)))
}

impl Evaluate for IfInlinedNode {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let cond = match expect_boolean(propagate!(self.cond_expr.evaluate(universe))) {
            Ok(cond) => cond,
            Err(err) => return Return::Exception(err),
        };
        if cond == self.expected_bool {
            self.body_instrs.evaluate(universe)
        } else {
            Return::Local(Value::Nil)
        }
    }
}

impl Evaluate for IfTrueIfFalseInlinedNode {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let cond = match expect_boolean(propagate!(self.cond_expr.evaluate(universe))) {
            Ok(cond) => cond,
            Err(err) => return Return::Exception(err),
        };
        if cond == self.expected_bool {
            self.body_1_instrs.evaluate(universe)
        } else {
            self.body_2_instrs.evaluate(universe)
        }
    }
}

impl Evaluate for WhileInlinedNode {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        loop {
            let cond = match expect_boolean(propagate!(self.cond_instrs.evaluate(universe))) {
                Ok(cond) => cond,
                Err(err) => return Return::Exception(err),
            };
            if cond != self.expected_bool {
                break Return::Local(Value::Nil);
            }
            propagate!(self.body_instrs.evaluate(universe));
        }
    }
}

impl Evaluate for AndInlinedNode {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let first = match expect_boolean(propagate!(self.first.evaluate(universe))) {
            Ok(first) => first,
            Err(err) => return Return::Exception(err),
        };
        if first {
            self.second_instrs.evaluate(universe)
        } else {
            Return::Local(Value::Boolean(false))
        }
    }
}

impl Evaluate for OrInlinedNode {
    fn evaluate(&self, universe: &mut Universe) -> Return {
        let first = match expect_boolean(propagate!(self.first.evaluate(universe))) {
            Ok(first) => first,
            Err(err) => return Return::Exception(err),
        };
        if first {
            Return::Local(Value::Boolean(true))
        } else {
            self.second_instrs.evaluate(universe)
        }
    }
}
