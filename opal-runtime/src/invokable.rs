use std::cell::RefCell;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::evaluate::Evaluate;
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::block::Block;
use crate::vm_objects::frame::{Frame, HomeContext};
use crate::vm_objects::method::{Method, MethodKind};

/// Represents the kinds of possible returns from an invocation.
#[derive(Debug)]
pub enum Return {
    /// A local return, the value is for the immediate caller.
    Local(Value),
    /// A `^` targeting the currently executing method activation.
    Exit(Value),
    /// A non-local return under the lightweight policy: the tagged value
    /// travels outward through ordinary returns, and only the method
    /// activation owning the home context unwraps it.
    NonLocal(Value, Rc<HomeContext>),
    /// A raised non-local return under the signal policy: caught only by
    /// the unwind handler of the activation owning the home context.
    Unwind(Value, Rc<HomeContext>),
    /// An error, expected to bubble all the way up.
    Exception(RuntimeError),
}

/// The trait for invoking methods and blocks.
pub trait Invoke {
    /// Invoke within the given universe and with the given arguments.
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return;
}

impl Invoke for Method {
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return {
        match &self.kind {
            MethodKind::Primitive(func) => func(universe, args),
            MethodKind::Lowered(def) => {
                let holder = match self.holder() {
                    Some(holder) => holder,
                    None => return Return::Exception(RuntimeError::msg("cannot invoke a method whose holder class is gone")),
                };
                let self_value = match args.first() {
                    Some(receiver) => receiver.clone(),
                    None => return Return::Exception(RuntimeError::msg("missing receiver for invocation")),
                };
                let selector = universe.intern_symbol(&self.signature);
                let frame = Rc::new(RefCell::new(Frame::for_method(holder, selector, args, def.nbr_locals, def.needs_home)));

                let ret = universe.with_frame(frame.clone(), |universe| def.body.evaluate(universe));
                match ret {
                    // Falling off the end of a method answers self.
                    Return::Local(_) => Return::Local(self_value),
                    Return::Exit(value) => Return::Local(value),
                    Return::NonLocal(value, home) => match &frame.borrow().home {
                        Some(own_home) if Rc::ptr_eq(own_home, &home) => Return::Local(value),
                        // Not meant for this activation: keep propagating.
                        _ => Return::NonLocal(value, home),
                    },
                    // Unwind signals are matched by the compiled-in unwind
                    // handler, never here.
                    other => other,
                }
            }
        }
    }
}

impl Invoke for Rc<Block> {
    /// Invoke a block with its user arguments (the block value itself is
    /// not part of `args`).
    fn invoke(&self, universe: &mut Universe, args: Vec<Value>) -> Return {
        if args.len() != self.ast.nbr_params as usize {
            return Return::Exception(RuntimeError::msg(format!(
                "wrong number of block arguments: expected {}, got {}",
                self.ast.nbr_params,
                args.len()
            )));
        }
        let frame = Rc::new(RefCell::new(Frame::for_block(self.clone(), args)));
        universe.with_frame(frame, |universe| self.ast.body.evaluate(universe))
    }
}
