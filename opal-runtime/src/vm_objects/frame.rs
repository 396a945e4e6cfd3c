use std::rc::Rc;

use crate::value::Value;
use crate::vm_objects::block::Block;
use crate::vm_objects::class::Class;
use crate::ObjRef;
use opal_core::interner::Interned;

/// The identity token of one method activation, used to match a non-local
/// return from a nested block to its defining activation.
///
/// Compared only with `Rc::ptr_eq`, never by value. Materialized only for
/// activations of methods that contain at least one true block.
#[derive(Debug)]
pub struct HomeContext;

/// The kind of a given frame.
#[derive(Debug, Clone)]
pub enum FrameKind {
    /// A frame created from a block evaluation.
    Block {
        /// The block instance for the current frame.
        block: Rc<Block>,
    },
    /// A frame created from a method invocation.
    Method {
        /// The holder of the current method.
        holder: ObjRef<Class>,
        /// The current method's selector.
        selector: Interned,
    },
}

/// Represents a stack frame: one activation of a method or block.
///
/// `params[0]` is the receiver for method frames and the block value for
/// block frames; user arguments follow.
#[derive(Debug)]
pub struct Frame {
    /// This frame's kind.
    pub kind: FrameKind,
    /// The arguments to this activation, receiver first.
    pub params: Vec<Value>,
    /// The local variables of this activation.
    pub locals: Vec<Value>,
    /// The home-context token, present only on method activations whose
    /// compiled body requires one.
    pub home: Option<Rc<HomeContext>>,
}

impl Frame {
    /// Construct a method frame. The home context is materialized here, at
    /// activation, when the compiled method asked for one.
    pub fn for_method(holder: ObjRef<Class>, selector: Interned, params: Vec<Value>, nbr_locals: u8, needs_home: bool) -> Self {
        Self {
            kind: FrameKind::Method { holder, selector },
            params,
            locals: vec![Value::Nil; nbr_locals as usize],
            home: needs_home.then(|| Rc::new(HomeContext)),
        }
    }

    /// Construct a block frame. Blocks never own a home context; a `^` in
    /// a block targets the home of its defining method activation.
    pub fn for_block(block: Rc<Block>, mut args: Vec<Value>) -> Self {
        let nbr_locals = block.ast.nbr_locals;
        let kind = FrameKind::Block { block: block.clone() };
        let mut params = vec![Value::Block(block)];
        params.append(&mut args);
        Self {
            kind,
            params,
            locals: vec![Value::Nil; nbr_locals as usize],
            home: None,
        }
    }

    /// Get the lexical frame `n` scopes back, following captured frames of
    /// blocks. `n == 0` is the frame itself.
    pub fn nth_frame_back(frame: &ObjRef<Frame>, n: u8) -> ObjRef<Frame> {
        let mut current = frame.clone();
        for _ in 0..n {
            let prev = match &current.borrow().kind {
                FrameKind::Block { block } => block.frame.clone(),
                FrameKind::Method { .. } => panic!("looking beyond a method frame: compiler produced a bad scope coordinate"),
            };
            current = prev;
        }
        current
    }

    /// Get the method frame this frame lexically belongs to.
    pub fn method_frame(frame: &ObjRef<Frame>) -> ObjRef<Frame> {
        let prev = match &frame.borrow().kind {
            FrameKind::Block { block } => block.frame.clone(),
            FrameKind::Method { .. } => return frame.clone(),
        };
        Self::method_frame(&prev)
    }

    /// Get the self value for this frame.
    pub fn get_self(frame: &ObjRef<Frame>) -> Value {
        Frame::method_frame(frame).borrow().params[0].clone()
    }

    pub fn lookup_argument(&self, idx: u8) -> Value {
        self.params[idx as usize].clone()
    }

    pub fn assign_argument(&mut self, idx: u8, value: Value) {
        self.params[idx as usize] = value;
    }

    pub fn lookup_local(&self, idx: u8) -> Value {
        self.locals[idx as usize].clone()
    }

    pub fn assign_local(&mut self, idx: u8, value: Value) {
        self.locals[idx as usize] = value;
    }
}
