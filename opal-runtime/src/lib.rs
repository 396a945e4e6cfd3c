//!
//! This is the message-dispatch execution core for the Opal object language:
//! method lookup over the class hierarchy, call-site binders with guarded
//! inline caches, the per-runtime binder cache table, and the compilation
//! contexts that lower blocks and non-local returns.
//!

use std::cell::RefCell;
use std::rc::Rc;

macro_rules! propagate {
    ($expr:expr) => {
        match $expr {
            Return::Local(value) => value,
            ret => return ret,
        }
    };
}

/// The lowered tree executed by the evaluator.
pub mod ast;
/// Call-site binders, guards and dispatch targets.
pub mod binder;
/// The per-runtime binder cache table.
pub mod cache;
/// Lowers the source AST through a chain of compilation contexts.
pub mod compiler;
/// The runtime error taxonomy.
pub mod error;
/// Facilities for evaluating nodes and expressions.
pub mod evaluate;
/// Facilities for invoking methods and blocks.
pub mod invokable;
/// The method lookup engine.
pub mod lookup;
/// Host members for primitive-mapped receivers.
pub mod primitives;
/// Receiver-shape classification.
pub mod receiver;
/// The runtime instance.
pub mod universe;
/// Facilities for manipulating values.
pub mod value;
/// VM-specific objects.
pub mod vm_objects;

/// A mutably shared reference to a runtime object.
pub type ObjRef<T> = Rc<RefCell<T>>;
