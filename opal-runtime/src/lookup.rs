use std::rc::Rc;

use crate::error::RuntimeError;
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::class::Class;
use crate::vm_objects::method::{Method, MethodSide};
use crate::ObjRef;
use log::trace;
use opal_core::interner::Interned;

/// Resolve a selector against a class hierarchy.
///
/// With a super scope, classes are skipped until the scope class has been
/// passed: the scope class itself is always excluded, so lookup effectively
/// begins at its proper ancestor. Returns the method together with the
/// class that defines it.
pub fn lookup(
    start: &ObjRef<Class>,
    selector: Interned,
    side: MethodSide,
    super_scope: Option<&ObjRef<Class>>,
) -> Option<(Rc<Method>, ObjRef<Class>)> {
    let mut current = Some(start.clone());
    let mut scope_passed = super_scope.is_none();
    while let Some(class) = current {
        let next = class.borrow().super_class();
        if !scope_passed {
            if let Some(scope) = super_scope {
                if Rc::ptr_eq(&class, scope) {
                    scope_passed = true;
                }
            }
            current = next;
            continue;
        }
        let found = class.borrow().own_method(side, selector);
        if let Some(method) = found {
            return Some((method, class));
        }
        current = next;
    }
    None
}

/// Resolve a selector for a concrete receiver.
///
/// A class receiver probes the class-side dictionaries of its own chain
/// first; on a miss, it falls back to instance-side lookup rooted at the
/// Class core class. This double dispatch is deliberate, not an error.
pub fn lookup_for_receiver(
    universe: &Universe,
    receiver: &Value,
    selector: Interned,
    super_scope: Option<&ObjRef<Class>>,
) -> Option<(Rc<Method>, ObjRef<Class>)> {
    match receiver {
        Value::Class(class) => lookup(class, selector, MethodSide::Class, super_scope)
            .or_else(|| lookup(&universe.core.class_class, selector, MethodSide::Instance, None)),
        _ => lookup(&receiver.class(universe), selector, MethodSide::Instance, super_scope),
    }
}

/// Resolve the does-not-understand handler for a receiver.
///
/// Every class must ultimately provide one, inherited from the root class;
/// its absence is a fatal configuration error of the class library.
pub fn resolve_dnu(universe: &Universe, receiver: &Value) -> Result<Rc<Method>, RuntimeError> {
    trace!("falling back to doesNotUnderstand:arguments: for {:?}", receiver);
    lookup_for_receiver(universe, receiver, universe.dnu_selector, None)
        .map(|(method, _)| method)
        .ok_or_else(|| RuntimeError::MissingDnuHandler {
            class: receiver.class(universe).borrow().name.clone(),
        })
}
