use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::invokable::{Invoke, Return};
use crate::lookup;
use crate::primitives;
use crate::receiver::{ReceiverKind, TypeTag};
use crate::universe::Universe;
use crate::value::Value;
use crate::vm_objects::class::Class;
use crate::vm_objects::method::{Method, PrimitiveFn};
use log::trace;
use opal_core::interner::Interned;

/// What the compiler emits for every message send, and what the backend
/// wires to a binder-backed dispatch path.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSiteDescriptor {
    pub selector: String,
    /// An optional host-side member name to probe instead of the selector
    /// when offering the send to a primitive-mapped receiver.
    pub native_hint: Option<String>,
    pub nargs: u8,
    pub kind: SendKindDesc,
}

/// The send kind of a call-site descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum SendKindDesc {
    Normal,
    /// The receiver of this exact call site never changes across
    /// invocations (a literal receiver).
    Constant,
    /// Lookup starts above the named class, not at the receiver's class.
    Super { scope: String },
    /// Answers the receiver's class object; no method body to resolve.
    ClassGet,
}

/// The identity of a binder: selector, send kind and argument shape.
/// One binder exists per distinct key, shared across every call site with
/// the identical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendKind {
    Normal { nargs: u8 },
    Constant { nargs: u8 },
    Super { scope: Interned },
    ClassGet,
}

/// A call-site binder.
///
/// The binder itself is stateless per invocation and holds no
/// receiver-specific state; the caller (the call site) stores the last
/// `(guard, target)` pair and re-invokes `bind` only when the guard fails.
#[derive(Debug)]
pub struct CallSiteBinder {
    pub selector: Interned,
    pub selector_str: String,
    pub native_hint: Option<String>,
    pub kind: SendKind,
    /// The super-scope class name. The token inside `kind` belongs to the
    /// universe this binder was minted in; rebinding under another
    /// universe resolves the scope through this name instead.
    pub super_scope_name: Option<String>,
}

impl CallSiteBinder {
    pub fn new(selector: Interned, selector_str: impl Into<String>, native_hint: Option<String>, kind: SendKind) -> Self {
        Self {
            selector,
            selector_str: selector_str.into(),
            native_hint,
            kind,
            super_scope_name: None,
        }
    }

    /// The argument count this binder was built for.
    pub fn expected_args(&self) -> usize {
        match &self.kind {
            SendKind::Normal { nargs } | SendKind::Constant { nargs } => *nargs as usize,
            SendKind::Super { .. } => selector_arity(&self.selector_str),
            SendKind::ClassGet => 0,
        }
    }

    /// The host member name to probe on primitive-mapped receivers.
    fn native_name(&self) -> &str {
        self.native_hint.as_deref().unwrap_or(self.selector_str.as_str())
    }

    /// Resolve this send for a concrete receiver, producing a guarded
    /// dispatch path.
    pub fn bind(&self, universe: &mut Universe, receiver: &Value, nargs_given: usize) -> Result<Binding, RuntimeError> {
        if nargs_given != self.expected_args() {
            // A call site invoked with the wrong shape is a construction
            // bug in the surrounding compiler, never a program condition.
            return Err(RuntimeError::BindingContract {
                selector: self.selector_str.clone(),
                expected: self.expected_args(),
                got: nargs_given,
            });
        }

        // Interned tokens are per-universe: the same token names different
        // selectors under different interners. Resolution goes by name so
        // a binder rebound under a foreign universe stays sound.
        let selector = universe.intern_symbol(&self.selector_str);

        match &self.kind {
            SendKind::ClassGet => Ok(Binding {
                guard: Guard::for_receiver(universe, receiver),
                target: DispatchTarget::ClassOf,
            }),
            SendKind::Constant { .. } => {
                let target = self.resolve_normal(universe, selector, receiver)?;
                Ok(Binding {
                    guard: Guard::universe_only(universe),
                    target,
                })
            }
            SendKind::Super { scope } => {
                let scope = match &self.super_scope_name {
                    Some(name) => universe.intern_symbol(name),
                    None => *scope,
                };
                let scope_class = universe
                    .lookup_class(scope)
                    .ok_or_else(|| RuntimeError::msg(format!("unknown super scope class for #{}", self.selector_str)))?;
                let target = match lookup::lookup_for_receiver(universe, receiver, selector, Some(&scope_class)) {
                    Some((method, _)) => DispatchTarget::Method(method),
                    None => self.dnu_target(universe, selector, receiver)?,
                };
                Ok(Binding {
                    guard: Guard::for_receiver(universe, receiver),
                    target,
                })
            }
            SendKind::Normal { .. } => {
                let target = self.resolve_normal(universe, selector, receiver)?;
                Ok(Binding {
                    guard: Guard::for_receiver(universe, receiver),
                    target,
                })
            }
        }
    }

    /// Normal-send resolution order: a primitive-mapped receiver is first
    /// offered the member natively; language lookup is the fallback. Super
    /// sends never come through here.
    fn resolve_normal(&self, universe: &Universe, selector: Interned, receiver: &Value) -> Result<DispatchTarget, RuntimeError> {
        if !receiver.is_language_object() {
            if let Some(tag) = ReceiverKind::type_tag(receiver) {
                if let Some(native) = primitives::host_member(tag, self.native_name()) {
                    return Ok(DispatchTarget::Native(native));
                }
            }
        }
        match lookup::lookup_for_receiver(universe, receiver, selector, None) {
            Some((method, _)) => Ok(DispatchTarget::Method(method)),
            None => self.dnu_target(universe, selector, receiver),
        }
    }

    fn dnu_target(&self, universe: &Universe, selector: Interned, receiver: &Value) -> Result<DispatchTarget, RuntimeError> {
        let handler = lookup::resolve_dnu(universe, receiver)?;
        Ok(DispatchTarget::DoesNotUnderstand { handler, selector })
    }
}

/// The restriction under which a cached dispatch path remains valid:
/// owning-runtime identity, conjoined with a cheap receiver check.
#[derive(Debug, Clone)]
pub struct Guard {
    universe_id: u64,
    check: GuardCheck,
}

/// The receiver half of a guard. All checks are O(1) identity or type
/// comparisons; guards never run general predicates.
#[derive(Debug, Clone)]
enum GuardCheck {
    /// Runtime-instance identity alone (constant-receiver sends).
    UniverseOnly,
    /// The receiver's concrete class is this exact class object.
    ClassIdentity(*const RefCell<Class>),
    /// The receiver is this exact class object.
    ClassReceiver(*const RefCell<Class>),
    /// The receiver is of this host type.
    TypeTag(TypeTag),
    /// The receiver is this exact boolean value.
    BoolValue(bool),
}

impl Guard {
    /// A guard on runtime identity alone.
    pub fn universe_only(universe: &Universe) -> Self {
        Self {
            universe_id: universe.id,
            check: GuardCheck::UniverseOnly,
        }
    }

    /// The guard for one concrete receiver, per its shape's rule.
    pub fn for_receiver(universe: &Universe, receiver: &Value) -> Self {
        let check = match receiver {
            Value::Boolean(value) => GuardCheck::BoolValue(*value),
            Value::Class(class) => GuardCheck::ClassReceiver(Rc::as_ptr(class)),
            _ => match ReceiverKind::type_tag(receiver) {
                Some(tag) => GuardCheck::TypeTag(tag),
                None => GuardCheck::ClassIdentity(Rc::as_ptr(&receiver.class(universe))),
            },
        };
        Self {
            universe_id: universe.id,
            check,
        }
    }

    /// Whether the cached dispatch path may be reused for this receiver.
    pub fn holds(&self, universe: &Universe, receiver: &Value) -> bool {
        if self.universe_id != universe.id {
            // A binder reused across runtime instances surfaces as a
            // harmless cache miss, never as an error.
            return false;
        }
        match &self.check {
            GuardCheck::UniverseOnly => true,
            GuardCheck::ClassIdentity(ptr) => std::ptr::eq(Rc::as_ptr(&receiver.class(universe)), *ptr),
            GuardCheck::ClassReceiver(ptr) => receiver.as_class().is_some_and(|class| std::ptr::eq(Rc::as_ptr(class), *ptr)),
            GuardCheck::TypeTag(tag) => ReceiverKind::type_tag(receiver) == Some(*tag),
            GuardCheck::BoolValue(value) => matches!(receiver, Value::Boolean(b) if b == value),
        }
    }
}

/// The dispatch path one `bind` produced.
#[derive(Debug, Clone)]
pub enum DispatchTarget {
    /// Call the resolved method.
    Method(Rc<Method>),
    /// Call a native host member.
    Native(PrimitiveFn),
    /// No method was found: package the selector and arguments and call
    /// the does-not-understand handler. Ordinary control flow, not an
    /// error.
    DoesNotUnderstand { handler: Rc<Method>, selector: Interned },
    /// Answer the receiver's class object.
    ClassOf,
}

impl DispatchTarget {
    pub fn invoke(&self, universe: &mut Universe, receiver: Value, mut args: Vec<Value>) -> Return {
        match self {
            Self::Method(method) => {
                args.insert(0, receiver);
                method.invoke(universe, args)
            }
            Self::Native(native) => {
                args.insert(0, receiver);
                native(universe, args)
            }
            Self::DoesNotUnderstand { handler, selector } => {
                let packaged = Value::Array(Rc::new(RefCell::new(args)));
                handler.invoke(universe, vec![receiver, Value::Symbol(*selector), packaged])
            }
            Self::ClassOf => Return::Local(Value::Class(receiver.class(universe))),
        }
    }
}

/// A guarded dispatch path, the result of one `bind`.
#[derive(Debug, Clone)]
pub struct Binding {
    pub guard: Guard,
    pub target: DispatchTarget,
}

/// One compiled call site: a shared binder plus the last binding it
/// produced. Rebinds only when the guard fails.
#[derive(Debug)]
pub struct CallSite {
    pub binder: Arc<CallSiteBinder>,
    cache: RefCell<Option<Binding>>,
}

impl CallSite {
    pub fn new(binder: Arc<CallSiteBinder>) -> Self {
        Self {
            binder,
            cache: RefCell::new(None),
        }
    }

    /// Build a call site from a compiler-emitted descriptor, sharing the
    /// binder through the universe's cache table.
    pub fn from_descriptor(universe: &mut Universe, desc: &CallSiteDescriptor) -> Self {
        let selector = universe.intern_symbol(&desc.selector);
        let kind = match &desc.kind {
            SendKindDesc::Normal => SendKind::Normal { nargs: desc.nargs },
            SendKindDesc::Constant => SendKind::Constant { nargs: desc.nargs },
            SendKindDesc::Super { scope } => SendKind::Super {
                scope: universe.intern_symbol(scope),
            },
            SendKindDesc::ClassGet => SendKind::ClassGet,
        };
        let binder = universe.binders.resolve_with(selector, kind, || {
            let mut binder = CallSiteBinder::new(selector, desc.selector.clone(), desc.native_hint.clone(), kind);
            if let SendKindDesc::Super { scope } = &desc.kind {
                binder.super_scope_name = Some(scope.clone());
            }
            Arc::new(binder)
        });
        Self::new(binder)
    }

    /// Whether a valid cached binding is installed (for tests and
    /// diagnostics).
    pub fn is_bound(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Dispatch through the cached binding, rebinding on guard failure.
    pub fn dispatch(&self, universe: &mut Universe, receiver: Value, args: Vec<Value>) -> Return {
        let cached = {
            let cache = self.cache.borrow();
            cache.as_ref().filter(|binding| binding.guard.holds(universe, &receiver)).cloned()
        };
        let binding = match cached {
            Some(binding) => binding,
            None => {
                trace!("(re)binding call site #{}", self.binder.selector_str);
                match self.binder.bind(universe, &receiver, args.len()) {
                    Ok(binding) => {
                        *self.cache.borrow_mut() = Some(binding.clone());
                        binding
                    }
                    Err(err) => return Return::Exception(err),
                }
            }
        };
        binding.target.invoke(universe, receiver, args)
    }
}

impl Clone for CallSite {
    fn clone(&self) -> Self {
        Self {
            binder: self.binder.clone(),
            cache: RefCell::new(self.cache.borrow().clone()),
        }
    }
}

// Call sites compare by binder identity; the installed binding is
// transient state.
impl PartialEq for CallSite {
    fn eq(&self, other: &Self) -> bool {
        self.binder.selector == other.binder.selector && self.binder.kind == other.binder.kind
    }
}

/// The argument count a selector implies: its `:` count for keyword
/// selectors, 1 for binary operator selectors, 0 otherwise.
pub fn selector_arity(selector: &str) -> usize {
    let colons = selector.chars().filter(|c| *c == ':').count();
    if colons != 0 {
        colons
    } else if selector.chars().all(|c| !c.is_alphanumeric()) {
        1
    } else {
        0
    }
}
