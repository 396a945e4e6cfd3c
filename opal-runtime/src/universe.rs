use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::{BinderCacheTable, COMMON_SELECTORS};
use crate::compiler::{self, UnwindPolicy};
use crate::error::RuntimeError;
use crate::invokable::{Invoke, Return};
use crate::lookup;
use crate::primitives;
use crate::receiver::ReceiverKind;
use crate::value::Value;
use crate::vm_objects::class::Class;
use crate::vm_objects::frame::Frame;
use crate::vm_objects::method::{Method, MethodKind, MethodSide};
use crate::vm_objects::pool::Pool;
use crate::ObjRef;
use log::debug;
use opal_core::ast::MethodDef;
use opal_core::interner::{Interned, Interner};

static UNIVERSE_IDS: AtomicU64 = AtomicU64::new(1);

/// The core classes of a universe, built and frozen at bootstrap.
#[derive(Debug)]
pub struct CoreClasses {
    /// The **Object** class, root of the hierarchy.
    pub object_class: ObjRef<Class>,
    /// The **Class** class: the instance-side fallback for class receivers.
    pub class_class: ObjRef<Class>,
    /// The **Metaclass** class.
    pub metaclass_class: ObjRef<Class>,
    /// The **Nil** class.
    pub nil_class: ObjRef<Class>,
    /// The **Boolean** class.
    pub boolean_class: ObjRef<Class>,
    /// The **Integer** class.
    pub integer_class: ObjRef<Class>,
    /// The **Double** class.
    pub double_class: ObjRef<Class>,
    /// The **String** class.
    pub string_class: ObjRef<Class>,
    /// The **Symbol** class.
    pub symbol_class: ObjRef<Class>,
    /// The **Array** class.
    pub array_class: ObjRef<Class>,
    /// The **Block** class.
    pub block_class: ObjRef<Class>,
    /// The **Pool** class.
    pub pool_class: ObjRef<Class>,
}

impl CoreClasses {
    fn bootstrap(interner: &mut Interner) -> Self {
        fn subclass(name: &str, super_class: &ObjRef<Class>) -> ObjRef<Class> {
            Rc::new(RefCell::new(Class::new(name, Some(super_class.clone()), vec![])))
        }

        let object_class = Rc::new(RefCell::new(Class::new("Object", None, vec![])));
        let class_class = subclass("Class", &object_class);
        let metaclass_class = subclass("Metaclass", &class_class);
        let core = Self {
            nil_class: subclass("Nil", &object_class),
            boolean_class: subclass("Boolean", &object_class),
            integer_class: subclass("Integer", &object_class),
            double_class: subclass("Double", &object_class),
            string_class: subclass("String", &object_class),
            symbol_class: subclass("Symbol", &object_class),
            array_class: subclass("Array", &object_class),
            block_class: subclass("Block", &object_class),
            pool_class: subclass("Pool", &object_class),
            object_class,
            class_class,
            metaclass_class,
        };

        for class in core.iter() {
            let name = class.borrow().name.clone();
            if let Some(table) = primitives::get_instance_primitives(&name) {
                install_table(interner, class, MethodSide::Instance, table);
            }
            if let Some(table) = primitives::get_class_primitives(&name) {
                install_table(interner, class, MethodSide::Class, table);
            }
            class.borrow_mut().freeze();
        }
        core
    }

    /// Iterate over every core class.
    pub fn iter(&self) -> impl Iterator<Item = &ObjRef<Class>> {
        [
            &self.object_class,
            &self.class_class,
            &self.metaclass_class,
            &self.nil_class,
            &self.boolean_class,
            &self.integer_class,
            &self.double_class,
            &self.string_class,
            &self.symbol_class,
            &self.array_class,
            &self.block_class,
            &self.pool_class,
        ]
        .into_iter()
    }
}

fn install_table(interner: &mut Interner, class: &ObjRef<Class>, side: MethodSide, table: primitives::PrimitiveTable) {
    for (selector, func) in table {
        let method = Rc::new(Method {
            kind: MethodKind::Primitive(*func),
            holder: Rc::downgrade(class),
            side,
            signature: (*selector).to_string(),
        });
        let selector = interner.intern(selector);
        class
            .borrow_mut()
            .define_method(side, selector, method)
            .expect("core classes are unfrozen during bootstrap");
    }
}

/// One runtime instance: interner, globals, core classes, activation
/// stack, binder cache table and unwind policy. Guards record the
/// universe's identity so cached dispatch paths never leak across
/// instances.
#[derive(Debug)]
pub struct Universe {
    /// The identity of this runtime instance, unique across the process.
    pub id: u64,
    /// The string interner for this universe.
    pub interner: Interner,
    /// The global bindings, class objects included.
    pub globals: HashMap<Interned, Value>,
    /// The core classes.
    pub core: CoreClasses,
    /// The activation stack, innermost frame last.
    pub frames: Vec<ObjRef<Frame>>,
    /// The per-universe binder cache table.
    pub binders: BinderCacheTable,
    /// The non-local-return lowering this universe compiles with.
    pub policy: UnwindPolicy,
    /// The interned `doesNotUnderstand:arguments:` selector.
    pub dnu_selector: Interned,
}

impl Universe {
    /// Bootstrap a fresh universe under the given unwind policy.
    pub fn new(policy: UnwindPolicy) -> Self {
        let mut interner = Interner::with_capacity(128);
        let permanent_selectors = COMMON_SELECTORS.iter().map(|selector| interner.intern(selector)).collect();
        let core = CoreClasses::bootstrap(&mut interner);
        let dnu_selector = interner.intern("doesNotUnderstand:arguments:");

        let mut globals = HashMap::new();
        for class in core.iter() {
            let name = interner.intern(class.borrow().name());
            globals.insert(name, Value::Class(class.clone()));
        }

        let id = UNIVERSE_IDS.fetch_add(1, Ordering::Relaxed);
        debug!("bootstrapped universe {} ({:?} unwind policy)", id, policy);
        Self {
            id,
            interner,
            globals,
            core,
            frames: Vec::new(),
            binders: BinderCacheTable::new(permanent_selectors),
            policy,
            dnu_selector,
        }
    }

    /// Intern a symbol.
    pub fn intern_symbol(&mut self, name: &str) -> Interned {
        self.interner.intern(name)
    }

    /// Get the string a symbol stands for.
    pub fn lookup_symbol(&self, symbol: Interned) -> &str {
        self.interner.lookup(symbol)
    }

    /// Search for a global binding.
    pub fn lookup_global(&self, name: Interned) -> Option<Value> {
        self.globals.get(&name).cloned()
    }

    /// Assign a value to a global binding.
    pub fn assign_global(&mut self, name: Interned, value: Value) {
        self.globals.insert(name, value);
    }

    /// Search for a class bound as a global.
    pub fn lookup_class(&self, name: Interned) -> Option<ObjRef<Class>> {
        self.globals.get(&name).and_then(Value::as_class).cloned()
    }

    /// Execute a closure within a pushed frame, popping it on the way out.
    pub fn with_frame<T>(&mut self, frame: ObjRef<Frame>, func: impl FnOnce(&mut Self) -> T) -> T {
        self.frames.push(frame);
        let ret = func(self);
        self.frames.pop();
        ret
    }

    /// The innermost activation. Only valid while evaluating.
    pub fn current_frame(&self) -> ObjRef<Frame> {
        self.frames.last().cloned().expect("no current frame")
    }

    /// An uncached send: full resolution every time, following the same
    /// rules as a call-site binder but installing no dispatch state.
    pub fn send(&mut self, receiver: Value, selector: &str, args: Vec<Value>) -> Return {
        let interned = self.intern_symbol(selector);
        if !receiver.is_language_object() {
            if let Some(tag) = ReceiverKind::type_tag(&receiver) {
                if let Some(native) = primitives::host_member(tag, selector) {
                    let mut full = args;
                    full.insert(0, receiver);
                    return native(self, full);
                }
            }
        }
        match lookup::lookup_for_receiver(self, &receiver, interned, None) {
            Some((method, _)) => {
                let mut full = args;
                full.insert(0, receiver);
                method.invoke(self, full)
            }
            None => match lookup::resolve_dnu(self, &receiver) {
                Ok(handler) => {
                    let packaged = Value::Array(Rc::new(RefCell::new(args)));
                    handler.invoke(self, vec![receiver, Value::Symbol(interned), packaged])
                }
                Err(err) => Return::Exception(err),
            },
        }
    }

    /// Define a class: compile and install its methods, freeze it, and
    /// bind it as a global under its name.
    pub fn define_class(
        &mut self,
        name: &str,
        super_class: Option<&ObjRef<Class>>,
        field_names: Vec<String>,
        instance_methods: Vec<MethodDef>,
        class_methods: Vec<MethodDef>,
    ) -> Result<ObjRef<Class>, RuntimeError> {
        let super_class = super_class.unwrap_or(&self.core.object_class).clone();
        let class = Rc::new(RefCell::new(Class::new(name, Some(super_class), field_names)));
        for def in &instance_methods {
            self.install_method(&class, MethodSide::Instance, def)?;
        }
        for def in &class_methods {
            self.install_method(&class, MethodSide::Class, def)?;
        }
        class.borrow_mut().freeze();
        let global = self.intern_symbol(name);
        self.globals.insert(global, Value::Class(class.clone()));
        debug!("defined class {}", name);
        Ok(class)
    }

    /// Compile a method definition against a class and install it. Fails
    /// on a frozen class.
    pub fn install_method(&mut self, class: &ObjRef<Class>, side: MethodSide, def: &MethodDef) -> Result<(), RuntimeError> {
        let policy = self.policy;
        let holder_name = class.borrow().name.clone();
        let lowered = compiler::compile_method(self, &holder_name, policy, def);
        let selector = self.intern_symbol(&def.selector);
        let method = Rc::new(Method {
            kind: MethodKind::Lowered(lowered),
            holder: Rc::downgrade(class),
            side,
            signature: def.selector.clone(),
        });
        class.borrow_mut().define_method(side, selector, method)
    }

    /// Create an empty named pool and bind it as a global.
    pub fn define_pool(&mut self, name: &str) -> ObjRef<Pool> {
        let pool = Rc::new(RefCell::new(Pool::new(name)));
        let global = self.intern_symbol(name);
        self.globals.insert(global, Value::Pool(pool.clone()));
        pool
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new(UnwindPolicy::default())
    }
}
