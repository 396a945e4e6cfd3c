mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use opal_core::ast::Expression;
use opal_runtime::compiler::UnwindPolicy;
use opal_runtime::error::RuntimeError;
use opal_runtime::invokable::Return;
use opal_runtime::universe::Universe;
use opal_runtime::value::Value;
use opal_runtime::vm_objects::class::Class;
use opal_runtime::vm_objects::instance::Instance;
use opal_runtime::vm_objects::method::MethodSide;
use rstest::{fixture, rstest};

#[fixture]
fn universe() -> Universe {
    Universe::new(UnwindPolicy::Lightweight)
}

/// Counter with an `increment` that bumps a field; DoubleCounter overrides
/// it with two super sends.
fn define_counters(universe: &mut Universe) -> (Value, Value) {
    let counter = universe
        .define_class(
            "Counter",
            None,
            vec!["count".to_string()],
            vec![
                method("init", 0, vec![Expression::FieldWrite(0, Box::new(int(0)))]),
                method(
                    "increment",
                    0,
                    vec![Expression::FieldWrite(
                        0,
                        Box::new(msg(Expression::FieldRead(0), "+", vec![int(1)])),
                    )],
                ),
                method("count", 0, vec![exit(Expression::FieldRead(0))]),
            ],
            vec![],
        )
        .unwrap();

    let double_counter = universe
        .define_class(
            "DoubleCounter",
            Some(&counter),
            vec![],
            vec![method(
                "increment",
                0,
                vec![
                    msg(global("super"), "increment", vec![]),
                    msg(global("super"), "increment", vec![]),
                ],
            )],
            vec![],
        )
        .unwrap();

    (Value::Class(counter), Value::Class(double_counter))
}

fn new_initialized(universe: &mut Universe, class: Value) -> Value {
    let instance = unwrap_local(universe.send(class, "new", vec![]));
    unwrap_local(universe.send(instance.clone(), "init", vec![]));
    instance
}

#[rstest]
fn subclass_override_with_super_sends(mut universe: Universe) {
    let (counter, double_counter) = define_counters(&mut universe);

    let plain = new_initialized(&mut universe, counter);
    unwrap_local(universe.send(plain.clone(), "increment", vec![]));
    assert_eq!(unwrap_local(universe.send(plain, "count", vec![])), Value::Integer(1));

    let double = new_initialized(&mut universe, double_counter);
    unwrap_local(universe.send(double.clone(), "increment", vec![]));
    assert_eq!(unwrap_local(universe.send(double, "count", vec![])), Value::Integer(2));
}

#[rstest]
fn super_lookup_always_excludes_the_scope_class(mut universe: Universe) {
    let a = universe
        .define_class("A", None, vec![], vec![method("name", 0, vec![exit(sym("A"))])], vec![])
        .unwrap();
    let b = universe
        .define_class("B", Some(&a), vec![], vec![method("name", 0, vec![exit(sym("B"))])], vec![])
        .unwrap();
    // C overrides `name` too; its `probe` must still get B's through super.
    let c = universe
        .define_class(
            "C",
            Some(&b),
            vec![],
            vec![
                method("name", 0, vec![exit(sym("C"))]),
                method("probe", 0, vec![exit(msg(global("super"), "name", vec![]))]),
            ],
            vec![],
        )
        .unwrap();

    let instance = unwrap_local(universe.send(Value::Class(c), "new", vec![]));
    let expected = Value::Symbol(universe.intern_symbol("B"));
    assert_eq!(unwrap_local(universe.send(instance, "probe", vec![])), expected);
}

#[rstest]
fn dnu_override_captures_selector_and_arguments(mut universe: Universe) {
    // Widget answers the missed selector; Gadget answers the packaged
    // argument array.
    let widget = universe
        .define_class(
            "Widget",
            None,
            vec![],
            vec![method(
                "doesNotUnderstand:arguments:",
                0,
                vec![exit(Expression::ArgRead(0, 1))],
            )],
            vec![],
        )
        .unwrap();
    let gadget = universe
        .define_class(
            "Gadget",
            None,
            vec![],
            vec![method(
                "doesNotUnderstand:arguments:",
                0,
                vec![exit(Expression::ArgRead(0, 2))],
            )],
            vec![],
        )
        .unwrap();

    let instance = unwrap_local(universe.send(Value::Class(widget), "new", vec![]));
    let answer = unwrap_local(universe.send(instance, "frobnicate:", vec![Value::Integer(7)]));
    let expected = Value::Symbol(universe.intern_symbol("frobnicate:"));
    assert_eq!(answer, expected);

    let instance = unwrap_local(universe.send(Value::Class(gadget), "new", vec![]));
    let answer = unwrap_local(universe.send(instance, "frobnicate:", vec![Value::Integer(7)]));
    let args = answer.as_array().expect("expected the packaged arguments").borrow();
    assert_eq!(*args, vec![Value::Integer(7)]);
}

#[rstest]
fn unhandled_send_reaches_the_root_handler(mut universe: Universe) {
    let thing = universe.define_class("Thing", None, vec![], vec![], vec![]).unwrap();
    let instance = unwrap_local(universe.send(Value::Class(thing), "new", vec![]));
    match universe.send(instance, "blorp", vec![]) {
        Return::Exception(RuntimeError::MessageNotUnderstood { class, selector }) => {
            assert_eq!(class, "Thing");
            assert_eq!(selector, "blorp");
        }
        other => panic!("expected a message-not-understood error, got {other:?}"),
    }
}

#[rstest]
fn class_without_any_dnu_handler_is_a_fatal_error(mut universe: Universe) {
    // A rootless class: nothing in its (empty) chain provides the handler.
    let orphan = Rc::new(RefCell::new(Class::new("Orphan", None, vec![])));
    orphan.borrow_mut().freeze();
    let instance = Value::Instance(Rc::new(RefCell::new(Instance::from_class(orphan))));
    match universe.send(instance, "blorp", vec![]) {
        Return::Exception(RuntimeError::MissingDnuHandler { class }) => assert_eq!(class, "Orphan"),
        other => panic!("expected a missing-handler error, got {other:?}"),
    }
}

#[rstest]
fn frozen_class_rejects_method_installation(mut universe: Universe) {
    let thing = universe.define_class("Thing", None, vec![], vec![], vec![]).unwrap();
    let err = universe
        .install_method(&thing, MethodSide::Instance, &method("late", 0, vec![exit(int(1))]))
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::FrozenClass {
            class: "Thing".to_string(),
            selector: "late".to_string(),
        }
    );
}

#[rstest]
fn class_receivers_probe_the_class_side_first(mut universe: Universe) {
    let thing = universe
        .define_class(
            "Thing",
            None,
            vec![],
            vec![],
            vec![method("default", 0, vec![exit(int(42))])],
        )
        .unwrap();

    // The class-side method wins; `new` still resolves through the
    // instance-side fallback of the Class core class.
    assert_eq!(
        unwrap_local(universe.send(Value::Class(thing.clone()), "default", vec![])),
        Value::Integer(42)
    );
    let instance = unwrap_local(universe.send(Value::Class(thing.clone()), "new", vec![]));
    assert_eq!(
        unwrap_local(universe.send(instance, "class", vec![])),
        Value::Class(thing)
    );
}
