mod common;

use common::*;
use opal_core::ast::Expression;
use opal_runtime::compiler::UnwindPolicy;
use opal_runtime::error::RuntimeError;
use opal_runtime::invokable::Return;
use opal_runtime::universe::Universe;
use opal_runtime::value::Value;
use rstest::rstest;

/// Runner exercises the non-local-return machinery:
/// - `run:` invokes a block and would otherwise answer 0;
/// - `outer` passes `run:` a block that returns 42 from `outer` itself;
/// - `pick:` returns early out of an inlined `ifTrue:` inside a true block;
/// - `maker` leaks a block whose `^` outlives its home activation.
fn define_runner(universe: &mut Universe) -> Value {
    let class = universe
        .define_class(
            "Runner",
            None,
            vec![],
            vec![
                method(
                    "run:",
                    0,
                    vec![
                        msg(Expression::ArgRead(0, 1), "value", vec![]),
                        exit(int(0)),
                    ],
                ),
                method(
                    "outer",
                    0,
                    vec![
                        msg(self_read(), "run:", vec![block(0, 0, vec![exit(int(42))])]),
                        exit(int(-1)),
                    ],
                ),
                method(
                    "pick:",
                    0,
                    vec![
                        msg(
                            block(
                                0,
                                0,
                                vec![msg(
                                    msg(Expression::ArgRead(1, 1), ">", vec![int(10)]),
                                    "ifTrue:",
                                    vec![block(0, 0, vec![exit(sym("big"))])],
                                )],
                            ),
                            "value",
                            vec![],
                        ),
                        exit(sym("small")),
                    ],
                ),
                method("maker", 0, vec![exit(block(0, 0, vec![exit(int(7))]))]),
            ],
            vec![],
        )
        .unwrap();
    unwrap_local(universe.send(Value::Class(class), "new", vec![]))
}

#[rstest]
#[case::lightweight(UnwindPolicy::Lightweight)]
#[case::signal(UnwindPolicy::Signal)]
fn a_block_return_exits_its_home_method(#[case] policy: UnwindPolicy) {
    let mut universe = Universe::new(policy);
    let runner = define_runner(&mut universe);
    assert_eq!(unwrap_local(universe.send(runner, "outer", vec![])), Value::Integer(42));
}

#[rstest]
#[case::lightweight(UnwindPolicy::Lightweight)]
#[case::signal(UnwindPolicy::Signal)]
fn the_skipped_activation_does_not_answer(#[case] policy: UnwindPolicy) {
    // `run:` answers 0 when the block returns normally; with a `^` block
    // its own `^ 0` must never be reached.
    let mut universe = Universe::new(policy);
    let runner = define_runner(&mut universe);

    let normal_block = {
        let plain = universe
            .define_class(
                "Plain",
                None,
                vec![],
                vec![method("gimme", 0, vec![exit(block(0, 0, vec![int(5)]))])],
                vec![],
            )
            .unwrap();
        let instance = unwrap_local(universe.send(Value::Class(plain), "new", vec![]));
        unwrap_local(universe.send(instance, "gimme", vec![]))
    };
    assert_eq!(
        unwrap_local(universe.send(runner, "run:", vec![normal_block])),
        Value::Integer(0)
    );
}

#[rstest]
#[case::lightweight(UnwindPolicy::Lightweight)]
#[case::signal(UnwindPolicy::Signal)]
fn an_early_return_from_an_inlined_branch(#[case] policy: UnwindPolicy) {
    let mut universe = Universe::new(policy);
    let runner = define_runner(&mut universe);

    let answer = unwrap_local(universe.send(runner.clone(), "pick:", vec![Value::Integer(20)]));
    let expected = Value::Symbol(universe.intern_symbol("big"));
    assert_eq!(answer, expected);

    let answer = unwrap_local(universe.send(runner, "pick:", vec![Value::Integer(5)]));
    let expected = Value::Symbol(universe.intern_symbol("small"));
    assert_eq!(answer, expected);
}

#[rstest]
#[case::lightweight(UnwindPolicy::Lightweight)]
#[case::signal(UnwindPolicy::Signal)]
fn a_return_from_a_dead_home_is_an_error(#[case] policy: UnwindPolicy) {
    let mut universe = Universe::new(policy);
    let runner = define_runner(&mut universe);

    let escaped = unwrap_local(universe.send(runner, "maker", vec![]));
    match universe.send(escaped, "value", vec![]) {
        Return::Exception(RuntimeError::EscapedBlockReturn { selector }) => assert_eq!(selector, "maker"),
        other => panic!("expected an escaped-block error, got {other:?}"),
    }
}

#[test]
fn home_contexts_are_only_materialized_when_compiled_in() {
    use opal_runtime::compiler::compile_method;
    use opal_runtime::vm_objects::frame::Frame;

    let mut universe = Universe::new(UnwindPolicy::Lightweight);
    let selector = universe.intern_symbol("run");
    let holder = universe.core.object_class.clone();

    let plain = compile_method(
        &mut universe,
        "Thing",
        UnwindPolicy::Lightweight,
        &method("run", 0, vec![exit(int(1))]),
    );
    assert!(!plain.needs_home);
    let frame = Frame::for_method(holder.clone(), selector, vec![Value::Nil], 0, plain.needs_home);
    assert!(frame.home.is_none());

    let escaping = compile_method(
        &mut universe,
        "Thing",
        UnwindPolicy::Lightweight,
        &method("run", 0, vec![block(0, 0, vec![exit(int(1))])]),
    );
    assert!(escaping.needs_home);
    let frame = Frame::for_method(holder, selector, vec![Value::Nil], 0, escaping.needs_home);
    assert!(frame.home.is_some());
}
