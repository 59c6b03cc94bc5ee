//! End-to-end session flow through the local machine: register, submit,
//! accumulate side-effect memory, close.

use graphvm_core::{
    bytecode::{Arg, Bytecode, Instruction, op},
    coefficient::LongCoefficient,
    machine::{LocalMachine, Machine},
    predicate::Predicate,
    value::Value,
};
use std::sync::Arc;

type Code = Bytecode<LongCoefficient>;
type Inst = Instruction<LongCoefficient>;

fn inject(values: &[i64]) -> Inst {
    Instruction::new(
        op::INJECT,
        values.iter().map(|i| Arg::Value(Value::Int(*i))).collect(),
    )
}

fn bind(name: &str, initial: Value) -> Inst {
    Instruction::new(
        op::BIND,
        vec![Arg::Value(Value::Text(name.into())), Arg::Value(initial)],
    )
}

fn aggregate(name: &str) -> Inst {
    Instruction::new(op::AGGREGATE, vec![Arg::Value(Value::Text(name.into()))])
}

fn is(predicate: Predicate) -> Inst {
    Instruction::new(op::IS, vec![Arg::Predicate(predicate)])
}

fn results(machine: &LocalMachine<LongCoefficient>, code: &Code) -> Vec<Value> {
    machine
        .submit(code)
        .expect("bytecode compiles")
        .map(|result| result.expect("traverser").into_value())
        .collect()
}

#[test]
fn standalone_submit_streams_filtered_results() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new()
        .with_step(inject(&[1, 2, 3, 4, 5]))
        .with_step(is(Predicate::between(2, 5)))
        .with_step(Instruction::new(op::INCR, vec![]));

    assert_eq!(
        results(&machine, &code),
        vec![Value::Int(3), Value::Int(4), Value::Int(5)]
    );
    // session-less submits never touch the session map
    assert_eq!(machine.session_count(), 0);
}

#[test]
fn submit_is_lazy_until_pulled() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new()
        .with_step(inject(&[1, 2]))
        .with_step(aggregate("seen"));

    let mut processor = machine.submit(&code).expect("bytecode compiles");
    assert!(processor.memory_snapshot().get("seen").is_none());

    processor.next().expect("first result").expect("traverser");
    assert_eq!(
        processor.memory_snapshot().get("seen"),
        Some(&Value::List(vec![Value::Int(1)]))
    );
}

#[test]
fn register_then_submit_accumulates_session_memory() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let handle = machine.register(Code::new());

    let mut code = handle.clone();
    code.add_instruction(inject(&[1, 2]));
    code.add_instruction(aggregate("x"));
    let count = machine.submit(&code).expect("compiles").count();
    assert_eq!(count, 2);

    let memory = machine.session_memory(&handle).expect("session is live");
    assert_eq!(
        memory.get("x"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );

    // a second submission extends the same memory
    let _ = machine.submit(&code).expect("compiles").count();
    let memory = machine.session_memory(&handle).expect("session is live");
    assert_eq!(
        memory.get("x"),
        Some(&Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Int(2)
        ]))
    );
}

#[test]
fn re_register_concatenates_source_instructions_in_order() {
    let machine = LocalMachine::<LongCoefficient>::new();

    let first = Code::new().with_source(bind("x", Value::Int(1)));
    let handle = machine.register(first.clone());

    let mut second = handle.clone();
    second.add_source_instruction(bind("y", Value::Int(2)));
    let handle = machine.register(second);

    let stored = machine
        .session_source_code(&handle)
        .expect("session is live");
    let expected: Vec<Inst> = vec![bind("x", Value::Int(1)), bind("y", Value::Int(2))];
    assert_eq!(stored.source_instructions(), expected.as_slice());
}

#[test]
fn first_bind_wins_across_registrations() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let handle = machine.register(Code::new().with_source(bind("x", Value::Int(1))));

    let mut again = handle.clone();
    again.add_source_instruction(bind("x", Value::Int(99)));
    let handle = machine.register(again);

    let mut code = handle.clone();
    code.add_instruction(inject(&[0]));
    let _ = machine.submit(&code).expect("compiles").count();

    let memory = machine.session_memory(&handle).expect("session is live");
    assert_eq!(memory.get("x"), Some(&Value::Int(1)));
}

#[test]
fn close_is_idempotent_and_scoped_to_one_session() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let first = machine.register(Code::new());
    let second = machine.register(Code::new());
    assert_eq!(machine.session_count(), 2);

    machine.close(&first);
    machine.close(&first); // already gone
    machine.close(&Code::new()); // no marker at all
    assert_eq!(machine.session_count(), 1);
    assert!(machine.session_memory(&second).is_some());

    machine.close(&second);
    assert_eq!(machine.session_count(), 0);
}

#[test]
fn submitting_a_closed_session_falls_back_to_standalone() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let handle = machine.register(Code::new());
    machine.close(&handle);

    let mut code = handle.clone();
    code.add_instruction(inject(&[7]));
    assert_eq!(results(&machine, &code), vec![Value::Int(7)]);
    assert_eq!(machine.session_count(), 0);
}

#[test]
fn abandoning_a_result_sequence_leaks_nothing() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let handle = machine.register(Code::new());

    let mut code = handle.clone();
    code.add_instruction(inject(&[1, 2, 3]));
    code.add_instruction(aggregate("x"));

    let mut processor = machine.submit(&code).expect("compiles");
    processor.next().expect("first result").expect("traverser");
    drop(processor);

    // the session is still addressable and closable
    let memory = machine.session_memory(&handle).expect("session is live");
    assert_eq!(memory.get("x"), Some(&Value::List(vec![Value::Int(1)])));
    machine.close(&handle);
    assert_eq!(machine.session_count(), 0);
}

#[test]
fn unknown_operations_fail_the_submit_before_any_result() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new().with_step(Instruction::new("teleport", vec![]));

    let err = machine.submit(&code).unwrap_err();
    assert!(err.is_compile_error());
}

#[test]
fn type_errors_surface_through_the_result_sequence() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new()
        .with_step(inject(&[1]))
        .with_step(is(Predicate::containing("x")));

    let mut processor = machine.submit(&code).expect("compiles");
    let err = processor.next().expect("one item").unwrap_err();
    assert!(err.is_type_error());
    assert!(processor.next().is_none(), "errors end the sequence");
}

#[test]
fn labeled_steps_record_the_path() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new()
        .with_step(inject(&[10]).with_labels(["start"]))
        .with_step(Instruction::new(op::INCR, vec![]).with_labels(["bumped"]))
        .with_step(Instruction::new(op::PATH, vec![]));

    assert_eq!(
        results(&machine, &code),
        vec![Value::List(vec![Value::Int(10), Value::Int(11)])]
    );
}

#[test]
fn coefficients_multiply_through_the_pipeline() {
    let machine = LocalMachine::<LongCoefficient>::new();
    let code = Code::new()
        .with_step(inject(&[5]).with_coefficient(LongCoefficient::new(2)))
        .with_step(Instruction::new(op::INCR, vec![]).with_coefficient(LongCoefficient::new(3)));

    let traverser = machine
        .submit(&code)
        .expect("compiles")
        .next()
        .expect("one result")
        .expect("traverser");

    assert_eq!(traverser.value(), &Value::Int(6));
    assert_eq!(traverser.bulk(), 6);
}

#[test]
fn concurrent_sessions_do_not_interfere() {
    let machine = LocalMachine::<LongCoefficient>::open();
    let mut workers = Vec::new();

    for worker in 0..8 {
        let machine = Arc::clone(&machine);
        workers.push(std::thread::spawn(move || {
            let handle = machine.register(Code::new());

            let mut code = handle.clone();
            code.add_instruction(inject(&[worker, worker + 1]));
            code.add_instruction(aggregate("mine"));
            let _ = machine.submit(&code).expect("compiles").count();

            let memory = machine.session_memory(&handle).expect("session is live");
            assert_eq!(
                memory.get("mine"),
                Some(&Value::List(vec![
                    Value::Int(worker),
                    Value::Int(worker + 1)
                ]))
            );

            machine.close(&handle);
        }));
    }

    for worker in workers {
        worker.join().expect("worker completes");
    }
    assert_eq!(machine.session_count(), 0);
}
