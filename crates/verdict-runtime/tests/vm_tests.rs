//! VM-level invariants: framed execution, resolution order, entity
//! shadowing, and host-provided operators

use std::rc::Rc;

use verdict_runtime::{
    compile, execute_framed, execute_source, EntityDefinition, FieldSpec, FunctionsEntity, Kind,
    RuntimeError, State, Value,
};

fn writable(kind: Kind) -> FieldSpec {
    FieldSpec::new(kind).writable()
}

#[test]
fn test_framed_execution_restores_all_depths() {
    let fragments = [
        "1 2 +",
        "[ 1 2 ] length",
        "{ 1 } true if",
        "0 { dup 2 < } { 1 + } while",
    ];
    for src in fragments {
        let mut state = State::new();
        state.push(Value::int(42));
        let compiled = compile(src).expect("compile");
        execute_framed(&mut state, &[compiled]).expect("framed");
        assert_eq!(state.data_depth(), 1, "data depth after {:?}", src);
        assert_eq!(state.control_depth(), 0, "control depth after {:?}", src);
        assert_eq!(state.entity_depth(), 0, "entity depth after {:?}", src);
    }
}

#[test]
fn test_entity_field_shadows_operator() {
    let def = EntityDefinition::new().with_field("add", writable(Kind::Null));
    let e = def.instantiate("shadow");
    e.set("add", Value::int(99)).expect("set");

    let mut state = State::new();
    state.push_entity(e);
    execute_source(&mut state, "add").expect("execute");
    // The field's value is loaded and executed (pushed), not the operator
    assert_eq!(state.data(), &[Value::int(99)]);
}

#[test]
fn test_name_resolution_sees_pushed_entities_in_order() {
    let def = EntityDefinition::new().with_field("x", writable(Kind::Null));
    let bottom = def.instantiate("bottom");
    let top = def.instantiate("top");
    bottom.set("x", Value::int(1)).expect("set");
    top.set("x", Value::int(2)).expect("set");

    let mut state = State::new();
    state.push_entity(bottom.clone());
    state.push_entity(top);
    assert_eq!(eval_on(&mut state, "x"), Value::int(2));

    state.pop_entity().expect("pop");
    assert_eq!(eval_on(&mut state, "x"), Value::int(1));
}

#[test]
fn test_xdef_stores_through_resolution() {
    let def = EntityDefinition::new().with_field("out", writable(Kind::Null));
    let e = def.instantiate("result");

    let mut state = State::new();
    state.push_entity(e.clone());
    execute_source(&mut state, "42 /out xdef").expect("execute");
    assert_eq!(e.get("out").expect("get"), Value::int(42));

    // Name-first order works too
    execute_source(&mut state, "/out 43 xdef").expect("execute");
    assert_eq!(e.get("out").expect("get"), Value::int(43));
}

#[test]
fn test_xdef_on_operator_name_is_read_only() {
    let mut state = State::new();
    let err = execute_source(&mut state, "1 /add xdef").expect_err("read-only");
    assert!(matches!(err, RuntimeError::ReadOnly));
}

#[test]
fn test_entity_push_and_pop_operators() {
    let def = EntityDefinition::new().with_field("flag", writable(Kind::Null));
    let e = def.instantiate("ctx");
    e.set("flag", Value::Bool(true)).expect("set");

    let holder = FunctionsEntity::new("holder");
    holder.define_value("ctxentity", Value::entity(e));

    let mut state = State::new();
    state.push_entity(Rc::new(holder));
    execute_source(&mut state, "ctxentity entityPush flag entityPop").expect("execute");
    assert_eq!(state.data(), &[Value::Bool(true)]);
    assert_eq!(state.entity_depth(), 1);
}

#[test]
fn test_host_operator_extends_catalog() {
    let ops = FunctionsEntity::new("operators");
    ops.define("double", |s| {
        let v = s.pop()?.as_int()?;
        s.push(Value::int(v * 2));
        Ok(())
    });

    let mut state = State::new();
    state.push_entity(Rc::new(ops));
    execute_source(&mut state, "21 double").expect("execute");
    assert_eq!(state.data(), &[Value::int(42)]);
}

#[test]
fn test_cannot_resolve_unknown_name() {
    let mut state = State::new();
    let err = execute_source(&mut state, "no_such_name").expect_err("unresolved");
    assert!(matches!(err, RuntimeError::CannotResolve { .. }));
    assert!(err.to_string().contains("no_such_name"));
}

#[test]
fn test_compound_name_execution() {
    let def = EntityDefinition::new().with_field("name", writable(Kind::Null));
    let user = def.instantiate("user");
    let admin = def.instantiate("admin");
    user.set("name", Value::string("A")).expect("set");
    admin.set("name", Value::string("B")).expect("set");

    let mut state = State::new();
    state.push_entity(user);
    state.push_entity(admin);

    execute_source(&mut state, "admin.name cvs user.name cvs").expect("execute");
    assert_eq!(
        state.data(),
        &[Value::string("B"), Value::string("A")]
    );
}

#[test]
fn test_for_all_pushes_entities() {
    let person = EntityDefinition::new().with_field("age", writable(Kind::Number));
    let total_def = EntityDefinition::new().with_field("total", writable(Kind::Number));

    let people: Vec<Value> = [11, 22, 33]
        .iter()
        .map(|age| {
            let p = person.instantiate("person");
            p.set("age", Value::int(*age)).expect("set");
            Value::entity(p)
        })
        .collect();

    let result = total_def.instantiate("result");
    result.set("total", Value::int(0)).expect("set");

    let holder = FunctionsEntity::new("data");
    holder.define_value("users", Value::array(people));

    let mut state = State::new();
    state.push_entity(result.clone());
    state.push_entity(Rc::new(holder));

    execute_source(&mut state, "users { total age + /total xdef } forAll").expect("execute");
    assert_eq!(result.get("total").expect("get"), Value::int(66));
}

#[test]
fn test_for_all_skips_null_elements() {
    let person = EntityDefinition::new().with_field("age", writable(Kind::Number));
    let p = person.instantiate("person");
    p.set("age", Value::int(5)).expect("set");

    let holder = FunctionsEntity::new("data");
    holder.define_value("users", Value::array(vec![Value::Null, Value::entity(p)]));

    let mut state = State::new();
    state.push_entity(Rc::new(holder));
    execute_source(&mut state, "users { age } forAll").expect("execute");
    assert_eq!(state.data(), &[Value::int(5)]);
}

#[test]
fn test_for_all_requires_entities() {
    let holder = FunctionsEntity::new("data");
    holder.define_value("xs", Value::array(vec![Value::int(1)]));

    let mut state = State::new();
    state.push_entity(Rc::new(holder));
    let err = execute_source(&mut state, "xs { pop } forAll").expect_err("not entity");
    assert!(matches!(err, RuntimeError::NotKind { kind: "an entity" }));
}

fn eval_on(state: &mut State, src: &str) -> Value {
    execute_source(state, src).expect("execute");
    state.pop().expect("pop")
}
