//! The execution loop
//!
//! Values execute in order. Before the normal dispatch, the top of the
//! control stack gets a chance to intercept the value; this is how the
//! `{ … }` capture collects values at run time. Executable arrays execute
//! element-by-element, except that an executable array nested inside
//! another pushes itself instead of flattening.

use tracing::debug_span;

use crate::compiler::compile;
use crate::state::{resolve, ControlItem, State};
use crate::value::{RuntimeError, Value};

/// Execute each value in order
pub fn execute(state: &mut State, values: &[Value]) -> Result<(), RuntimeError> {
    for v in values {
        execute_one(state, v)?;
    }
    Ok(())
}

/// Execute a single value: offer it to an active execution modifier, then
/// dispatch on executability.
pub fn execute_one(state: &mut State, v: &Value) -> Result<(), RuntimeError> {
    if builder_intercept(state, v)? {
        return Ok(());
    }
    execute_value(state, v)
}

fn execute_value(state: &mut State, v: &Value) -> Result<(), RuntimeError> {
    match v {
        Value::Name(n) if n.executable => {
            let var = resolve(state, n)?;
            let loaded = var.load()?;
            execute_one(state, &loaded)
        }
        Value::String(s) if s.executable => {
            let compiled = compile(&s.text)?;
            execute_one(state, &compiled)
        }
        Value::Array(a) if a.executable => {
            for element in a.to_vec() {
                execute_element(state, &element)?;
            }
            Ok(())
        }
        Value::Function(f) => f.call(state),
        Value::Named(n) => {
            let span = debug_span!("execute_named", name = %n.name, postfix = %n.value);
            let _guard = span.enter();
            execute_one(state, &n.value)
        }
        Value::Table(t) => t.execute(state),
        v => {
            state.push(v.clone());
            Ok(())
        }
    }
}

/// Execute one element of an executable array: a nested executable array
/// pushes itself rather than executing element-by-element.
fn execute_element(state: &mut State, v: &Value) -> Result<(), RuntimeError> {
    if builder_intercept(state, v)? {
        return Ok(());
    }
    match v {
        Value::Array(a) if a.executable => {
            state.push(v.clone());
            Ok(())
        }
        _ => execute_value(state, v),
    }
}

/// Push a data frame and an entity frame, execute, pop the entity frame,
/// and return the data items above the frame marker. The standard way to
/// evaluate a fragment and collect its results.
pub fn execute_framed(state: &mut State, values: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    state.push_data_frame();
    state.push_entity_frame();
    execute(state, values)?;
    state.pop_entity_frame()?;
    state.pop_data_frame()
}

/// Compile and execute a postfix source string
pub fn execute_source(state: &mut State, src: &str) -> Result<(), RuntimeError> {
    let compiled = compile(src)?;
    execute_one(state, &compiled)
}

/// If the top of the control stack is an active `{ … }` capture, hand the
/// value to it. Names are pre-resolved so braces hidden behind a name still
/// count toward nesting depth.
fn builder_intercept(state: &mut State, v: &Value) -> Result<bool, RuntimeError> {
    let (frame, depth) = match state.control_last() {
        Some(ControlItem::ExecBuilder { frame, depth }) => (*frame, *depth),
        _ => return Ok(false),
    };

    let mut loaded = None;
    if let Value::Name(n) = v {
        if let Ok(var) = resolve(state, n) {
            loaded = Some(var.load()?);
        }
    }

    let matches_brace = |name: &str| {
        is_brace(v, name) || loaded.as_ref().is_some_and(|l| is_brace(l, name))
    };

    if matches_brace("{") {
        set_builder_depth(state, depth + 1);
        state.push(v.clone());
        return Ok(true);
    }

    if matches_brace("}") {
        if depth > 1 {
            set_builder_depth(state, depth - 1);
            state.push(v.clone());
            return Ok(true);
        }
        // Capture complete: collect everything above the saved depth
        let captured = state.pop_n(state.data_depth() - frame)?;
        match state.pop_control()? {
            ControlItem::ExecBuilder { .. } => {}
            _ => return Err(RuntimeError::InvalidControl),
        }
        state.push(Value::exec_array(captured));
        return Ok(true);
    }

    state.push(v.clone());
    Ok(true)
}

fn set_builder_depth(state: &mut State, new_depth: usize) {
    if let Some(ControlItem::ExecBuilder { depth, .. }) = state.control_last_mut() {
        *depth = new_depth;
    }
}

fn is_brace(v: &Value, name: &str) -> bool {
    matches!(v, Value::Function(f) if f.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> State {
        let mut state = State::new();
        execute_source(&mut state, src).expect("execution should succeed");
        state
    }

    #[test]
    fn test_literals_push() {
        let s = run("1 2.5 'x' /name true");
        assert_eq!(s.data_depth(), 5);
        assert_eq!(s.peek(0).expect("peek"), &Value::int(1));
        assert_eq!(s.peek(4).expect("peek"), &Value::Bool(true));
    }

    #[test]
    fn test_framed_execution_restores_depths() {
        let mut s = State::new();
        s.push(Value::int(99));
        let compiled = compile("1 2 +").expect("compile");
        let out = execute_framed(&mut s, &[compiled]).expect("framed");
        assert_eq!(out, vec![Value::int(3)]);
        assert_eq!(s.data_depth(), 1);
        assert_eq!(s.control_depth(), 0);
        assert_eq!(s.entity_depth(), 0);
    }

    #[test]
    fn test_nested_exec_array_pushes_itself() {
        let s = run("{ 1 2 + }");
        assert_eq!(s.data_depth(), 1);
        match s.peek(0).expect("peek") {
            Value::Array(a) => {
                assert!(a.executable);
                assert_eq!(a.len(), 3);
            }
            v => panic!("expected executable array, got {:?}", v),
        }
    }

    #[test]
    fn test_exec_array_executes_via_execute_op() {
        let s = run("{ 1 2 + } execute");
        assert_eq!(s.data_depth(), 1);
        assert_eq!(s.peek(0).expect("peek"), &Value::int(3));
    }

    #[test]
    fn test_runtime_brace_capture() {
        // Code synthesized at run time can contain the bare `{` / `}`
        // operators; executing them drives the capture modifier.
        let open = crate::ops::resolve_operator("{").expect("op");
        let close = crate::ops::resolve_operator("}").expect("op");
        let program = Value::exec_array(vec![
            open,
            Value::int(1),
            Value::int(2),
            close,
        ]);

        let mut s = State::new();
        execute_one(&mut s, &program).expect("run");
        assert_eq!(s.data_depth(), 1);
        match s.peek(0).expect("peek") {
            Value::Array(a) => {
                assert!(a.executable);
                assert_eq!(a.len(), 2);
            }
            v => panic!("expected executable array, got {:?}", v),
        }
        assert_eq!(s.control_depth(), 0);
    }

    #[test]
    fn test_runtime_brace_capture_nests() {
        let open = crate::ops::resolve_operator("{").expect("op");
        let close = crate::ops::resolve_operator("}").expect("op");
        let program = Value::exec_array(vec![
            open.clone(),
            open,
            Value::int(1),
            close.clone(),
            close,
        ]);

        let mut s = State::new();
        execute_one(&mut s, &program).expect("run");
        assert_eq!(s.data_depth(), 1);
        match s.peek(0).expect("peek") {
            Value::Array(a) => {
                assert!(a.executable);
                // inner `{`, 1, inner `}`
                assert_eq!(a.len(), 3);
            }
            v => panic!("expected executable array, got {:?}", v),
        }
    }
}
