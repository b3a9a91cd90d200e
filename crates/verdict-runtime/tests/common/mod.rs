//! Shared helpers for runtime integration tests
#![allow(dead_code)]

use verdict_runtime::{execute_source, RuntimeError, State, Value};

/// Execute a postfix fragment on a fresh state and return the data stack
pub fn eval(src: &str) -> Vec<Value> {
    let mut state = State::new();
    execute_source(&mut state, src)
        .unwrap_or_else(|e| panic!("execution of {:?} failed: {}", src, e));
    state.data().to_vec()
}

/// Execute a postfix fragment and return the top of the data stack
pub fn eval_top(src: &str) -> Value {
    eval(src)
        .pop()
        .unwrap_or_else(|| panic!("no result for {:?}", src))
}

/// Execute a postfix fragment and return the error it produces
pub fn eval_err(src: &str) -> RuntimeError {
    let mut state = State::new();
    match execute_source(&mut state, src) {
        Err(e) => e,
        Ok(()) => panic!("execution of {:?} unexpectedly succeeded", src),
    }
}
