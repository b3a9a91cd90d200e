//! The operator catalog
//!
//! All built-in operators, split by value family. Lookup is a static
//! dispatch table keyed by lowercase name; resolution happens only after
//! the entity stack misses, so entities can shadow operators.

pub mod array;
pub mod boolean;
pub mod control;
pub mod convert;
pub mod datetime;
pub mod number;
pub mod stack;
pub mod string;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::state::State;
use crate::value::{FunctionValue, NativeFn, RuntimeError, Value};

static REGISTRY: OnceLock<HashMap<&'static str, NativeFn>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, NativeFn> {
    REGISTRY.get_or_init(|| {
        let mut m: HashMap<&'static str, NativeFn> = HashMap::with_capacity(160);
        number::register(&mut m);
        boolean::register(&mut m);
        string::register(&mut m);
        array::register(&mut m);
        control::register(&mut m);
        convert::register(&mut m);
        datetime::register(&mut m);
        stack::register(&mut m);
        m
    })
}

/// Resolve an operator (or the constants `true`, `false`, `null`) by
/// case-insensitive name.
pub fn resolve_operator(name: &str) -> Option<Value> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }
    registry()
        .get_key_value(lower.as_str())
        .map(|(&name, &f)| Value::Function(FunctionValue::Native { name, f }))
}

/// Register one function under each of its aliases
pub(crate) fn ins(m: &mut HashMap<&'static str, NativeFn>, names: &[&'static str], f: NativeFn) {
    for &name in names {
        m.insert(name, f);
    }
}

/// Pop two values in stack order (deeper value first)
pub(crate) fn pop2(s: &mut State) -> Result<[Value; 2], RuntimeError> {
    let v = s.pop_n(2)?;
    <[Value; 2]>::try_from(v).map_err(|_| RuntimeError::StackUnderflow)
}

/// Pop three values in stack order
pub(crate) fn pop3(s: &mut State) -> Result<[Value; 3], RuntimeError> {
    let v = s.pop_n(3)?;
    <[Value; 3]>::try_from(v).map_err(|_| RuntimeError::StackUnderflow)
}
