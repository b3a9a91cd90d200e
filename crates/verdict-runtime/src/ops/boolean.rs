//! Boolean operators

use std::collections::HashMap;

use super::{ins, pop2};
use crate::state::State;
use crate::value::{NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["not", "!", "¬"], |s| {
        let x = s.pop()?.as_bool()?;
        s.push(Value::Bool(!x));
        Ok(())
    });
    ins(m, &["and", "&&", "∧"], |s| bbin(s, |x, y| x && y));
    ins(m, &["or", "||", "∨"], |s| bbin(s, |x, y| x || y));
    ins(m, &["beq", "b==", "b="], |s| bbin(s, |x, y| x == y));
    ins(m, &["bne", "b!=", "b≠"], |s| bbin(s, |x, y| x != y));
}

fn bbin(s: &mut State, f: fn(bool, bool) -> bool) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_bool()?, y.as_bool()?);
    s.push(Value::Bool(r));
    Ok(())
}
