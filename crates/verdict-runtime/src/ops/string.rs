//! String operators

use std::collections::HashMap;

use super::{ins, pop2};
use crate::state::State;
use crate::value::{NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["strlength"], |s| {
        let x = s.pop()?.as_string();
        s.push(Value::int(x.len() as i64));
        Ok(())
    });
    ins(m, &["strconcat", "s+"], |s| {
        let [x, y] = pop2(s)?;
        s.push(Value::string(x.as_string() + &y.as_string()));
        Ok(())
    });
    // Removes the first occurrence of the right operand
    ins(m, &["strremove", "s-"], |s| {
        let [x, y] = pop2(s)?;
        let r = x.as_string().replacen(&y.as_string(), "", 1);
        s.push(Value::string(r));
        Ok(())
    });

    ins(m, &["streq", "s=="], |s| scmp(s, |x, y| x == y));
    ins(m, &["strne", "s!="], |s| scmp(s, |x, y| x != y));
    ins(m, &["strgt", "s>"], |s| scmp(s, |x, y| x > y));
    ins(m, &["strge", "s>="], |s| scmp(s, |x, y| x >= y));
    ins(m, &["strlt", "s<"], |s| scmp(s, |x, y| x < y));
    ins(m, &["strle", "s<="], |s| scmp(s, |x, y| x <= y));

    ins(m, &["streqignorecase", "sic=="], |s| {
        scmp(s, |x, y| x.to_lowercase() == y.to_lowercase())
    });
}

fn scmp(s: &mut State, f: fn(&str, &str) -> bool) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(&x.as_string(), &y.as_string());
    s.push(Value::Bool(r));
    Ok(())
}
