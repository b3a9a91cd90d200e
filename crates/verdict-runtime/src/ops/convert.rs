//! Conversion operators
//!
//! Conversion failure pushes Null rather than erroring, so rules tolerate
//! missing data where the author asks for a conversion. Stack underflow is
//! still an error.

use std::collections::HashMap;

use super::ins;
use crate::state::State;
use crate::value::{NameValue, NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["cvi"], |s| conv(s, |v| v.as_int().map(Value::int)));
    ins(m, &["cvr"], |s| conv(s, |v| v.as_float().map(Value::float)));
    ins(m, &["cvb"], |s| conv(s, |v| v.as_bool().map(Value::Bool)));
    ins(m, &["cvs"], |s| {
        let v = s.pop()?;
        s.push(Value::string(v.as_string()));
        Ok(())
    });
    // A leading `/` yields an executable name; no compound splitting
    ins(m, &["cvn"], |s| {
        let v = s.pop()?;
        let text = v.as_string();
        let name = match text.strip_prefix('/') {
            Some(rest) => Value::Name(NameValue {
                entity: None,
                member: rest.into(),
                executable: true,
            }),
            None => Value::Name(NameValue {
                entity: None,
                member: text.as_str().into(),
                executable: false,
            }),
        };
        s.push(name);
        Ok(())
    });
    ins(m, &["cve"], |s| {
        let v = s.pop()?;
        if matches!(v, Value::Entity(_)) {
            s.push(v);
        } else {
            s.push(Value::Null);
        }
        Ok(())
    });

    // Literal/executable flips for names, strings, and arrays
    ins(m, &["cvlit"], |s| {
        let v = s.pop()?.as_literal();
        s.push(v);
        Ok(())
    });
    ins(m, &["cvx"], |s| {
        let v = s.pop()?.as_executable();
        s.push(v);
        Ok(())
    });
}

fn conv(s: &mut State, f: fn(&Value) -> Result<Value, RuntimeError>) -> Result<(), RuntimeError> {
    let v = s.pop()?;
    match f(&v) {
        Ok(u) => s.push(u),
        Err(_) => s.push(Value::Null),
    }
    Ok(())
}
