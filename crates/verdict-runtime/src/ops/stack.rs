//! Stack and entity operators: `pop dup swap isNull req xdef entityPush
//! entityPop execute`

use std::collections::HashMap;

use super::{ins, pop2};
use crate::execute::execute_one;
use crate::state::resolve;
use crate::value::{NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["pop"], |s| {
        s.pop()?;
        Ok(())
    });
    ins(m, &["dup"], |s| {
        let v = s.pop()?;
        s.push(v.clone());
        s.push(v);
        Ok(())
    });
    ins(m, &["swap", "exch"], |s| {
        let [x, y] = pop2(s)?;
        s.push(y);
        s.push(x);
        Ok(())
    });
    ins(m, &["isnull"], |s| {
        let v = s.pop()?;
        s.push(Value::Bool(v.is_null()));
        Ok(())
    });
    ins(m, &["req"], |s| {
        let [x, y] = pop2(s)?;
        s.push(Value::Bool(x.value_eq(&y)));
        Ok(())
    });

    // `value /name xdef` resolves the name and stores the value through it.
    // Either operand may be the name; when both are, the topmost wins.
    ins(m, &["xdef"], |s| {
        let [a, b] = pop2(s)?;
        let (name, value);
        if let Value::Name(n) = &b {
            name = n.clone();
            value = a;
        } else if let Value::Name(n) = &a {
            name = n.clone();
            value = b;
        } else {
            return Err(RuntimeError::not("a name"));
        }
        let var = resolve(s, &name)?;
        var.store(value)
    });

    ins(m, &["entitypush"], |s| {
        let e = s.pop()?.as_entity()?;
        s.push_entity(e);
        Ok(())
    });
    ins(m, &["entitypop"], |s| {
        s.pop_entity()?;
        Ok(())
    });

    // Pop a value, convert to its executable form, and execute it
    ins(m, &["execute"], |s| {
        let v = s.pop()?.as_executable();
        execute_one(s, &v)
    });
}
