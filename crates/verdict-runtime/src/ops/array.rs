//! Array operators, including the run-time array builders
//!
//! `[` pushes a data-frame mark and `]` collects everything above it into a
//! literal array. `{` pushes an execution-modifier onto the control stack
//! that captures subsequent values until the matching `}` (see the
//! execution loop); a bare `}` with no capture active is an error.

use std::collections::HashMap;

use super::{ins, pop2, pop3};
use crate::state::ControlItem;
use crate::value::{ArrayValue, NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["[", "mark"], |s| {
        s.push_data_frame();
        Ok(())
    });
    ins(m, &["]", "arraytomark"], |s| {
        let items = s.pop_data_frame()?;
        s.push(Value::array(items));
        Ok(())
    });
    ins(m, &["{"], |s| {
        s.push_control(ControlItem::ExecBuilder {
            frame: s.data_depth(),
            depth: 1,
        });
        Ok(())
    });
    ins(m, &["}"], |_| Err(RuntimeError::InvalidControl));

    ins(m, &["length"], |s| {
        let a = s.pop()?.as_array()?;
        s.push(Value::int(a.len() as i64));
        Ok(())
    });
    ins(m, &["getat"], |s| {
        let [x, y] = pop2(s)?;
        let a = x.as_array()?;
        let i = y.as_uint()? as usize;
        match a.get(i) {
            Some(v) => {
                s.push(v);
                Ok(())
            }
            None => Err(index_error(i, a.len())),
        }
    });
    ins(m, &["newarray"], |s| {
        s.push(Value::array(Vec::new()));
        Ok(())
    });
    ins(m, &["memberof"], |s| {
        let [x, y] = pop2(s)?;
        let a = x.as_array()?;
        s.push(Value::Bool(a.contains(&y)));
        Ok(())
    });
    ins(m, &["copyelements"], |s| {
        let a = s.pop()?.as_array()?;
        s.push(Value::Array(a.copy_elements()));
        Ok(())
    });
    ins(m, &["addto"], |s| {
        let [x, y] = pop2(s)?;
        x.as_array()?.append(y);
        Ok(())
    });
    ins(m, &["addat"], |s| {
        let [x, y, z] = pop3(s)?;
        let a = x.as_array()?;
        let i = y.as_int()? as usize;
        if i > a.len() {
            return Err(index_error(i, a.len()));
        }
        a.insert(i, z);
        Ok(())
    });
    ins(m, &["remove"], |s| {
        let [x, y] = pop2(s)?;
        let a = x.as_array()?;
        a.remove(&y);
        s.push(x);
        Ok(())
    });
    ins(m, &["removeat"], |s| {
        let [x, y] = pop2(s)?;
        let a = x.as_array()?;
        let i = y.as_int()? as usize;
        if i >= a.len() {
            return Err(index_error(i, a.len()));
        }
        a.remove_at(i);
        s.push(x);
        Ok(())
    });
    ins(m, &["add_no_dups"], |s| {
        let [x, y] = pop2(s)?;
        let a = x.as_array()?;
        if !a.contains(&y) {
            a.append(y);
        }
        Ok(())
    });
    ins(m, &["clear"], |s| {
        s.pop()?.as_array()?.clear();
        Ok(())
    });
    ins(m, &["merge"], |s| {
        let [x, y] = pop2(s)?;
        let (a, b) = (x.as_array()?, y.as_array()?);
        let mut items = a.to_vec();
        items.extend(b.to_vec());
        s.push(Value::Array(ArrayValue::new(items, false)));
        Ok(())
    });
}

fn index_error(i: usize, len: usize) -> RuntimeError {
    RuntimeError::Domain(format!("index {} out of range for array of {}", i, len))
}
