//! Control-flow operators: conditionals, loops, and loop counters

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{ins, pop2, pop3};
use crate::execute::{execute_framed, execute_one};
use crate::state::{ControlItem, State};
use crate::value::{NativeFn, RuntimeError, Value};

/// A value that can drive a conditional: a boolean, or Null reading false
fn is_test(v: &Value) -> bool {
    matches!(v, Value::Bool(_) | Value::Null)
}

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["i"], |s| counter(s, 0));
    ins(m, &["j"], |s| counter(s, 1));
    ins(m, &["k"], |s| counter(s, 2));

    // {body} test if. The test (a boolean, or Null reading as false) and
    // the body may arrive in either order
    ins(m, &["if"], |s| {
        let [a, b] = pop2(s)?;
        let (test, body) = if is_test(&b) || !is_test(&a) {
            (b, a)
        } else {
            (a, b)
        };
        if test.coerce_bool()? {
            execute_one(s, &body)?;
        }
        Ok(())
    });

    // {then} {else} test ifElse. The test may also precede the arms
    ins(m, &["ifelse"], |s| {
        let [a, b, c] = pop3(s)?;
        let (test, then_body, else_body) = if !is_test(&c) && is_test(&a) {
            (a, b, c)
        } else {
            (c, a, b)
        };
        if test.coerce_bool()? {
            execute_one(s, &then_body)
        } else {
            execute_one(s, &else_body)
        }
    });

    // {test} {body} while
    ins(m, &["while"], op_while);

    ins(m, &["for"], |s| op_for(s, false));
    ins(m, &["forr"], |s| op_for(s, true));
    ins(m, &["forall"], |s| op_for_all(s, false));
    ins(m, &["forallr"], |s| op_for_all(s, true));
}

/// Push the iteration counter of the `depth`-innermost active loop, or
/// Null when there is no such loop.
fn counter(s: &mut State, mut depth: usize) -> Result<(), RuntimeError> {
    let mut found = None;
    for item in s.control_items().iter().rev() {
        if let ControlItem::LoopCounter(c) = item {
            if depth == 0 {
                found = Some(c.get());
                break;
            }
            depth -= 1;
        }
    }
    match found {
        Some(i) => s.push(Value::int(i)),
        None => s.push(Value::Null),
    }
    Ok(())
}

fn op_while(s: &mut State) -> Result<(), RuntimeError> {
    let body = s.pop()?;
    let test = s.pop()?;

    let counter = Rc::new(Cell::new(0i64));
    s.push_control(ControlItem::LoopCounter(Rc::clone(&counter)));

    let mut i = 0i64;
    loop {
        counter.set(i);
        let out = execute_framed(s, std::slice::from_ref(&test))?;
        let top = out
            .last()
            .ok_or(RuntimeError::ResultArity { want: 1, got: 0 })?;
        if !top.coerce_bool()? {
            break;
        }
        execute_one(s, &body)?;
        i += 1;
    }

    s.pop_control()?;
    Ok(())
}

/// Pop the loop operands. The body is an executable array and the list a
/// literal one, so the two may arrive in either order; when both look like
/// lists the top of the stack is taken as the list.
fn pop_list_and_body(s: &mut State) -> Result<(crate::value::ArrayValue, Value), RuntimeError> {
    let [a, b] = pop2(s)?;
    let is_list = |v: &Value| matches!(v, Value::Array(arr) if !arr.executable) || v.is_null();
    if is_list(&b) {
        Ok((b.as_array()?, a))
    } else if is_list(&a) {
        Ok((a.as_array()?, b))
    } else {
        Ok((b.as_array()?, a))
    }
}

/// `{body} array for` pushes each element and runs the body; `forR`
/// traverses in reverse. The length is re-read every iteration so a body
/// that shrinks the array terminates cleanly.
fn op_for(s: &mut State, reverse: bool) -> Result<(), RuntimeError> {
    let (list, body) = pop_list_and_body(s)?;

    let counter = Rc::new(Cell::new(0i64));
    s.push_control(ControlItem::LoopCounter(Rc::clone(&counter)));

    if reverse {
        let mut i = list.len() as i64 - 1;
        while i >= 0 {
            counter.set(i);
            if let Some(v) = list.get(i as usize) {
                s.push(v);
                execute_one(s, &body)?;
            }
            i -= 1;
        }
    } else {
        let mut i = 0usize;
        while i < list.len() {
            counter.set(i as i64);
            match list.get(i) {
                Some(v) => {
                    s.push(v);
                    execute_one(s, &body)?;
                }
                None => break,
            }
            i += 1;
        }
    }

    s.pop_control()?;
    Ok(())
}

/// Like `for`, but each element must be an entity and is pushed onto the
/// entity stack for the body's duration. Null elements are skipped.
fn op_for_all(s: &mut State, reverse: bool) -> Result<(), RuntimeError> {
    let (list, body) = pop_list_and_body(s)?;

    let counter = Rc::new(Cell::new(0i64));
    s.push_control(ControlItem::LoopCounter(Rc::clone(&counter)));

    let len = list.len();
    let indices: Vec<usize> = if reverse {
        (0..len).rev().collect()
    } else {
        (0..len).collect()
    };

    for i in indices {
        counter.set(i as i64);
        let Some(v) = list.get(i) else { continue };
        if v.is_null() {
            continue;
        }
        s.push_entity(v.as_entity()?);
        execute_one(s, &body)?;
        s.pop_entity()?;
    }

    s.pop_control()?;
    Ok(())
}
