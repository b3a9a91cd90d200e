//! Numeric operators: integer and float arithmetic, comparison, rounding

use std::collections::HashMap;

use super::{ins, pop2, pop3};
use crate::state::State;
use crate::value::{NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["eq", "=="], |s| icmp(s, |x, y| x == y));
    ins(m, &["ne", "!="], |s| icmp(s, |x, y| x != y));
    ins(m, &["gt", ">"], |s| icmp(s, |x, y| x > y));
    ins(m, &["ge", ">="], |s| icmp(s, |x, y| x >= y));
    ins(m, &["lt", "<"], |s| icmp(s, |x, y| x < y));
    ins(m, &["le", "<="], |s| icmp(s, |x, y| x <= y));

    ins(m, &["add", "+"], |s| ibin(s, |x, y| Ok(x.wrapping_add(y))));
    ins(m, &["sub", "-"], |s| ibin(s, |x, y| Ok(x.wrapping_sub(y))));
    ins(m, &["mul", "*"], |s| ibin(s, |x, y| Ok(x.wrapping_mul(y))));
    ins(m, &["div", "/"], |s| {
        ibin(s, |x, y| {
            x.checked_div(y)
                .ok_or_else(|| RuntimeError::Domain("integer division by zero".to_string()))
        })
    });
    ins(m, &["abs"], |s| iun(s, i64::wrapping_abs));
    ins(m, &["neg"], |s| iun(s, i64::wrapping_neg));

    ins(m, &["feq", "f=="], |s| fcmp(s, |x, y| x == y));
    ins(m, &["fne", "f!="], |s| fcmp(s, |x, y| x != y));
    ins(m, &["fgt", "f>"], |s| fcmp(s, |x, y| x > y));
    ins(m, &["fge", "f>="], |s| fcmp(s, |x, y| x >= y));
    ins(m, &["flt", "f<"], |s| fcmp(s, |x, y| x < y));
    ins(m, &["fle", "f<="], |s| fcmp(s, |x, y| x <= y));

    ins(m, &["fadd", "f+"], |s| fbin(s, |x, y| x + y));
    ins(m, &["fsub", "f-"], |s| fbin(s, |x, y| x - y));
    ins(m, &["fmul", "f*"], |s| fbin(s, |x, y| x * y));
    ins(m, &["fdiv", "f/"], |s| fbin(s, |x, y| x / y));
    ins(m, &["fabs"], |s| fun(s, f64::abs));
    ins(m, &["fneg"], |s| fun(s, |x| -x));

    ins(m, &["roundto"], round_to);
}

fn icmp(s: &mut State, f: fn(i64, i64) -> bool) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_int()?, y.as_int()?);
    s.push(Value::Bool(r));
    Ok(())
}

fn ibin(s: &mut State, f: fn(i64, i64) -> Result<i64, RuntimeError>) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_int()?, y.as_int()?)?;
    s.push(Value::int(r));
    Ok(())
}

fn iun(s: &mut State, f: fn(i64) -> i64) -> Result<(), RuntimeError> {
    let x = s.pop()?.as_int()?;
    s.push(Value::int(f(x)));
    Ok(())
}

fn fcmp(s: &mut State, f: fn(f64, f64) -> bool) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_float()?, y.as_float()?);
    s.push(Value::Bool(r));
    Ok(())
}

fn fbin(s: &mut State, f: fn(f64, f64) -> f64) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_float()?, y.as_float()?);
    s.push(Value::float(r));
    Ok(())
}

fn fun(s: &mut State, f: fn(f64) -> f64) -> Result<(), RuntimeError> {
    let x = s.pop()?.as_float()?;
    s.push(Value::float(f(x)));
    Ok(())
}

/// `value places boundary roundTo` rounds `value` to `places` decimal
/// places, treating `boundary` as the fractional threshold: 0 < b < 1
/// rounds up at or above b, b <= 0 always rounds up, b >= 1 truncates.
fn round_to(s: &mut State) -> Result<(), RuntimeError> {
    let [value, places, boundary] = pop3(s)?;
    let value = value.as_float()?;
    let places = places.as_int()?;
    let boundary = boundary.as_float()?;

    let mut adj = 10f64.powi(places as i32);
    if value < 0.0 {
        adj = -adj;
    }

    let x = value * adj;
    let q = x.trunc();
    let r = (x - q).abs();

    let round_up = if boundary <= 0.0 {
        r > 0.0
    } else if boundary >= 1.0 {
        false
    } else {
        r >= boundary
    };

    let q = if round_up { q + 1.0 } else { q };
    s.push(Value::float(q / adj));
    Ok(())
}
