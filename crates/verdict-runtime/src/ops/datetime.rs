//! Date and duration operators

use std::collections::HashMap;

use chrono::{DateTime, Duration as TimeDelta, Utc};

use super::{ins, pop2};
use crate::state::State;
use crate::value::{nanos, parse_date, NativeFn, RuntimeError, Value};

pub(crate) fn register(m: &mut HashMap<&'static str, NativeFn>) {
    ins(m, &["newdate"], |s| {
        let text = s.pop()?.as_string();
        let t = parse_date(&text)?;
        s.push(Value::DateTime(t));
        Ok(())
    });
    ins(m, &["getdate"], |s| {
        s.push(Value::DateTime(Utc::now()));
        Ok(())
    });

    // datetime duration plusDate -> datetime
    ins(m, &["plusdate"], |s| {
        let [x, y] = pop2(s)?;
        let t = x.as_datetime()?;
        let d = y.as_duration()?;
        let r = t
            .checked_add_signed(TimeDelta::nanoseconds(d))
            .ok_or_else(|| RuntimeError::Domain("date out of range".to_string()))?;
        s.push(Value::DateTime(r));
        Ok(())
    });
    // datetime datetime minusDate -> duration
    ins(m, &["minusdate"], |s| {
        let [x, y] = pop2(s)?;
        let (a, b) = (x.as_datetime()?, y.as_datetime()?);
        let ns = a
            .signed_duration_since(b)
            .num_nanoseconds()
            .ok_or_else(|| RuntimeError::Domain("duration out of range".to_string()))?;
        s.push(Value::duration(ns));
        Ok(())
    });

    ins(m, &["dategt"], |s| dcmp(s, |x, y| x > y));
    ins(m, &["datege"], |s| dcmp(s, |x, y| x >= y));
    ins(m, &["datelt"], |s| dcmp(s, |x, y| x < y));
    ins(m, &["datele"], |s| dcmp(s, |x, y| x <= y));
    ins(m, &["dateeq"], |s| dcmp(s, |x, y| x == y));

    // Duration units: `7 days` pushes a Duration of a week
    ins(m, &["second", "seconds"], |s| unit(s, nanos::SECOND));
    ins(m, &["minute", "minutes"], |s| unit(s, nanos::MINUTE));
    ins(m, &["hour", "hours"], |s| unit(s, nanos::HOUR));
    ins(m, &["day", "days"], |s| unit(s, nanos::DAY));
    ins(m, &["week", "weeks"], |s| unit(s, nanos::WEEK));
    ins(m, &["month", "months"], |s| unit(s, nanos::MONTH));
    ins(m, &["year", "years"], |s| unit(s, nanos::YEAR));
}

fn dcmp(
    s: &mut State,
    f: fn(DateTime<Utc>, DateTime<Utc>) -> bool,
) -> Result<(), RuntimeError> {
    let [x, y] = pop2(s)?;
    let r = f(x.as_datetime()?, y.as_datetime()?);
    s.push(Value::Bool(r));
    Ok(())
}

fn unit(s: &mut State, scale: i64) -> Result<(), RuntimeError> {
    let n = s.pop()?.as_int()?;
    s.push(Value::duration(n.wrapping_mul(scale)));
    Ok(())
}
