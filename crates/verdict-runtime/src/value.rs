//! Runtime value representation
//!
//! Shared value universe for the VM and the decision-table evaluator.
//! - Numbers, bools, dates: immediate values (stack-allocated)
//! - Strings: heap-allocated, reference-counted (`Rc<str>`), immutable
//! - Arrays: heap-allocated, reference-counted (`Rc<RefCell<Vec<Value>>>`), mutable
//! - Entities: reference-counted trait objects, shared with the entity stack
//!
//! Literal and executable variants of strings, names, and arrays share one
//! representation with an `executable` flag; converting between the two
//! flavors shares the underlying storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::compiler::CompileError;
use crate::entity::EntityRef;
use crate::state::State;
use crate::table::DecisionTable;

/// Nanosecond scale constants for durations
pub mod nanos {
    pub const SECOND: i64 = 1_000_000_000;
    pub const MINUTE: i64 = 60 * SECOND;
    pub const HOUR: i64 = 60 * MINUTE;
    pub const DAY: i64 = 24 * HOUR;
    pub const WEEK: i64 = 7 * DAY;
    pub const MONTH: i64 = 30 * DAY;
    pub const YEAR: i64 = 365 * DAY;
}

/// Kind tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Name,
    Number,
    Boolean,
    DateTime,
    String,
    Array,
    Function,
    Entity,
    Table,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Null => "null",
            Kind::Name => "name",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::DateTime => "datetime",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Function => "function",
            Kind::Entity => "entity",
            Kind::Table => "decisionTable",
        };
        write!(f, "{}", s)
    }
}

/// Numeric payload: the underlying representation governs formatting and
/// preferred promotion. Durations are numbers whose integer value is
/// nanoseconds.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
    Duration(i64),
}

impl Number {
    pub fn as_int(self) -> i64 {
        match self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
            Number::Duration(v) => v,
        }
    }

    pub fn as_uint(self) -> u64 {
        match self {
            Number::Int(v) => v as u64,
            Number::Float(v) => v as u64,
            Number::Duration(v) => v as u64,
        }
    }

    pub fn as_float(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
            Number::Duration(v) => v as f64,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Duration(v) => write!(f, "{}", format_duration(*v)),
        }
    }
}

/// String payload; executable strings are postfix source
#[derive(Clone)]
pub struct StringValue {
    pub text: Rc<str>,
    pub executable: bool,
}

/// Name payload; `entity` is set for compound names `Entity.Member`
#[derive(Clone)]
pub struct NameValue {
    pub entity: Option<Rc<str>>,
    pub member: Rc<str>,
    pub executable: bool,
}

impl NameValue {
    /// Split a symbol at the first `.` into a compound name
    pub fn parse(text: &str, executable: bool) -> Self {
        match text.split_once('.') {
            Some((entity, member)) => NameValue {
                entity: Some(entity.into()),
                member: member.into(),
                executable,
            },
            None => NameValue {
                entity: None,
                member: text.into(),
                executable,
            },
        }
    }

    pub fn is_compound(&self) -> bool {
        self.entity.is_some()
    }

    /// The full dotted name, without the literal `/` prefix
    pub fn full_name(&self) -> String {
        match &self.entity {
            Some(e) => format!("{}.{}", e, self.member),
            None => self.member.to_string(),
        }
    }
}

/// Array payload: a shared, mutable sequence of values
#[derive(Clone)]
pub struct ArrayValue {
    items: Rc<RefCell<Vec<Value>>>,
    pub executable: bool,
}

impl ArrayValue {
    pub fn new(items: Vec<Value>, executable: bool) -> Self {
        ArrayValue {
            items: Rc::new(RefCell::new(items)),
            executable,
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Value> {
        self.items.borrow().get(i).cloned()
    }

    pub fn append(&self, v: Value) {
        self.items.borrow_mut().push(v);
    }

    pub fn insert(&self, i: usize, v: Value) {
        self.items.borrow_mut().insert(i, v);
    }

    /// Remove every element equal (by value-equality) to `v`
    pub fn remove(&self, v: &Value) {
        self.items.borrow_mut().retain(|u| !u.value_eq(v));
    }

    pub fn remove_at(&self, i: usize) {
        self.items.borrow_mut().remove(i);
    }

    pub fn contains(&self, v: &Value) -> bool {
        self.items.borrow().iter().any(|u| u.value_eq(v))
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    /// Snapshot of the current elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Shallow copy into a fresh backing store of the same flavor
    pub fn copy_elements(&self) -> ArrayValue {
        ArrayValue::new(self.to_vec(), self.executable)
    }

    /// Same backing store, literal flavor
    pub fn as_literal(&self) -> ArrayValue {
        ArrayValue {
            items: Rc::clone(&self.items),
            executable: false,
        }
    }

    /// Same backing store, executable flavor
    pub fn as_executable(&self) -> ArrayValue {
        ArrayValue {
            items: Rc::clone(&self.items),
            executable: true,
        }
    }

    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

/// A built-in operator implementation
pub type NativeFn = fn(&mut State) -> Result<(), RuntimeError>;

/// An opaque callable value: a catalog operator or a host-provided closure
#[derive(Clone)]
pub enum FunctionValue {
    Native { name: &'static str, f: NativeFn },
    Host { name: Rc<str>, f: Rc<dyn Fn(&mut State) -> Result<(), RuntimeError>> },
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        match self {
            FunctionValue::Native { name, .. } => name,
            FunctionValue::Host { name, .. } => name,
        }
    }

    pub fn call(&self, state: &mut State) -> Result<(), RuntimeError> {
        match self {
            FunctionValue::Native { f, .. } => f(state),
            FunctionValue::Host { f, .. } => f(state),
        }
    }
}

/// A value decorated with a display name; executing it executes the
/// underlying value under a trace span.
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

/// Runtime value
#[derive(Clone)]
pub enum Value {
    Null,
    Number(Number),
    Bool(bool),
    DateTime(DateTime<Utc>),
    String(StringValue),
    Name(NameValue),
    Array(ArrayValue),
    Function(FunctionValue),
    Entity(EntityRef),
    Named(Rc<NamedValue>),
    Table(Rc<DecisionTable>),
}

impl Value {
    // === Constructors ===

    pub fn int(v: i64) -> Self {
        Value::Number(Number::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Value::Number(Number::Float(v))
    }

    pub fn duration(nanos: i64) -> Self {
        Value::Number(Number::Duration(nanos))
    }

    /// Literal string value
    pub fn string(text: impl AsRef<str>) -> Self {
        Value::String(StringValue {
            text: text.as_ref().into(),
            executable: false,
        })
    }

    /// Executable string (postfix source)
    pub fn source(text: impl AsRef<str>) -> Self {
        Value::String(StringValue {
            text: text.as_ref().into(),
            executable: true,
        })
    }

    /// Literal array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(items, false))
    }

    /// Executable array value
    pub fn exec_array(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(items, true))
    }

    /// Literal name `/text` (compound if the text contains a dot)
    pub fn literal_name(text: &str) -> Self {
        Value::Name(NameValue::parse(text, false))
    }

    /// Executable name (compound if the text contains a dot)
    pub fn exec_name(text: &str) -> Self {
        Value::Name(NameValue::parse(text, true))
    }

    pub fn entity(e: EntityRef) -> Self {
        Value::Entity(e)
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Value::Named(Rc::new(NamedValue {
            name: name.into(),
            value,
        }))
    }

    // === Type queries ===

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Number(_) => Kind::Number,
            Value::Bool(_) => Kind::Boolean,
            Value::DateTime(_) => Kind::DateTime,
            Value::String(_) => Kind::String,
            Value::Name(_) => Kind::Name,
            Value::Array(_) => Kind::Array,
            Value::Function(_) => Kind::Function,
            Value::Entity(_) => Kind::Entity,
            Value::Named(n) => n.value.kind(),
            Value::Table(_) => Kind::Table,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // === Strict conversions ===
    //
    // Null fails with the kind-specific error; the conversion operators
    // (`cvi` etc.) catch the failure and push Null instead.

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_int()),
            Value::String(s) => s
                .text
                .parse()
                .map_err(|_| RuntimeError::not("numeric")),
            Value::Named(n) => n.value.as_int(),
            _ => Err(RuntimeError::not("numeric")),
        }
    }

    pub fn as_uint(&self) -> Result<u64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_uint()),
            Value::String(s) => s
                .text
                .parse()
                .map_err(|_| RuntimeError::not("numeric")),
            Value::Named(n) => n.value.as_uint(),
            _ => Err(RuntimeError::not("numeric")),
        }
    }

    pub fn as_float(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_float()),
            Value::String(s) => s
                .text
                .parse()
                .map_err(|_| RuntimeError::not("numeric")),
            Value::Named(n) => n.value.as_float(),
            _ => Err(RuntimeError::not("numeric")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => parse_bool(&s.text).ok_or_else(|| RuntimeError::not("boolean")),
            Value::Named(n) => n.value.as_bool(),
            _ => Err(RuntimeError::not("boolean")),
        }
    }

    /// Boolean coercion for test positions (`if`, `ifElse`, `while`,
    /// decision-table conditions): Null reads as false.
    pub fn coerce_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Value::Null => Ok(false),
            v => v.as_bool(),
        }
    }

    pub fn as_datetime(&self) -> Result<DateTime<Utc>, RuntimeError> {
        match self {
            Value::DateTime(t) => Ok(*t),
            Value::String(s) => parse_date(&s.text),
            Value::Named(n) => n.value.as_datetime(),
            _ => Err(RuntimeError::not("a date")),
        }
    }

    /// Duration in nanoseconds. Plain integers read as nanoseconds.
    pub fn as_duration(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(n.as_int()),
            Value::String(s) => parse_duration(&s.text),
            Value::Named(n) => n.value.as_duration(),
            _ => Err(RuntimeError::not("a duration")),
        }
    }

    /// Array view; Null reads as an empty array so iterating a missing
    /// list is a no-op.
    pub fn as_array(&self) -> Result<ArrayValue, RuntimeError> {
        match self {
            Value::Array(a) => Ok(a.clone()),
            Value::Null => Ok(ArrayValue::new(Vec::new(), false)),
            Value::Named(n) => n.value.as_array(),
            _ => Err(RuntimeError::not("an array")),
        }
    }

    pub fn as_entity(&self) -> Result<EntityRef, RuntimeError> {
        match self {
            Value::Entity(e) => Ok(Rc::clone(e)),
            Value::Named(n) => n.value.as_entity(),
            _ => Err(RuntimeError::not("an entity")),
        }
    }

    /// Text of a string, or the display form of anything else. Never fails.
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.text.to_string(),
            Value::Named(n) => n.value.as_string(),
            v => v.to_string(),
        }
    }

    // === Literal/executable flips ===

    pub fn as_literal(&self) -> Value {
        match self {
            Value::String(s) => Value::String(StringValue {
                text: Rc::clone(&s.text),
                executable: false,
            }),
            Value::Name(n) => Value::Name(NameValue {
                entity: n.entity.clone(),
                member: Rc::clone(&n.member),
                executable: false,
            }),
            Value::Array(a) => Value::Array(a.as_literal()),
            v => v.clone(),
        }
    }

    pub fn as_executable(&self) -> Value {
        match self {
            Value::String(s) => Value::String(StringValue {
                text: Rc::clone(&s.text),
                executable: true,
            }),
            Value::Name(n) => Value::Name(NameValue {
                entity: n.entity.clone(),
                member: Rc::clone(&n.member),
                executable: true,
            }),
            Value::Array(a) => Value::Array(a.as_executable()),
            v => v.clone(),
        }
    }

    /// Value equality, from `self`'s perspective. Numbers compare through
    /// their preferred representation (so `5` equals `'5'`), arrays compare
    /// element-wise recursively regardless of identity.
    pub fn value_eq(&self, other: &Value) -> bool {
        match self {
            Value::Null => other.is_null(),
            Value::Name(a) => match other {
                Value::Name(b) => a.full_name() == b.full_name(),
                _ => false,
            },
            Value::String(a) => a.text.as_ref() == other.as_string(),
            Value::Number(Number::Int(_)) => match other.as_int() {
                Ok(b) => self.as_int().is_ok_and(|a| a == b),
                Err(_) => false,
            },
            Value::Number(_) => match other.as_float() {
                Ok(b) => self.as_float().is_ok_and(|a| a == b),
                Err(_) => false,
            },
            Value::Bool(a) => other.as_bool().is_ok_and(|b| *a == b),
            Value::DateTime(a) => match other {
                Value::DateTime(b) => a == b,
                _ => false,
            },
            Value::Array(a) => match other {
                Value::Array(b) => {
                    if a.len() != b.len() {
                        return false;
                    }
                    let (x, y) = (a.to_vec(), b.to_vec());
                    x.iter().zip(y.iter()).all(|(u, v)| u.value_eq(v))
                }
                _ => false,
            },
            Value::Function(a) => match other {
                Value::Function(b) => a.name() == b.name(),
                _ => false,
            },
            Value::Entity(a) => match other {
                Value::Entity(b) => Rc::ptr_eq(a, b),
                _ => false,
            },
            Value::Named(a) => a.value.value_eq(other),
            Value::Table(a) => match other {
                Value::Table(b) => Rc::ptr_eq(a, b),
                _ => false,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(t) => write!(f, "{}", t),
            Value::String(s) => {
                if s.executable {
                    write!(f, "{}", s.text)
                } else {
                    write!(f, "{}", quote(&s.text))
                }
            }
            Value::Name(n) => {
                if n.executable {
                    write!(f, "{}", n.full_name())
                } else {
                    write!(f, "/{}", n.full_name())
                }
            }
            Value::Array(a) => {
                let (open, close) = if a.executable { ("{", "}") } else { ("[", "]") };
                write!(f, "{}", open)?;
                for v in a.to_vec() {
                    write!(f, " {}", v)?;
                }
                write!(f, " {}", close)
            }
            Value::Function(v) => write!(f, "{}", v.name()),
            Value::Entity(e) => write!(f, "{}", e.entity_name()),
            Value::Named(n) => write!(f, "{}", n.name),
            Value::Table(_) => write!(f, "decisionTable"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            v => write!(f, "{}({})", v.kind(), v),
        }
    }
}

/// Single-quote a string, escaping what the scanner requires
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s == "1" || s.eq_ignore_ascii_case("t") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" || s.eq_ignore_ascii_case("f") {
        Some(false)
    } else {
        None
    }
}

/// Parse a `yyyy-mm-dd` date into midnight UTC
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, RuntimeError> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RuntimeError::Domain(format!("invalid date {:?}: {}", s, e)))?;
    match date.and_hms_opt(0, 0, 0) {
        Some(t) => Ok(t.and_utc()),
        None => Err(RuntimeError::Domain(format!("invalid date {:?}", s))),
    }
}

/// Parse concatenated `<n><unit>` duration groups, e.g. `1h30m` or `2 weeks`
pub fn parse_duration(s: &str) -> Result<i64, RuntimeError> {
    let s = s.to_lowercase();
    let bad = |part: &str| RuntimeError::Domain(format!("invalid duration component {:?}", part));

    let mut total: i64 = 0;
    let mut chars = s.chars().peekable();
    let mut any = false;
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut digits = String::new();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            chars.next();
        }
        let mut unit = String::new();
        while let Some(&c) = chars.peek() {
            if !c.is_alphabetic() && c != 'µ' {
                break;
            }
            unit.push(c);
            chars.next();
        }
        if digits.is_empty() || unit.is_empty() {
            return Err(RuntimeError::Domain(format!("invalid duration {:?}", s)));
        }

        let n: i64 = digits.parse().map_err(|_| bad(&digits))?;
        let scale = match unit.as_str() {
            "ns" | "nanosecond" | "nanoseconds" => 1,
            "us" | "µs" | "μs" | "microsecond" | "microseconds" => 1_000,
            "ms" | "millisecond" | "milliseconds" => 1_000_000,
            "s" | "sec" | "second" | "seconds" => nanos::SECOND,
            "m" | "min" | "minute" | "minutes" => nanos::MINUTE,
            "h" | "hr" | "hour" | "hours" => nanos::HOUR,
            "d" | "day" | "days" => nanos::DAY,
            "w" | "wk" | "week" | "weeks" => nanos::WEEK,
            "mo" | "month" | "months" => nanos::MONTH,
            "y" | "year" | "years" => nanos::YEAR,
            _ => return Err(bad(&unit)),
        };
        total += n * scale;
        any = true;
    }

    if !any {
        return Err(RuntimeError::Domain(format!("invalid duration {:?}", s)));
    }
    Ok(total)
}

/// Format a duration: year/day coarse-grained at or above 24h, compact
/// `XhYmZs` below.
pub fn format_duration(ns: i64) -> String {
    let mut out = String::new();
    let mut v = ns;
    if v < 0 {
        out.push('-');
        v = -v;
    }

    if v >= nanos::DAY {
        let years = v / nanos::YEAR;
        if years > 0 {
            out.push_str(&format!("{}y", years));
            v -= years * nanos::YEAR;
        }
        let days = v / nanos::DAY;
        if days > 0 {
            out.push_str(&format!("{}d", days));
            v -= days * nanos::DAY;
        }
        if v == 0 {
            return out;
        }
    }

    let hours = v / nanos::HOUR;
    let minutes = (v % nanos::HOUR) / nanos::MINUTE;
    let secs = (v % nanos::MINUTE) as f64 / nanos::SECOND as f64;
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", secs));
    out
}

/// Runtime error type
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("value is not {kind}")]
    NotKind { kind: &'static str },

    #[error("cannot resolve name {name:?}")]
    CannotResolve { name: String },

    #[error("required field {name:?} has no value")]
    UndefinedField { name: String },

    #[error("cannot store into a read-only variable")]
    ReadOnly,

    #[error("wrong type: want {want}, got {got}")]
    WrongType { want: Kind, got: Kind },

    #[error("no stack frame")]
    NoStackFrame,

    #[error("invalid stack frame")]
    InvalidStackFrame,

    #[error("invalid control stack")]
    InvalidControl,

    #[error("{0}")]
    Domain(String),

    #[error("expected {want} results, got {got}")]
    ResultArity { want: usize, got: usize },

    #[error("condition produced no result")]
    NoConditionResult,

    #[error("case {index}: {source}")]
    Case {
        index: usize,
        #[source]
        source: Box<RuntimeError>,
    },

    #[error("condition {index}: {source}")]
    Condition {
        index: usize,
        #[source]
        source: Box<RuntimeError>,
    },

    #[error("action {index}: {source}")]
    Action {
        index: usize,
        #[source]
        source: Box<RuntimeError>,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl RuntimeError {
    pub(crate) fn not(kind: &'static str) -> Self {
        RuntimeError::NotKind { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Value::int(42).to_string(), "42");
        assert_eq!(Value::float(3.25).to_string(), "3.25");
        assert_eq!(Value::float(-5.0).to_string(), "-5");
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(Value::duration(90 * nanos::MINUTE).to_string(), "1h30m0s");
        assert_eq!(Value::duration(5 * nanos::SECOND).to_string(), "5s");
        assert_eq!(
            Value::duration(nanos::YEAR + 2 * nanos::DAY).to_string(),
            "1y2d"
        );
        assert_eq!(
            Value::duration(3 * nanos::DAY + nanos::HOUR).to_string(),
            "3d1h0m0s"
        );
    }

    #[test]
    fn test_string_display_quotes() {
        assert_eq!(Value::string("a'b\n").to_string(), "'a\\'b\\n'");
        assert_eq!(Value::source("1 2 +").to_string(), "1 2 +");
    }

    #[test]
    fn test_name_display() {
        assert_eq!(Value::literal_name("x").to_string(), "/x");
        assert_eq!(Value::exec_name("x").to_string(), "x");
        assert_eq!(Value::literal_name("a.b").to_string(), "/a.b");
        assert_eq!(Value::exec_name("a.b").to_string(), "a.b");
    }

    #[test]
    fn test_array_display() {
        let a = Value::array(vec![Value::int(1), Value::int(2)]);
        assert_eq!(a.to_string(), "[ 1 2 ]");
        let x = Value::exec_array(vec![Value::int(1)]);
        assert_eq!(x.to_string(), "{ 1 }");
    }

    #[test]
    fn test_null_compares_only_to_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::int(0));
        assert_ne!(Value::Null, Value::string(""));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_numeric_equality_promotes() {
        assert_eq!(Value::int(5), Value::float(5.0));
        assert_eq!(Value::int(5), Value::string("5"));
        assert_eq!(Value::string("5"), Value::int(5));
        assert_ne!(Value::int(5), Value::int(6));
    }

    #[test]
    fn test_array_equality_is_structural() {
        let a = Value::array(vec![Value::int(1), Value::string("x")]);
        let b = Value::array(vec![Value::int(1), Value::string("x")]);
        assert_eq!(a, b);

        let nested_a = Value::array(vec![a.clone()]);
        let nested_b = Value::array(vec![b]);
        assert_eq!(nested_a, nested_b);

        let c = Value::array(vec![Value::int(2)]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_array_mutation_shared() {
        let a = ArrayValue::new(vec![Value::int(1)], false);
        let b = a.clone();
        a.append(Value::int(2));
        assert_eq!(b.len(), 2);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_literal_executable_flip_shares_storage() {
        let a = ArrayValue::new(vec![Value::int(1)], true);
        let lit = a.as_literal();
        assert!(!lit.executable);
        lit.append(Value::int(2));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_null_conversions_fail() {
        assert!(Value::Null.as_int().is_err());
        assert!(Value::Null.as_float().is_err());
        assert!(Value::Null.as_bool().is_err());
        assert!(Value::Null.as_datetime().is_err());
        assert_eq!(Value::Null.coerce_bool().expect("coerce"), false);
        assert_eq!(Value::Null.as_array().expect("array").len(), 0);
    }

    #[test]
    fn test_string_conversions_parse() {
        assert_eq!(Value::string("42").as_int().expect("int"), 42);
        assert_eq!(Value::string("2.5").as_float().expect("float"), 2.5);
        assert_eq!(Value::string("true").as_bool().expect("bool"), true);
        assert!(Value::string("nope").as_int().is_err());
    }

    #[test]
    fn test_parse_duration_groups() {
        assert_eq!(parse_duration("1h30m").expect("dur"), 90 * nanos::MINUTE);
        assert_eq!(parse_duration("7 days").expect("dur"), 7 * nanos::DAY);
        assert_eq!(parse_duration("2w").expect("dur"), 2 * nanos::WEEK);
        assert_eq!(parse_duration("500ms").expect("dur"), 500_000_000);
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5 parsecs").is_err());
        assert!(parse_duration("h5").is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("2024-01-08").expect("date");
        assert_eq!(d.to_string(), "2024-01-08 00:00:00 UTC");
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
