//! JSON-backed external entities
//!
//! Wraps a JSON object as an entity: field loads convert the underlying
//! JSON value on demand: objects become nested JSON entities, arrays
//! become literal arrays, primitives the matching value kinds. Field
//! stores write back. Loaded and stored values are cached so repeated
//! loads observe mutations made through earlier references.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value as JsonValue};

use crate::entity::{Entity, Variable};
use crate::value::{Number, RuntimeError, Value};

/// An entity backed by a JSON object
pub struct JsonEntity {
    name: String,
    inner: Rc<Inner>,
}

struct Inner {
    raw: Map<String, JsonValue>,
    /// Lowercased key → (original key, converted value). Shadows `raw`.
    cache: RefCell<HashMap<String, (String, Value)>>,
}

impl JsonEntity {
    pub fn new(name: impl Into<String>, values: Map<String, JsonValue>) -> Self {
        JsonEntity {
            name: name.into(),
            inner: Rc::new(Inner {
                raw: values,
                cache: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The value must be a JSON object
    pub fn from_value(name: impl Into<String>, value: JsonValue) -> Result<Self, RuntimeError> {
        match value {
            JsonValue::Object(map) => Ok(JsonEntity::new(name, map)),
            v => Err(RuntimeError::Domain(format!(
                "expected a JSON object, got {}",
                json_kind(&v)
            ))),
        }
    }
}

impl Entity for JsonEntity {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<Rc<dyn Variable>> {
        let lower = name.to_lowercase();
        let key = match self.inner.cache.borrow().get(&lower) {
            Some((k, _)) => Some(k.clone()),
            None => self
                .inner
                .raw
                .keys()
                .find(|k| k.eq_ignore_ascii_case(name))
                .cloned(),
        }?;
        Some(Rc::new(JsonVariable {
            inner: Rc::clone(&self.inner),
            key,
            lower,
        }))
    }

    fn to_json(&self) -> Option<JsonValue> {
        let mut out = self.inner.raw.clone();
        for (key, value) in self.inner.cache.borrow().values() {
            if let Ok(v) = value_to_json(value) {
                out.insert(key.clone(), v);
            }
        }
        Some(JsonValue::Object(out))
    }
}

/// Access handle for one key of a JSON entity
struct JsonVariable {
    inner: Rc<Inner>,
    key: String,
    lower: String,
}

impl Variable for JsonVariable {
    fn load(&self) -> Result<Value, RuntimeError> {
        if let Some((_, v)) = self.inner.cache.borrow().get(&self.lower) {
            return Ok(v.clone());
        }
        let value = match self.inner.raw.get(&self.key) {
            Some(v) => json_to_value(&self.key, v)?,
            None => Value::Null,
        };
        self.inner
            .cache
            .borrow_mut()
            .insert(self.lower.clone(), (self.key.clone(), value.clone()));
        Ok(value)
    }

    fn store(&self, value: Value) -> Result<(), RuntimeError> {
        self.inner
            .cache
            .borrow_mut()
            .insert(self.lower.clone(), (self.key.clone(), value));
        Ok(())
    }
}

/// Convert a JSON value into a runtime value; `name` names nested entities
pub fn json_to_value(name: &str, v: &JsonValue) -> Result<Value, RuntimeError> {
    match v {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::float(f))
            } else {
                Err(RuntimeError::Domain(format!("unrepresentable number {}", n)))
            }
        }
        JsonValue::String(s) => Ok(Value::string(s)),
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let v = json_to_value(name, item)
                    .map_err(|e| RuntimeError::Domain(format!("[{}]: {}", i, e)))?;
                out.push(v);
            }
            Ok(Value::array(out))
        }
        JsonValue::Object(map) => Ok(Value::Entity(Rc::new(JsonEntity::new(
            name,
            map.clone(),
        )))),
    }
}

/// Convert a runtime value back into JSON
pub fn value_to_json(v: &Value) -> Result<JsonValue, RuntimeError> {
    match v {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(Number::Int(i)) => Ok(JsonValue::from(*i)),
        Value::Number(Number::Duration(ns)) => Ok(JsonValue::from(*ns)),
        Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| RuntimeError::Domain(format!("unrepresentable number {}", f))),
        Value::String(s) => Ok(JsonValue::String(s.text.to_string())),
        Value::Name(n) => Ok(JsonValue::String(n.full_name())),
        Value::DateTime(t) => Ok(JsonValue::String(t.to_rfc3339())),
        Value::Array(a) => {
            let mut out = Vec::with_capacity(a.len());
            for v in a.to_vec() {
                out.push(value_to_json(&v)?);
            }
            Ok(JsonValue::Array(out))
        }
        Value::Entity(e) => e
            .to_json()
            .ok_or_else(|| RuntimeError::Domain("cannot convert entity into JSON".to_string())),
        Value::Named(n) => value_to_json(&n.value),
        v => Err(RuntimeError::Domain(format!(
            "cannot convert {} into JSON",
            v.kind()
        ))),
    }
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
