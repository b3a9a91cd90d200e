//! Entity and variable model
//!
//! Entities are named containers of fields, consulted by name resolution
//! when they sit on the entity stack. Fields are exposed as [`Variable`]
//! handles; definition-backed fields enforce type, writability, and the
//! required-not-null contract.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::state::State;
use crate::value::{FunctionValue, Kind, RuntimeError, Value};

/// A named container exposing fields by case-insensitive name
pub trait Entity {
    fn entity_name(&self) -> &str;

    /// Look up a field; `name` matching is case-insensitive
    fn field(&self, name: &str) -> Option<Rc<dyn Variable>>;

    /// JSON rendition of the entity, if it has one
    fn to_json(&self) -> Option<serde_json::Value> {
        None
    }
}

pub type EntityRef = Rc<dyn Entity>;

/// An access handle to a storage cell
pub trait Variable {
    fn load(&self) -> Result<Value, RuntimeError>;
    fn store(&self, value: Value) -> Result<(), RuntimeError>;
}

/// Wraps any value as an always-loadable, never-storable handle
pub struct ReadOnlyVariable(pub Value);

impl Variable for ReadOnlyVariable {
    fn load(&self) -> Result<Value, RuntimeError> {
        Ok(self.0.clone())
    }

    fn store(&self, _: Value) -> Result<(), RuntimeError> {
        Err(RuntimeError::ReadOnly)
    }
}

/// Declared shape of one field of a definition-backed entity
#[derive(Clone, Debug)]
pub struct FieldSpec {
    /// Declared kind; `Kind::Null` means untyped
    pub kind: Kind,
    pub default: Value,
    pub writable: bool,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(kind: Kind) -> Self {
        FieldSpec {
            kind,
            default: Value::Null,
            writable: false,
            required: false,
        }
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, v: Value) -> Self {
        self.default = v;
        self
    }
}

/// An entity definition: a fixed field set from which instances are minted
#[derive(Clone, Default, Debug)]
pub struct EntityDefinition {
    fields: Vec<(String, FieldSpec)>,
}

impl EntityDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Mint a new entity instance with every field at its default
    pub fn instantiate(&self, name: impl Into<String>) -> Rc<DefEntity> {
        let mut fields = HashMap::with_capacity(self.fields.len());
        for (field_name, spec) in &self.fields {
            fields.insert(
                field_name.to_lowercase(),
                Rc::new(EntityField {
                    name: field_name.clone(),
                    kind: spec.kind,
                    value: RefCell::new(spec.default.clone()),
                    writable: spec.writable,
                    required: spec.required,
                }),
            );
        }
        Rc::new(DefEntity {
            name: name.into(),
            fields,
        })
    }
}

/// A definition-backed entity instance
pub struct DefEntity {
    name: String,
    fields: HashMap<String, Rc<EntityField>>,
}

impl DefEntity {
    /// Host-side store, through the same checks the VM sees
    pub fn set(&self, field: &str, value: Value) -> Result<(), RuntimeError> {
        match self.fields.get(&field.to_lowercase()) {
            Some(f) => f.store_unchecked_access(value),
            None => Err(RuntimeError::CannotResolve {
                name: field.to_string(),
            }),
        }
    }

    /// Host-side load of the raw field value, ignoring the required check
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields
            .get(&field.to_lowercase())
            .map(|f| f.value.borrow().clone())
    }

    /// Iterate fields as (declared name, current value)
    pub fn fields(&self) -> impl Iterator<Item = (&str, Value)> {
        self.fields
            .values()
            .map(|f| (f.name.as_str(), f.value.borrow().clone()))
    }
}

impl Entity for DefEntity {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<Rc<dyn Variable>> {
        self.fields
            .get(&name.to_lowercase())
            .map(|f| Rc::clone(f) as Rc<dyn Variable>)
    }

    fn to_json(&self) -> Option<serde_json::Value> {
        let mut out = serde_json::Map::new();
        for (name, value) in self.fields() {
            let v = crate::json_entity::value_to_json(&value).unwrap_or(serde_json::Value::Null);
            out.insert(name.to_string(), v);
        }
        Some(serde_json::Value::Object(out))
    }
}

/// One typed field of a definition-backed entity
pub struct EntityField {
    name: String,
    kind: Kind,
    value: RefCell<Value>,
    writable: bool,
    required: bool,
}

impl EntityField {
    /// Type-checked store, skipping the writability check (host-side path)
    fn store_unchecked_access(&self, value: Value) -> Result<(), RuntimeError> {
        if self.kind == Kind::Null || value.kind() == self.kind {
            *self.value.borrow_mut() = value;
            return Ok(());
        }
        // The one deliberate coercion: a non-array stored into an
        // array-typed field appends.
        if self.kind == Kind::Array {
            let current = self.value.borrow().clone();
            match current {
                Value::Array(a) => a.append(value),
                _ => *self.value.borrow_mut() = Value::array(vec![value]),
            }
            return Ok(());
        }
        Err(RuntimeError::WrongType {
            want: self.kind,
            got: value.kind(),
        })
    }
}

impl Variable for EntityField {
    fn load(&self) -> Result<Value, RuntimeError> {
        let value = self.value.borrow();
        if self.required && value.is_null() {
            return Err(RuntimeError::UndefinedField {
                name: self.name.clone(),
            });
        }
        Ok(value.clone())
    }

    fn store(&self, value: Value) -> Result<(), RuntimeError> {
        if !self.writable {
            return Err(RuntimeError::ReadOnly);
        }
        self.store_unchecked_access(value)
    }
}

/// A host-built entity whose fields are read-only callable values. Pushing
/// one onto the entity stack adds operators to the resolution path without
/// touching the catalog.
pub struct FunctionsEntity {
    name: String,
    fields: RefCell<HashMap<String, Value>>,
}

impl FunctionsEntity {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionsEntity {
            name: name.into(),
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Register a host operator under a case-insensitive name
    pub fn define(
        &self,
        name: impl Into<String>,
        f: impl Fn(&mut State) -> Result<(), RuntimeError> + 'static,
    ) {
        let name = name.into();
        let value = Value::Function(FunctionValue::Host {
            name: name.as_str().into(),
            f: Rc::new(f),
        });
        self.fields.borrow_mut().insert(name.to_lowercase(), value);
    }

    /// Register any value under a case-insensitive name
    pub fn define_value(&self, name: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(name.into().to_lowercase(), value);
    }
}

impl Entity for FunctionsEntity {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<Rc<dyn Variable>> {
        self.fields
            .borrow()
            .get(&name.to_lowercase())
            .map(|v| Rc::new(ReadOnlyVariable(v.clone())) as Rc<dyn Variable>)
    }
}
