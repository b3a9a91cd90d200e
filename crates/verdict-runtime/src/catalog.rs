//! Catalog loaders
//!
//! Declarative descriptions of decision tables and entity definitions,
//! deserialized with serde and compiled into runtime structures. Tables
//! land in a read-only `DecisionTables` entity keyed by lowercase name, so
//! a table is invoked simply by executing its name.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::Deserialize;

use crate::compiler::{compile, parse_value, CompileError};
use crate::entity::{Entity, EntityDefinition, FieldSpec, ReadOnlyVariable, Variable};
use crate::table::{Case, CaseCondition, DecisionTable, Mode};
use crate::value::{Kind, Value};

/// Top-level decision-table catalog description
#[derive(Debug, Clone, Deserialize)]
pub struct TableCatalog {
    pub tables: Vec<TableDef>,
}

/// One decision table, as described by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub mode: TableMode,
    /// Context fragments, outermost first
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub initial_actions: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<FragmentDef>,
    #[serde(default)]
    pub actions: Vec<FragmentDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableMode {
    #[default]
    FirstMatch,
    AllMatch,
}

/// A postfix fragment with its per-case column marks
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentDef {
    pub postfix: String,
    #[serde(default)]
    pub columns: Vec<ColumnMark>,
}

/// One mark in one column. Columns are 1-based in the description.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMark {
    pub column: usize,
    pub mark: String,
}

/// Compile a whole catalog into the `DecisionTables` entity
pub fn compile_catalog(catalog: &TableCatalog) -> Result<TablesEntity, CompileError> {
    let mut tables = HashMap::with_capacity(catalog.tables.len());
    for def in &catalog.tables {
        let v = compile_table(def).map_err(|e| e.context(format!("table {}", def.name)))?;
        tables.insert(def.name.to_lowercase(), v);
    }
    Ok(TablesEntity { tables })
}

/// Compile one table description into a named, context-wrapped value
pub fn compile_table(def: &TableDef) -> Result<Value, CompileError> {
    let mut table = DecisionTable {
        mode: match def.mode {
            TableMode::FirstMatch => Mode::First,
            TableMode::AllMatch => Mode::All,
        },
        before: Vec::new(),
        conditions: Vec::new(),
        actions: Vec::new(),
        cases: Vec::new(),
    };

    for (i, src) in def.initial_actions.iter().enumerate() {
        let v = compile(src).map_err(|e| e.context(format!("initial action {}", i)))?;
        table.before.push(v);
    }
    for (i, c) in def.conditions.iter().enumerate() {
        let v = compile(&c.postfix).map_err(|e| e.context(format!("condition {}", i)))?;
        table.conditions.push(v);
    }
    for (i, a) in def.actions.iter().enumerate() {
        let v = compile(&a.postfix).map_err(|e| e.context(format!("action {}", i)))?;
        table.actions.push(v);
    }

    // Each referenced column becomes a case, 0-based internally
    let mut cases: BTreeMap<usize, Case> = BTreeMap::new();
    let condition_count = def.conditions.len();
    let case_at = |column: usize| -> Result<usize, CompileError> {
        if column == 0 {
            return Err(CompileError::InvalidColumn { column });
        }
        Ok(column - 1)
    };

    for (i, c) in def.conditions.iter().enumerate() {
        for col in &c.columns {
            let idx = case_at(col.column)?;
            let case = cases.entry(idx).or_insert_with(|| Case {
                conditions: vec![CaseCondition::DontCare; condition_count],
                ..Case::default()
            });
            match col.mark.as_str() {
                "Y" => case.conditions[i] = CaseCondition::True,
                "N" => case.conditions[i] = CaseCondition::False,
                "*" => case.always = true,
                _ => {
                    return Err(CompileError::UnknownConditionMark {
                        mark: col.mark.clone(),
                    })
                }
            }
        }
    }
    for (i, a) in def.actions.iter().enumerate() {
        for col in &a.columns {
            let idx = case_at(col.column)?;
            let case = cases.entry(idx).or_insert_with(|| Case {
                conditions: vec![CaseCondition::DontCare; condition_count],
                ..Case::default()
            });
            match col.mark.as_str() {
                "X" => case.actions.push(i),
                _ => {
                    return Err(CompileError::UnknownActionMark {
                        mark: col.mark.clone(),
                    })
                }
            }
        }
    }

    for (idx, case) in &cases {
        if case.always && case.conditions.iter().any(|c| *c != CaseCondition::DontCare) {
            return Err(CompileError::AlwaysWithConditions { index: *idx });
        }
    }
    table.cases = cases.into_values().collect();

    // Context wrapping: the innermost body is the table itself, pushed as a
    // value ahead of each context's code so the context can arrange entity
    // pushes and then execute it.
    let mut v = Value::Table(Rc::new(table));
    if !def.contexts.is_empty() {
        v = Value::exec_array(vec![v]);
    }
    for (i, ctx) in def.contexts.iter().enumerate().rev() {
        let compiled = compile(ctx).map_err(|e| e.context(format!("context {}", i)))?;
        let mut items = vec![v];
        match &compiled {
            Value::Array(a) => items.extend(a.to_vec()),
            _ => items.push(compiled),
        }
        v = Value::exec_array(items);
    }

    Ok(Value::named(def.name.clone(), v))
}

/// The read-only entity exposing compiled tables as fields
#[derive(Debug)]
pub struct TablesEntity {
    tables: HashMap<String, Value>,
}

impl TablesEntity {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }
}

impl Entity for TablesEntity {
    fn entity_name(&self) -> &str {
        "DecisionTables"
    }

    fn field(&self, name: &str) -> Option<Rc<dyn Variable>> {
        self.tables
            .get(&name.to_lowercase())
            .map(|v| Rc::new(ReadOnlyVariable(v.clone())) as Rc<dyn Variable>)
    }
}

/// Entity-definition dictionary description
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDictionary {
    pub entities: Vec<EntityDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub required: String,
    #[serde(default)]
    pub default_value: String,
}

/// Compile a dictionary into entity-definition factories, keyed by the
/// declared entity name
pub fn compile_dictionary(
    dict: &EntityDictionary,
) -> Result<HashMap<String, EntityDefinition>, CompileError> {
    let mut out = HashMap::with_capacity(dict.entities.len());
    for e in &dict.entities {
        let mut def = EntityDefinition::new();
        for f in &e.fields {
            let kind = field_kind(&f.field_type)?;
            let mut spec = FieldSpec::new(kind);
            spec.writable = matches!(
                f.access.to_lowercase().as_str(),
                "rw" | "read/write"
            );
            spec.required = matches!(
                f.required.to_lowercase().as_str(),
                "yes" | "true" | "required"
            );
            if !f.default_value.is_empty() {
                spec.default = parse_value(&f.default_value)
                    .map_err(|x| x.context(format!("{}.{} default", e.name, f.name)))?;
            }
            def = def.with_field(&f.name, spec);
        }
        out.insert(e.name.clone(), def);
    }
    Ok(out)
}

fn field_kind(name: &str) -> Result<Kind, CompileError> {
    match name {
        "entity" => Ok(Kind::Entity),
        "integer" => Ok(Kind::Number),
        "string" => Ok(Kind::String),
        "array" => Ok(Kind::Array),
        "boolean" => Ok(Kind::Boolean),
        _ => Err(CompileError::UnknownFieldType {
            name: name.to_string(),
        }),
    }
}
