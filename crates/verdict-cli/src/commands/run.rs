//! `verdict run`: execute a postfix program against a loaded catalog

use std::fs;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use verdict_runtime::{
    compile_catalog, compile_dictionary, execute_source, Entity, EntityDictionary, JsonEntity,
    State, TableCatalog,
};

pub fn run(
    catalog_path: &str,
    entities_path: Option<&str>,
    input_path: Option<&str>,
    input_name: &str,
    result_name: &str,
    source: &str,
) -> Result<()> {
    let mut state = State::new();

    let text = fs::read_to_string(catalog_path)
        .with_context(|| format!("read catalog {}", catalog_path))?;
    let catalog: TableCatalog =
        serde_json::from_str(&text).with_context(|| format!("parse catalog {}", catalog_path))?;
    let tables = compile_catalog(&catalog).context("compile catalog")?;
    state.push_entity(Rc::new(tables));

    let mut result_entity = None;
    if let Some(path) = entities_path {
        let text =
            fs::read_to_string(path).with_context(|| format!("read dictionary {}", path))?;
        let dict: EntityDictionary =
            serde_json::from_str(&text).with_context(|| format!("parse dictionary {}", path))?;
        let definitions = compile_dictionary(&dict).context("compile dictionary")?;
        let definition = definitions
            .get(result_name)
            .with_context(|| format!("dictionary has no {:?} entity", result_name))?;
        let entity = definition.instantiate(result_name);
        state.push_entity(entity.clone());
        result_entity = Some(entity);
    }

    if let Some(path) = input_path {
        let text = fs::read_to_string(path).with_context(|| format!("read input {}", path))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).with_context(|| format!("parse input {}", path))?;
        let entity = JsonEntity::from_value(input_name, value)
            .with_context(|| format!("input {} must be a JSON object", path))?;
        state.push_entity(Rc::new(entity));
    }

    execute_source(&mut state, source).with_context(|| format!("execute {:?}", source))?;

    match &result_entity {
        Some(entity) => {
            let Some(json) = entity.to_json() else {
                bail!("result entity has no JSON rendition");
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        None => {
            for value in state.data() {
                println!("{}", value);
            }
        }
    }
    Ok(())
}
