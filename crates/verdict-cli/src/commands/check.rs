//! `verdict check`: compile a catalog and report its contents

use std::fs;

use anyhow::{Context, Result};
use verdict_runtime::{compile_catalog, TableCatalog};

pub fn run(catalog_path: &str) -> Result<()> {
    let text = fs::read_to_string(catalog_path)
        .with_context(|| format!("read catalog {}", catalog_path))?;
    let catalog: TableCatalog =
        serde_json::from_str(&text).with_context(|| format!("parse catalog {}", catalog_path))?;
    let tables = compile_catalog(&catalog).context("compile catalog")?;

    let mut names: Vec<&str> = tables.names().collect();
    names.sort_unstable();
    println!("{} table(s)", names.len());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}
