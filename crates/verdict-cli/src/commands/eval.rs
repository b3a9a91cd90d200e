//! `verdict eval`: evaluate a bare postfix fragment

use anyhow::{Context, Result};
use verdict_runtime::{execute_source, State};

pub fn run(source: &str) -> Result<()> {
    let mut state = State::new();
    execute_source(&mut state, source).with_context(|| format!("execute {:?}", source))?;
    for value in state.data() {
        println!("{}", value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_ok() {
        run("1 2 +").expect("eval");
    }

    #[test]
    fn test_eval_reports_errors() {
        assert!(run("1 +").is_err());
        assert!(run("'unterminated").is_err());
    }
}
