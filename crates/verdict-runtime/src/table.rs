//! Decision tables
//!
//! A table pairs compiled condition and action fragments with a list of
//! cases. Evaluation runs the initial actions, then walks cases in order,
//! evaluating each referenced condition at most once per invocation (the
//! memo), and executes the actions of every satisfied case, or only the
//! first one, in first-match mode.

use tracing::debug_span;

use crate::execute::{execute, execute_framed};
use crate::state::State;
use crate::value::{RuntimeError, Value};

/// Case-selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Stop after the first case whose conditions all satisfy
    #[default]
    First,
    /// Evaluate every case
    All,
}

/// Per-condition mark of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseCondition {
    #[default]
    DontCare,
    True,
    False,
}

/// One column of a decision table
#[derive(Clone, Default)]
pub struct Case {
    /// Satisfied unconditionally; mutually exclusive with explicit marks
    pub always: bool,
    pub conditions: Vec<CaseCondition>,
    /// Action indices, in execution order
    pub actions: Vec<usize>,
}

/// A compiled decision table. Immutable after compilation and sharable
/// across states.
pub struct DecisionTable {
    pub mode: Mode,
    /// Initial actions, run before any case
    pub before: Vec<Value>,
    pub conditions: Vec<Value>,
    pub actions: Vec<Value>,
    pub cases: Vec<Case>,
}

impl DecisionTable {
    pub fn execute(&self, state: &mut State) -> Result<(), RuntimeError> {
        let span = debug_span!("execute_table", cases = self.cases.len());
        let _guard = span.enter();

        let mut run = Execution {
            table: self,
            memo: vec![None; self.conditions.len()],
        };

        state.push_data_frame();
        state.push_entity_frame();

        for before in &self.before {
            execute(state, std::slice::from_ref(before))?;
        }

        for (i, case) in self.cases.iter().enumerate() {
            let selected = run
                .execute_case(state, i, case)
                .map_err(|e| RuntimeError::Case {
                    index: i,
                    source: Box::new(e),
                })?;
            if selected && self.mode == Mode::First {
                break;
            }
        }

        state.pop_entity_frame()?;
        state.pop_data_frame()?;
        Ok(())
    }
}

/// One invocation's worth of evaluation state: the condition memo
struct Execution<'a> {
    table: &'a DecisionTable,
    memo: Vec<Option<bool>>,
}

impl Execution<'_> {
    fn execute_case(
        &mut self,
        state: &mut State,
        index: usize,
        case: &Case,
    ) -> Result<bool, RuntimeError> {
        if case.conditions.len() > self.table.conditions.len() {
            return Err(RuntimeError::Domain(
                "case has too many conditions".to_string(),
            ));
        }
        if !self.conditions_satisfied(state, case)? {
            return Ok(false);
        }

        let span = debug_span!("execute_case", number = index);
        let _guard = span.enter();

        for &action in &case.actions {
            self.execute_action(state, action)?;
        }
        Ok(true)
    }

    fn conditions_satisfied(
        &mut self,
        state: &mut State,
        case: &Case,
    ) -> Result<bool, RuntimeError> {
        if case.always {
            return Ok(true);
        }
        for (i, mark) in case.conditions.iter().enumerate() {
            if *mark == CaseCondition::DontCare {
                continue;
            }
            let value = self
                .execute_condition(state, i)
                .map_err(|e| RuntimeError::Condition {
                    index: i,
                    source: Box::new(e),
                })?;
            match mark {
                CaseCondition::True if !value => return Ok(false),
                CaseCondition::False if value => return Ok(false),
                _ => {}
            }
        }
        Ok(true)
    }

    /// Evaluate condition `i` at most once per invocation
    fn execute_condition(&mut self, state: &mut State, i: usize) -> Result<bool, RuntimeError> {
        if let Some(memoized) = self.memo[i] {
            return Ok(memoized);
        }

        let condition = &self.table.conditions[i];
        let span = debug_span!("execute_condition", number = i, postfix = %condition);
        let _guard = span.enter();

        let out = execute_framed(state, std::slice::from_ref(condition))?;
        let top = out.last().ok_or(RuntimeError::NoConditionResult)?;
        let value = top.coerce_bool()?;

        self.memo[i] = Some(value);
        Ok(value)
    }

    fn execute_action(&mut self, state: &mut State, i: usize) -> Result<(), RuntimeError> {
        let action = self
            .table
            .actions
            .get(i)
            .ok_or_else(|| RuntimeError::Domain(format!("action {} out of range", i)))?;

        let span = debug_span!("execute_action", number = i, postfix = %action);
        let _guard = span.enter();

        execute_framed(state, std::slice::from_ref(action))
            .map(|_| ())
            .map_err(|e| RuntimeError::Action {
                index: i,
                source: Box::new(e),
            })
    }
}
