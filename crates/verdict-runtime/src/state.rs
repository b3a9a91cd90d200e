//! Execution state: data, control, and entity stacks
//!
//! A `State` is single-threaded; two concurrent invocations need two
//! states. Compiled values and catalog operators are immutable and may be
//! shared across states.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::entity::{EntityRef, ReadOnlyVariable, Variable};
use crate::ops::resolve_operator;
use crate::value::{NameValue, RuntimeError, Value};

/// Bookkeeping items held on the control stack
#[derive(Clone)]
pub enum ControlItem {
    /// Records a data-stack depth
    DataFrame(usize),
    /// Records an entity-stack depth
    EntityFrame(usize),
    /// Live iteration counter of an active loop
    LoopCounter(Rc<Cell<i64>>),
    /// Active `{ … }` capture (see the array operators)
    ExecBuilder { frame: usize, depth: usize },
}

/// VM execution state
pub struct State {
    data: Vec<Value>,
    control: Vec<ControlItem>,
    entities: Vec<EntityRef>,
    cancelled: Arc<AtomicBool>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        State {
            data: Vec::new(),
            control: Vec::new(),
            entities: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    // === Data stack ===

    pub fn push(&mut self, v: Value) {
        self.data.push(v);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.data.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pop `n` values, returned in stack order (deepest first)
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.data.len() < n {
            return Err(RuntimeError::StackUnderflow);
        }
        Ok(self.data.split_off(self.data.len() - n))
    }

    /// The `i`th value counted from the bottom of the data stack
    pub fn peek(&self, i: usize) -> Option<&Value> {
        self.data.get(i)
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn data_depth(&self) -> usize {
        self.data.len()
    }

    // === Entity stack ===

    pub fn push_entity(&mut self, e: EntityRef) {
        self.entities.push(e);
    }

    pub fn pop_entity(&mut self) -> Result<EntityRef, RuntimeError> {
        self.entities.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn entity_depth(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    // === Control stack ===

    pub fn push_control(&mut self, c: ControlItem) {
        self.control.push(c);
    }

    pub fn pop_control(&mut self) -> Result<ControlItem, RuntimeError> {
        self.control.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn control_last(&self) -> Option<&ControlItem> {
        self.control.last()
    }

    pub fn control_last_mut(&mut self) -> Option<&mut ControlItem> {
        self.control.last_mut()
    }

    pub fn control_depth(&self) -> usize {
        self.control.len()
    }

    pub(crate) fn control_items(&self) -> &[ControlItem] {
        &self.control
    }

    // === Frames ===

    /// Record the current data-stack depth as a frame marker
    pub fn push_data_frame(&mut self) {
        self.control.push(ControlItem::DataFrame(self.data.len()));
    }

    /// Pop the most recent data-frame marker and return everything pushed
    /// above it
    pub fn pop_data_frame(&mut self) -> Result<Vec<Value>, RuntimeError> {
        match self.pop_control()? {
            ControlItem::DataFrame(depth) => {
                if depth > self.data.len() {
                    return Err(RuntimeError::InvalidStackFrame);
                }
                Ok(self.data.split_off(depth))
            }
            _ => Err(RuntimeError::NoStackFrame),
        }
    }

    pub fn push_entity_frame(&mut self) {
        self.control
            .push(ControlItem::EntityFrame(self.entities.len()));
    }

    pub fn pop_entity_frame(&mut self) -> Result<Vec<EntityRef>, RuntimeError> {
        match self.pop_control()? {
            ControlItem::EntityFrame(depth) => {
                if depth > self.entities.len() {
                    return Err(RuntimeError::InvalidStackFrame);
                }
                Ok(self.entities.split_off(depth))
            }
            _ => Err(RuntimeError::NoStackFrame),
        }
    }

    // === Cancellation ===

    /// Flag read by host-provided operators that perform I/O; no built-in
    /// operator polls it.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Resolve a name against the entity stack, top-down, falling back to the
/// operator catalog. For a compound name `E.M`, entities whose name does
/// not match `E` (case-insensitively) are skipped.
pub fn resolve(state: &State, name: &NameValue) -> Result<Rc<dyn Variable>, RuntimeError> {
    for entity in state.entities().iter().rev() {
        if let Some(wanted) = &name.entity {
            if !entity.entity_name().eq_ignore_ascii_case(wanted) {
                continue;
            }
        }
        if let Some(var) = entity.field(&name.member) {
            return Ok(var);
        }
    }

    if let Some(op) = resolve_operator(&name.member) {
        return Ok(Rc::new(ReadOnlyVariable(op)));
    }

    Err(RuntimeError::CannotResolve {
        name: name.full_name(),
    })
}
