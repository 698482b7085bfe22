use std::collections::HashMap;

use crate::value::Value;

/// A chain of lexical binding frames, innermost last. Blocks push and pop
/// plain frames; function calls additionally push a barrier so the body sees
/// only its own frames plus the globals frame.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    frames: Vec<HashMap<String, Value>>,
    barriers: Vec<usize>,
}

impl Scope {
    pub(crate) fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            barriers: Vec::new(),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub(crate) fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Enter a function body: hide all enclosing frames except globals.
    /// Returns the depth to restore with `exit_function`.
    pub(crate) fn enter_function(&mut self) -> usize {
        let depth = self.frames.len();
        self.barriers.push(depth);
        self.frames.push(HashMap::new());
        depth
    }

    pub(crate) fn exit_function(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
        self.barriers.pop();
    }

    /// Drop frames left behind by an aborted statement or call.
    pub(crate) fn unwind_to(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
        while self
            .barriers
            .last()
            .is_some_and(|&b| b >= self.frames.len())
        {
            self.barriers.pop();
        }
    }

    fn floor(&self) -> usize {
        self.barriers.last().copied().unwrap_or(0)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Value> {
        let floor = self.floor();
        for frame in self.frames[floor..].iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value);
            }
        }
        if floor > 0 {
            self.frames[0].get(name)
        } else {
            None
        }
    }

    /// Overwrite an existing binding, searching outward. Returns false when
    /// no visible frame declares the name.
    pub(crate) fn assign(&mut self, name: &str, value: Value) -> bool {
        let floor = self.floor();
        for frame in self.frames[floor..].iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        if floor > 0 {
            if let Some(slot) = self.frames[0].get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// True when the innermost frame already declares `name`. Shadowing an
    /// outer frame's binding is not a redeclaration.
    pub(crate) fn is_declared_here(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.contains_key(name))
    }

    /// Install a binding in the innermost frame. Callers check
    /// `is_declared_here` first; a declared name always has a value.
    pub(crate) fn declare(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }
}
