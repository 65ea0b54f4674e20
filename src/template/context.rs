//! Evaluation context: the names bound by earlier answers.

use super::value::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Builtin name bound to the absolute working directory.
pub const CWD: &str = "cwd";

/// Mapping from bound names to values, extended as markers resolve.
///
/// Expressions only ever see a shared borrow, so evaluation cannot bind
/// names; only the engine extends the context, after a marker resolves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    bindings: BTreeMap<String, Value>,
}

impl EvalContext {
    /// An empty context with no builtins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context seeded with the `cwd` builtin.
    pub fn with_cwd<P: AsRef<Path>>(cwd: P) -> Self {
        let mut ctx = Self::new();
        ctx.bind(CWD, Value::Str(cwd.as_ref().display().to_string()));
        ctx
    }

    /// Bind `name` to `value`, shadowing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
