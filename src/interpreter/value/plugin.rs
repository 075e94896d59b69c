use std::fmt;

use rustc_hash::FxHashMap;

use crate::interpreter::value::core::Value;

/// A native function exposed by a plugin.
pub type PluginFn = fn(&[Value]) -> Value;

/// A named table of native functions registered by the host.
///
/// Scripts obtain one with `plugin("name")` and call its functions with
/// method syntax: `plugin("math").square(3)`.
///
/// # Example
/// ```
/// use ember::interpreter::value::{core::Value, plugin::Plugin};
///
/// fn square(args: &[Value]) -> Value {
///     match args {
///         [Value::Integer(n)] => Value::Integer(n * n),
///         _ => Value::error("square expects one integer"),
///     }
/// }
///
/// let plugin = Plugin::new("math").with_function("square", square);
/// assert!(plugin.function("square").is_some());
/// assert!(plugin.function("cube").is_none());
/// ```
#[derive(Clone)]
pub struct Plugin {
    name:      String,
    functions: FxHashMap<String, PluginFn>,
}

impl Plugin {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name:      name.into(),
               functions: FxHashMap::default(), }
    }

    /// Registers `function` under `name`, replacing any previous entry.
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, function: PluginFn) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<PluginFn> {
        self.functions.get(name).copied()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Plugin")
         .field("name", &self.name)
         .field("functions", &names)
         .finish()
    }
}
