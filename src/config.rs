use std::{path::PathBuf, rc::Rc};

use rustc_hash::FxHashMap;

use crate::interpreter::value::plugin::Plugin;

/// Default limit on nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Everything the evaluator needs from its host.
///
/// A `Config` is handed to the evaluator when it is created; there is no
/// process-wide state. Build one with the consuming `with_*` methods:
///
/// ```
/// use ember::config::Config;
///
/// let config = Config::default().with_args(vec!["input.txt".to_string()])
///                               .with_seed(7)
///                               .with_max_call_depth(500);
///
/// assert_eq!(config.args, ["input.txt"]);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Values returned by the `args()` builtin.
    pub args:           Vec<String>,
    /// Directory that relative `import` paths are resolved against.
    pub import_root:    PathBuf,
    /// Maximum nesting of function calls before evaluation aborts.
    pub max_call_depth: usize,
    /// Seed for `rand`; `None` seeds from system entropy.
    pub seed:           Option<u64>,
    /// Plugins available to the `plugin(name)` builtin.
    pub plugins:        FxHashMap<String, Rc<Plugin>>,
}

impl Default for Config {
    fn default() -> Self {
        Self { args:           Vec::new(),
               import_root:    PathBuf::from("."),
               max_call_depth: DEFAULT_MAX_CALL_DEPTH,
               seed:           None,
               plugins:        FxHashMap::default(), }
    }
}

impl Config {
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_import_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.import_root = root.into();
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Registers `plugin` under its own name.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.insert(plugin.name().to_string(), Rc::new(plugin));
        self
    }
}
