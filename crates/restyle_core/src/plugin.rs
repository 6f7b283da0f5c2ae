//! Plugin contract.
//!
//! A plugin is a named unit of lint and/or rewrite logic scoped to one or
//! more dialects. The engine never looks inside a plugin: it only reads the
//! name, the dialects, the optional run-before target and which modes the
//! plugin implements.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use restyle_tree::{Syntax, Tree};

use crate::{Diagnostic, PluginError};

/// The two ways a plugin chain can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Read-only analysis producing diagnostics.
    Lint,
    /// In-place tree rewriting.
    Process,
}

/// Values of every participating plugin, keyed by plugin name.
///
/// Passed to each plugin callable so a plugin can read its own options as
/// well as those of plugins it cooperates with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

impl Settings {
    pub(crate) fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Returns a plugin's options. `Value::Null` means the plugin is enabled
    /// without options; `None` means it is disabled or unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true if the named plugin participates.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// A lint and/or rewrite plugin.
///
/// Implementors declare which modes they support through [`Plugin::supports`];
/// the pipeline never calls `lint` or `process` for an unsupported mode.
///
/// # Example
///
/// ```rust
/// use restyle_core::{Diagnostic, Mode, Plugin, PluginError, Settings};
/// use restyle_tree::{NodeKind, Syntax, Tree};
///
/// struct NoImportant;
///
/// impl Plugin for NoImportant {
///     fn name(&self) -> &str {
///         "noImportant"
///     }
///
///     fn syntaxes(&self) -> &[Syntax] {
///         &Syntax::ALL
///     }
///
///     fn supports(&self, mode: Mode) -> bool {
///         mode == Mode::Lint
///     }
///
///     fn lint(&self, tree: &Tree, _settings: &Settings) -> Result<Vec<Diagnostic>, PluginError> {
///         Ok(tree
///             .root()
///             .find_all(NodeKind::Word)
///             .into_iter()
///             .filter(|node| node.text() == Some("!important"))
///             .map(|node| Diagnostic::new("Avoid !important", node.span))
///             .collect())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique plugin name. Also the plugin's key in the configuration.
    fn name(&self) -> &str;

    /// Dialects this plugin applies to.
    fn syntaxes(&self) -> &[Syntax];

    /// Name of a plugin this one must run ahead of.
    fn run_before(&self) -> Option<&str> {
        None
    }

    /// Returns true if the plugin implements the given mode.
    fn supports(&self, mode: Mode) -> bool;

    /// Inspects the tree and reports diagnostics.
    fn lint(&self, _tree: &Tree, _settings: &Settings) -> Result<Vec<Diagnostic>, PluginError> {
        Ok(Vec::new())
    }

    /// Rewrites the tree in place.
    fn process(&self, _tree: &mut Tree, _settings: &Settings) -> Result<(), PluginError> {
        Ok(())
    }
}

type LintFn = dyn Fn(&Tree, &Settings) -> Result<Vec<Diagnostic>, PluginError> + Send + Sync;
type ProcessFn = dyn Fn(&mut Tree, &Settings) -> Result<(), PluginError> + Send + Sync;

/// A plugin assembled from closures.
///
/// ```rust
/// use restyle_core::{FnPlugin, Mode, Plugin};
/// use restyle_tree::{NodeKind, Syntax};
///
/// let plugin = FnPlugin::new("stripSpaces", [Syntax::Css, Syntax::Scss])
///     .run_before("blockIndent")
///     .with_process(|tree, _| {
///         tree.root_mut().walk_mut(&mut |node| {
///             if node.kind == NodeKind::Whitespace {
///                 node.set_text(" ");
///             }
///         });
///         Ok(())
///     });
///
/// assert!(plugin.supports(Mode::Process));
/// assert!(!plugin.supports(Mode::Lint));
/// ```
pub struct FnPlugin {
    name: String,
    syntaxes: Vec<Syntax>,
    run_before: Option<String>,
    lint: Option<Box<LintFn>>,
    process: Option<Box<ProcessFn>>,
}

impl FnPlugin {
    /// Creates a plugin with no callables; it is inert in both modes until
    /// one is attached.
    pub fn new(name: impl Into<String>, syntaxes: impl IntoIterator<Item = Syntax>) -> Self {
        Self {
            name: name.into(),
            syntaxes: syntaxes.into_iter().collect(),
            run_before: None,
            lint: None,
            process: None,
        }
    }

    /// Orders this plugin ahead of `name`.
    pub fn run_before(mut self, name: impl Into<String>) -> Self {
        self.run_before = Some(name.into());
        self
    }

    /// Attaches a lint callable.
    pub fn with_lint<F>(mut self, f: F) -> Self
    where
        F: Fn(&Tree, &Settings) -> Result<Vec<Diagnostic>, PluginError> + Send + Sync + 'static,
    {
        self.lint = Some(Box::new(f));
        self
    }

    /// Attaches a process callable.
    pub fn with_process<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Tree, &Settings) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.process = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPlugin")
            .field("name", &self.name)
            .field("syntaxes", &self.syntaxes)
            .field("run_before", &self.run_before)
            .field("lint", &self.lint.is_some())
            .field("process", &self.process.is_some())
            .finish()
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn syntaxes(&self) -> &[Syntax] {
        &self.syntaxes
    }

    fn run_before(&self) -> Option<&str> {
        self.run_before.as_deref()
    }

    fn supports(&self, mode: Mode) -> bool {
        match mode {
            Mode::Lint => self.lint.is_some(),
            Mode::Process => self.process.is_some(),
        }
    }

    fn lint(&self, tree: &Tree, settings: &Settings) -> Result<Vec<Diagnostic>, PluginError> {
        match &self.lint {
            Some(lint) => lint(tree, settings),
            None => Ok(Vec::new()),
        }
    }

    fn process(&self, tree: &mut Tree, settings: &Settings) -> Result<(), PluginError> {
        match &self.process {
            Some(process) => process(tree, settings),
            None => Ok(()),
        }
    }
}
