//! Engine façade.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use restyle_parser::Parser;
use restyle_tree::Syntax;

use crate::{
    Config, Diagnostic, EngineError, FileOutcome, PathFilter, Pipeline, Plugin, PluginRegistry,
    PluginValue, RegistryError, Report, StringOptions, Traverser, TreeAdapter,
};

/// Files larger than this are refused.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Result of [`Engine::run_path`].
#[derive(Debug)]
pub enum RunReport {
    /// Lint mode results.
    Lint(Report<Vec<Diagnostic>>),
    /// Process mode results.
    Process(Report<FileOutcome>),
}

/// The stylesheet engine.
///
/// Holds the configuration and the plugin registry, and exposes the lint and
/// process operations on strings, files and paths.
///
/// # Example
///
/// ```rust
/// use restyle_core::{Engine, FnPlugin, StringOptions};
/// use restyle_tree::{NodeKind, Syntax};
/// use serde_json::json;
///
/// let mut engine = Engine::new();
/// engine
///     .use_plugin(FnPlugin::new("lowercase", [Syntax::Css]).with_process(|tree, _| {
///         tree.root_mut().walk_mut(&mut |node| {
///             if node.kind == NodeKind::Word {
///                 let lower = node.text().unwrap_or_default().to_lowercase();
///                 node.set_text(lower);
///             }
///         });
///         Ok(())
///     }))
///     .unwrap();
/// engine.configure_value(json!({ "lowercase": true })).unwrap();
///
/// let out = engine.process_string("A { COLOR: RED }", &StringOptions::new()).unwrap();
/// assert_eq!(out, "a { color: red }");
/// ```
#[derive(Debug)]
pub struct Engine {
    config: Config,
    registry: PluginRegistry,
    filter: PathFilter,
    adapter: TreeAdapter,
}

impl Engine {
    /// Creates an engine with the built-in token parser and no plugins.
    pub fn new() -> Self {
        Self::with_adapter(TreeAdapter::default())
    }

    /// Creates an engine that parses with the given parser.
    pub fn with_parser(parser: Arc<dyn Parser>) -> Self {
        Self::with_adapter(TreeAdapter::new(parser))
    }

    fn with_adapter(adapter: TreeAdapter) -> Self {
        Self {
            config: Config::default(),
            registry: PluginRegistry::new(),
            filter: PathFilter::default(),
            adapter,
        }
    }

    /// Replaces the configuration.
    ///
    /// Every registered plugin takes the value configured for it; plugins the
    /// configuration does not name go back to the default. Values for plugins
    /// that are not registered are kept and applied when they register.
    pub fn configure(&mut self, config: Config) -> Result<&mut Self, EngineError> {
        self.filter = PathFilter::new(&config.exclude, config.base_dir.as_deref())?;

        self.registry.reset_values();
        for (name, value) in &config.plugins {
            if !self.registry.configure(name, PluginValue::from(value.clone())) {
                debug!("No plugin named '{}' is registered yet", name);
            }
        }

        debug!(
            "Configured: lint={}, verbose={}, syntax={:?}, {} exclusion(s)",
            config.lint,
            config.verbose,
            config.syntax,
            config.exclude.len()
        );
        self.config = config;
        Ok(self)
    }

    /// Validates a raw JSON configuration and applies it.
    pub fn configure_value(&mut self, value: Value) -> Result<&mut Self, EngineError> {
        let config = Config::from_value(value)?;
        self.configure(config)
    }

    /// Registers a plugin.
    ///
    /// A plugin whose name is already taken is skipped, with a warning in
    /// verbose mode. A run-before constraint that would make the order cyclic
    /// is an error.
    pub fn use_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> Result<&mut Self, EngineError> {
        self.use_boxed(Box::new(plugin))
    }

    /// Registers a boxed plugin. See [`use_plugin`](Self::use_plugin).
    pub fn use_boxed(&mut self, plugin: Box<dyn Plugin>) -> Result<&mut Self, EngineError> {
        let name = plugin.name().to_string();
        match self.registry.register(plugin) {
            Ok(registration) => {
                if let Some(target) = &registration.pending_target {
                    debug!("Plugin '{}' waits for '{}' to register", name, target);
                }
                if let Some(value) = self.config.plugin_value(&name) {
                    self.registry.configure(&name, value);
                }
                Ok(self)
            }
            Err(RegistryError::Duplicate(_)) => {
                if self.config.verbose {
                    warn!("Plugin '{}' is already registered; skipping", name);
                } else {
                    debug!("Plugin '{}' is already registered; skipping", name);
                }
                Ok(self)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every plugin.
    pub fn reset_plugins(&mut self) {
        self.registry.reset();
    }

    /// The current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The plugin registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.registry)
    }

    fn traverser(&self) -> Traverser<'_> {
        Traverser::new(
            &self.filter,
            self.registry.supported_syntaxes(),
            self.config.on_error,
        )
    }

    /// Lints a string.
    ///
    /// Empty text yields no diagnostics without being parsed.
    pub fn lint_string(
        &self,
        text: &str,
        options: &StringOptions,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let tree = self.adapter.parse(text, options)?;
        let mut diagnostics = self.pipeline().lint(&tree, options.filename())?;
        for diagnostic in &mut diagnostics {
            diagnostic.resolve_location(text);
        }
        Ok(diagnostics)
    }

    /// Processes a string and returns the rewritten text.
    ///
    /// Empty text is returned as is without being parsed.
    pub fn process_string(&self, text: &str, options: &StringOptions) -> Result<String, EngineError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let mut tree = self.adapter.parse(text, options)?;
        self.pipeline().process(&mut tree)?;
        Ok(self.adapter.serialize(&tree))
    }

    /// Lints one file.
    pub fn lint_file(&self, path: impl AsRef<Path>) -> Result<Vec<Diagnostic>, EngineError> {
        let path = path.as_ref();
        let (text, options) = self.read_file(path)?;
        self.lint_string(&text, &options)
    }

    /// Processes one file, writing it back only if the text changed.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<FileOutcome, EngineError> {
        let path = path.as_ref();
        let (text, options) = self.read_file(path)?;
        let processed = self.process_string(&text, &options)?;

        if processed == text {
            if self.config.verbose {
                info!("  {}", path.display());
            }
            return Ok(FileOutcome::Unchanged);
        }

        fs::write(path, processed)
            .map_err(|e| EngineError::file(format!("Failed to write {}: {}", path.display(), e)))?;
        if self.config.verbose {
            info!("✓ {}", path.display());
        }
        Ok(FileOutcome::Rewritten)
    }

    /// Lints a file or every eligible file under a directory.
    pub fn lint_path(&self, path: impl AsRef<Path>) -> Result<Report<Vec<Diagnostic>>, EngineError> {
        self.traverser().walk(path.as_ref(), |file| self.lint_file(file))
    }

    /// Processes a file or every eligible file under a directory.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<Report<FileOutcome>, EngineError> {
        self.traverser().walk(path.as_ref(), |file| self.process_file(file))
    }

    /// Lints or processes a path depending on the configured mode.
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<RunReport, EngineError> {
        if self.config.lint {
            self.lint_path(path).map(RunReport::Lint)
        } else {
            self.process_path(path).map(RunReport::Process)
        }
    }

    /// Checks eligibility and reads a file, returning its text with the
    /// options to parse it under.
    fn read_file(&self, path: &Path) -> Result<(String, StringOptions), EngineError> {
        if !self
            .filter
            .accepts_file(path, self.registry.supported_syntaxes())
        {
            return Err(EngineError::Ineligible(path.to_path_buf()));
        }

        let metadata = fs::metadata(path).map_err(|e| {
            EngineError::file(format!("Failed to read metadata {}: {}", path.display(), e))
        })?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(EngineError::file(format!(
                "File size exceeds limit of {} bytes: {}",
                MAX_FILE_SIZE,
                path.display()
            )));
        }

        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::file(format!("Failed to read {}: {}", path.display(), e)))?;

        let syntax = self
            .config
            .syntax
            .or_else(|| Syntax::from_path(path))
            .unwrap_or_default();
        let options = StringOptions::new()
            .with_syntax(syntax)
            .with_filename(path);

        Ok((text, options))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
