//! Runs the plugin chain over one tree.

use std::path::Path;

use tracing::trace;

use restyle_tree::{Syntax, Tree};

use crate::registry::RegisteredPlugin;
use crate::{Diagnostic, EngineError, Mode, PluginRegistry};

/// Result of a pipeline run.
#[derive(Debug)]
pub enum PipelineOutput {
    /// Lint mode: diagnostics in plugin order.
    Diagnostics(Vec<Diagnostic>),
    /// Process mode: the rewritten tree.
    Tree(Tree),
}

/// Applies the enabled plugins of a registry to a tree.
///
/// A plugin is selected when it is enabled, implements the requested mode and
/// declares the tree's dialect. Selected plugins run in registry order.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'r> {
    registry: &'r PluginRegistry,
}

impl<'r> Pipeline<'r> {
    /// Creates a pipeline over a registry.
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self { registry }
    }

    /// Plugins that run for the given mode and dialect, in order.
    pub fn select(&self, mode: Mode, syntax: Syntax) -> impl Iterator<Item = &'r RegisteredPlugin> {
        self.registry.plugins().filter(move |entry| {
            entry.is_enabled()
                && entry.plugin().supports(mode)
                && entry.plugin().syntaxes().contains(&syntax)
        })
    }

    /// Collects diagnostics from every selected lint plugin.
    ///
    /// Diagnostics without a rule name get the plugin's name. When `filename`
    /// is given every diagnostic is stamped with it.
    pub fn lint(&self, tree: &Tree, filename: Option<&Path>) -> Result<Vec<Diagnostic>, EngineError> {
        let settings = self.registry.settings();
        let mut diagnostics = Vec::new();

        for entry in self.select(Mode::Lint, tree.syntax()) {
            let found = entry
                .plugin()
                .lint(tree, &settings)
                .map_err(|e| EngineError::plugin(entry.name(), e))?;
            trace!("{} reported {} diagnostic(s)", entry.name(), found.len());

            diagnostics.extend(found.into_iter().map(|mut diagnostic| {
                if diagnostic.rule.is_empty() {
                    diagnostic.rule = entry.name().to_string();
                }
                if let Some(filename) = filename {
                    diagnostic.filename = Some(filename.to_path_buf());
                }
                diagnostic
            }));
        }

        Ok(diagnostics)
    }

    /// Runs every selected process plugin over the tree in place.
    pub fn process(&self, tree: &mut Tree) -> Result<(), EngineError> {
        let settings = self.registry.settings();

        for entry in self.select(Mode::Process, tree.syntax()) {
            trace!("Running {}", entry.name());
            entry
                .plugin()
                .process(tree, &settings)
                .map_err(|e| EngineError::plugin(entry.name(), e))?;
        }

        Ok(())
    }

    /// Runs the chain in the given mode.
    pub fn run(
        &self,
        mut tree: Tree,
        mode: Mode,
        filename: Option<&Path>,
    ) -> Result<PipelineOutput, EngineError> {
        match mode {
            Mode::Lint => self.lint(&tree, filename).map(PipelineOutput::Diagnostics),
            Mode::Process => {
                self.process(&mut tree)?;
                Ok(PipelineOutput::Tree(tree))
            }
        }
    }
}
